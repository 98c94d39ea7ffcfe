//! Performance benchmarks for coordinate conversion and sink serialization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hand_tracking_bridge::{
    adapter::CoordinateAdapter,
    constants::NUM_HAND_LANDMARKS,
    hand::{FrameResult, Handedness, NormalizedLandmark, RawHand},
    sinks::{
        animation::format_animation_line,
        network::{decode_datagram, encode_datagram, frame_values},
    },
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_hands(count: usize, rng: &mut StdRng) -> Vec<RawHand> {
    (0..count)
        .map(|i| {
            let mut landmarks = [NormalizedLandmark::default(); NUM_HAND_LANDMARKS];
            for lm in &mut landmarks {
                *lm = NormalizedLandmark::new(rng.gen(), rng.gen(), rng.gen_range(-0.2..0.2));
            }
            RawHand {
                landmarks,
                label: if i % 2 == 0 { Handedness::Left } else { Handedness::Right },
                score: 0.9,
            }
        })
        .collect()
}

/// Benchmark normalized-to-pixel conversion for different hand counts
fn bench_adapter(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapter");
    let mut rng = StdRng::seed_from_u64(7);
    let adapter = CoordinateAdapter::default();

    for hands in [1usize, 2, 4] {
        let raw = random_hands(hands, &mut rng);
        group.bench_with_input(BenchmarkId::new("adapt_frame", hands), &raw, |b, raw| {
            b.iter(|| black_box(adapter.adapt_frame(black_box(raw), 800, 600)));
        });
    }

    group.finish();
}

/// Benchmark the text formats both sinks produce
fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");
    let mut rng = StdRng::seed_from_u64(11);
    let frame: FrameResult = CoordinateAdapter::default().adapt_frame(&random_hands(2, &mut rng), 800, 600);

    group.bench_function("animation_line", |b| {
        b.iter(|| black_box(format_animation_line(black_box(&frame.hands[0]), 600)));
    });

    group.bench_function("encode_datagram", |b| {
        b.iter(|| black_box(encode_datagram(&frame_values(black_box(&frame), 600))));
    });

    let payload = encode_datagram(&frame_values(&frame, 600));
    group.bench_function("decode_datagram", |b| {
        b.iter(|| black_box(decode_datagram(black_box(&payload))));
    });

    group.finish();
}

criterion_group!(benches, bench_adapter, bench_serialization);
criterion_main!(benches);
