//! Tests for the animation and UDP sinks against real files and sockets


use hand_tracking_bridge::{
    hand::{FrameResult, Handedness},
    sinks::{
        animation::{format_animation_line, parse_animation_line},
        network::{decode_datagram, encode_datagram, frame_values},
        AnimationWriter, FrameSink, UdpSender,
    },
};
use proptest::prelude::*;
use std::net::UdpSocket;
use std::time::Duration;
use test_helpers::pixel_hand;

fn receiver() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
    socket
}

fn frame(sides: &[Handedness]) -> FrameResult {
    FrameResult {
        hands: sides
            .iter()
            .enumerate()
            .map(|(i, &side)| pixel_hand(100 * i as i32, 50, side))
            .collect(),
        width: 800,
        height: 600,
    }
}

#[test]
fn test_two_hands_send_one_datagram_of_126_values() {
    let rx = receiver();
    let port = rx.local_addr().unwrap().port();
    let mut sender = UdpSender::new("127.0.0.1", port, 600).unwrap();

    sender.accept(&frame(&[Handedness::Right, Handedness::Left])).unwrap();

    let mut buf = [0u8; 4096];
    let len = rx.recv(&mut buf).unwrap();
    let payload = std::str::from_utf8(&buf[..len]).unwrap();
    let values = decode_datagram(payload).unwrap();

    assert_eq!(values.len(), 126);
    assert!(payload.starts_with("[0, 550, 0, 1, 548, -1"));
    assert_eq!(sender.datagrams_sent(), 1);
}

#[test]
fn test_empty_frame_sends_nothing() {
    let rx = receiver();
    let port = rx.local_addr().unwrap().port();
    let mut sender = UdpSender::new("127.0.0.1", port, 600).unwrap();

    sender.accept(&FrameResult::empty(800, 600)).unwrap();
    sender.accept(&frame(&[Handedness::Left])).unwrap();

    // Only the non-empty frame arrives
    let mut buf = [0u8; 4096];
    let len = rx.recv(&mut buf).unwrap();
    assert_eq!(decode_datagram(std::str::from_utf8(&buf[..len]).unwrap()).unwrap().len(), 63);
    assert!(rx.recv(&mut buf).is_err());
    assert_eq!(sender.datagrams_sent(), 1);
}

#[test]
fn test_animation_files_hold_one_line_per_hand() {
    let dir = tempfile::tempdir().unwrap();
    let right = dir.path().join("Animation1.txt");
    let left = dir.path().join("Animation2.txt");
    let mut writer = AnimationWriter::new(&right, &left);

    writer.accept(&frame(&[Handedness::Right, Handedness::Left])).unwrap();
    writer.accept(&frame(&[Handedness::Right])).unwrap();
    writer.accept(&FrameResult::empty(800, 600)).unwrap();
    writer.accept(&frame(&[Handedness::Right, Handedness::Right])).unwrap();

    // Nothing touches disk before the end of the run
    assert!(!right.exists());
    writer.finish().unwrap();

    let right_text = std::fs::read_to_string(&right).unwrap();
    let left_text = std::fs::read_to_string(&left).unwrap();
    assert_eq!(right_text.lines().count(), 4);
    assert_eq!(left_text.lines().count(), 1);
    assert!(right_text.ends_with('\n'));

    for line in right_text.lines().chain(left_text.lines()) {
        assert_eq!(parse_animation_line(line).unwrap().len(), 21);
    }
}

#[test]
fn test_animation_files_created_when_empty() {
    let dir = tempfile::tempdir().unwrap();
    let right = dir.path().join("right.txt");
    let left = dir.path().join("left.txt");
    let mut writer = AnimationWriter::new(&right, &left);

    writer.finish().unwrap();

    assert_eq!(std::fs::read_to_string(&right).unwrap(), "");
    assert_eq!(std::fs::read_to_string(&left).unwrap(), "");
}

#[test]
fn test_finish_reports_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no_such_dir").join("right.txt");
    let mut writer = AnimationWriter::new(&missing, dir.path().join("left.txt"));
    assert!(writer.finish().is_err());
}

proptest! {
    #[test]
    fn prop_file_and_network_invert_alike(x in -2000i32..2000, y in -2000i32..2000, height in 1i32..4000) {
        let hand = pixel_hand(x, y, Handedness::Left);
        let frame = FrameResult { hands: vec![hand.clone()], width: 800, height };

        let file_values: Vec<i32> = format_animation_line(&hand, height)
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();
        let network_values = decode_datagram(&encode_datagram(&frame_values(&frame, height))).unwrap();

        prop_assert_eq!(file_values, network_values);
    }

    #[test]
    fn prop_datagram_length(hands in 0usize..5) {
        let sides = vec![Handedness::Right; hands];
        let values = frame_values(&frame(&sides), 600);
        prop_assert_eq!(values.len(), hands * 63);
    }
}
