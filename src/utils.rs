//! Utility functions for frame handling and the preview overlay.

pub mod image_conversion;
pub mod safe_cast;

use crate::Result;
use opencv::core::Mat;
use safe_cast::f64_to_i32;
use std::time::Instant;

/// Mirror a frame horizontally, the way a selfie camera preview looks
///
/// # Errors
///
/// Returns an error if the flip fails
pub fn mirror_frame(frame: &Mat) -> Result<Mat> {
    let mut mirrored = Mat::default();
    opencv::core::flip(frame, &mut mirrored, 1)?;
    Ok(mirrored)
}

/// Instantaneous frame rate, measured between consecutive ticks
#[derive(Debug)]
pub struct FpsCounter {
    previous: Option<Instant>,
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Register a frame and return the rate implied by the time since the last one
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Same as [`FpsCounter::tick`] with an explicit timestamp
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let fps = match self.previous {
            Some(previous) => {
                let elapsed = now.saturating_duration_since(previous).as_secs_f64();
                if elapsed > 0.0 {
                    1.0 / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.previous = Some(now);
        fps
    }

    /// Whole-number text shown in the preview
    #[must_use]
    pub fn label(fps: f64) -> String {
        f64_to_i32(fps).unwrap_or(0).to_string()
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};
    use opencv::prelude::*;
    use std::time::Duration;

    #[test]
    fn test_mirror_frame_swaps_columns() {
        let mut frame = Mat::new_rows_cols_with_default(2, 4, CV_8UC3, Scalar::all(0.0)).unwrap();
        *frame.at_2d_mut::<Vec3b>(0, 0).unwrap() = Vec3b::from([255, 0, 0]);

        let mirrored = mirror_frame(&frame).unwrap();
        assert_eq!(mirrored.cols(), 4);
        assert_eq!(*mirrored.at_2d::<Vec3b>(0, 3).unwrap(), Vec3b::from([255, 0, 0]));
        assert_eq!(*mirrored.at_2d::<Vec3b>(0, 0).unwrap(), Vec3b::from([0, 0, 0]));
    }

    #[test]
    fn test_fps_counter() {
        let mut counter = FpsCounter::new();
        let start = Instant::now();
        assert_eq!(counter.tick_at(start), 0.0);

        let fps = counter.tick_at(start + Duration::from_millis(40));
        assert!((fps - 25.0).abs() < 1e-6);
        assert_eq!(FpsCounter::label(fps), "25");

        // Non-advancing clock does not divide by zero
        assert_eq!(counter.tick_at(start + Duration::from_millis(40)), 0.0);
        assert_eq!(FpsCounter::label(f64::INFINITY), "0");
    }
}
