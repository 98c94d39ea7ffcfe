//! Conversion of normalized model output to pixel coordinates.
//!
//! The model expects a mirrored, selfie-view input but runs on the frame as
//! captured, so the side it reports is the opposite of the user's hand. [`CoordinateAdapter`] scales each landmark
//! to integer pixels and swaps the label back.

use crate::{
    hand::{FrameResult, Hand, Handedness, Landmark, NormalizedLandmark, RawHand},
    utils::safe_cast::f32_to_i32,
    Result,
};
use log::warn;

/// Scales normalized landmarks and corrects handedness
#[derive(Debug, Clone, Copy)]
pub struct CoordinateAdapter {
    flip_type: bool,
}

impl CoordinateAdapter {
    /// Create an adapter; `flip_type` swaps the model's label back to the user's side
    #[must_use]
    pub const fn new(flip_type: bool) -> Self {
        Self { flip_type }
    }

    #[must_use]
    pub const fn flip_type(&self) -> bool {
        self.flip_type
    }

    /// Side reported to consumers for a raw model label
    #[must_use]
    pub fn correct_side(&self, raw: Handedness) -> Handedness {
        if self.flip_type {
            raw.mirrored()
        } else {
            raw
        }
    }

    /// Scale one landmark to pixels, truncating toward zero
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is not finite or overflows i32
    #[allow(clippy::cast_precision_loss)] // frame sizes are far below f32 precision limits
    pub fn to_pixels(landmark: &NormalizedLandmark, width: i32, height: i32) -> Result<Landmark> {
        let w = width as f32;
        let h = height as f32;
        Ok(Landmark::new(
            f32_to_i32(landmark.x * w)?,
            f32_to_i32(landmark.y * h)?,
            f32_to_i32(landmark.z * w)?,
        ))
    }

    /// Convert one raw hand
    ///
    /// # Errors
    ///
    /// Returns an error if any landmark cannot be represented in pixels; the hand
    /// is then unusable as a whole
    pub fn adapt(&self, raw: &RawHand, width: i32, height: i32) -> Result<Hand> {
        let mut landmarks = [Landmark::default(); crate::constants::NUM_HAND_LANDMARKS];
        for (out, lm) in landmarks.iter_mut().zip(raw.landmarks.iter()) {
            *out = Self::to_pixels(lm, width, height)?;
        }

        Ok(Hand {
            landmarks,
            side: self.correct_side(raw.label),
        })
    }

    /// Convert every raw hand of a frame, dropping hands that cannot be converted
    #[must_use]
    pub fn adapt_frame(&self, raw_hands: &[RawHand], width: i32, height: i32) -> FrameResult {
        let hands = raw_hands
            .iter()
            .filter_map(|raw| match self.adapt(raw, width, height) {
                Ok(hand) => Some(hand),
                Err(e) => {
                    warn!("Dropping {} hand: {}", raw.label, e);
                    None
                }
            })
            .collect();

        FrameResult { hands, width, height }
    }
}

impl Default for CoordinateAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}
