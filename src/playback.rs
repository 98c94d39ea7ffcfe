//! Playback of recorded animations and decoding of live datagrams.
//!
//! Renderers read the sinks' output as scene positions: every integer is divided
//! by a unit scale (100 pixels per unit by default) and live streams additionally
//! mirror x around a fixed offset.

use crate::{
    constants::{NUM_HAND_LANDMARKS, VALUES_PER_HAND},
    sinks::{animation::parse_animation_line, network::decode_datagram},
    Error, Result,
};
use log::info;
use std::path::Path;

/// Pixels per scene unit used by the bundled renderers
pub const DEFAULT_UNIT_SCALE: f32 = 100.0;

/// X offset the live renderer mirrors around, in scene units
pub const DEFAULT_MIRROR_OFFSET: f32 = 7.0;

/// Scene-space position of one landmark
pub type ScenePoint = [f32; 3];

/// Convert decoded integers into scene points, mirroring x as `offset - x` when given
///
/// # Errors
///
/// Returns an error if the value count is not a whole number of hands
#[allow(clippy::cast_precision_loss)]
pub fn to_scene_points(values: &[i32], unit_scale: f32, mirror_offset: Option<f32>) -> Result<Vec<ScenePoint>> {
    if values.len() % VALUES_PER_HAND != 0 {
        return Err(Error::Sink(format!(
            "{} values do not form whole hands of {}",
            values.len(),
            VALUES_PER_HAND
        )));
    }

    Ok(values
        .chunks_exact(3)
        .map(|xyz| {
            let x = xyz[0] as f32 / unit_scale;
            let x = mirror_offset.map_or(x, |offset| offset - x);
            [x, xyz[1] as f32 / unit_scale, xyz[2] as f32 / unit_scale]
        })
        .collect())
}

/// Decode a live datagram into scene points the way the live renderer does
///
/// # Errors
///
/// Returns an error if the payload is malformed
pub fn datagram_to_scene_points(payload: &str) -> Result<Vec<ScenePoint>> {
    let values = decode_datagram(payload)?;
    to_scene_points(&values, DEFAULT_UNIT_SCALE, Some(DEFAULT_MIRROR_OFFSET))
}

/// A recorded animation for one hand side, replayed in a loop
#[derive(Debug, Clone)]
pub struct AnimationClip {
    frames: Vec<[ScenePoint; NUM_HAND_LANDMARKS]>,
    cursor: usize,
}

impl AnimationClip {
    /// Load an animation file written by [`crate::sinks::AnimationWriter`]
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is malformed
    pub fn load<P: AsRef<Path>>(path: P, unit_scale: f32) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.as_ref().display())))?;
        let clip = Self::parse(&content, unit_scale)?;
        info!("Loaded {} animation frames from {}", clip.len(), path.as_ref().display());
        Ok(clip)
    }

    /// Parse animation text, one hand per non-empty line
    ///
    /// # Errors
    ///
    /// Returns an error naming the first malformed line
    #[allow(clippy::cast_precision_loss)]
    pub fn parse(content: &str, unit_scale: f32) -> Result<Self> {
        let frames = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                let landmarks = parse_animation_line(line)
                    .map_err(|e| Error::Sink(format!("Line {}: {e}", number + 1)))?;
                Ok(landmarks.map(|lm| {
                    [
                        lm.x as f32 / unit_scale,
                        lm.y as f32 / unit_scale,
                        lm.z as f32 / unit_scale,
                    ]
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { frames, cursor: 0 })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Current frame, advancing the cursor and wrapping to the start after the last one
    pub fn next_frame(&mut self) -> Option<&[ScenePoint; NUM_HAND_LANDMARKS]> {
        if self.frames.is_empty() {
            return None;
        }
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.frames.len();
        self.frames.get(index)
    }
}
