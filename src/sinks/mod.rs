//! Destinations for per-frame hand coordinates.
//!
//! Exactly one sink is active per run: live tracking streams every frame over
//! UDP, offline runs accumulate an animation and write it when the input ends.

/// Animation recorder that writes one text file per hand side
pub mod animation;

/// UDP sender for real-time consumers
pub mod network;

use crate::{hand::FrameResult, Result};

pub use animation::AnimationWriter;
pub use network::UdpSender;

/// Trait for everything that consumes detected hands
pub trait FrameSink {
    /// Handle the hands of one frame
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot deliver the frame
    fn accept(&mut self, frame: &FrameResult) -> Result<()>;

    /// Flush anything held back until the end of the run
    ///
    /// # Errors
    ///
    /// Returns an error if buffered data cannot be persisted
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Get sink name
    fn name(&self) -> &str;
}

/// Join integers the way consumers split them: `a,b,c`
#[must_use]
pub fn join_values<I>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = i32>,
{
    values
        .into_iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Parse a separator-joined list of integers
///
/// # Errors
///
/// Returns an error on any token that is not an integer
pub fn parse_values(text: &str) -> Result<Vec<i32>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<i32>()
                .map_err(|e| crate::Error::Sink(format!("Invalid coordinate '{token}': {e}")))
        })
        .collect()
}
