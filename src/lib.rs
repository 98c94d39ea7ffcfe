//! Hand tracking bridge: real-time hand landmarks for external renderers.
//!
//! This library captures frames, runs a pretrained hand landmark model on them
//! and forwards the 21-point skeleton of every hand to a consumer:
//! - live tracking sends one UDP datagram per frame (`[x, y, z, ...]`)
//! - animation runs record one text file per hand side for later playback
//!
//! The pipeline for each frame is:
//! 1. Mirror the frame horizontally
//! 2. Find hands with the model (palm detection, then landmark regression)
//! 3. Convert normalized landmarks to integer pixels and swap the left/right
//!    label back to the user's point of view
//! 4. Hand the result to the active [`sinks::FrameSink`]
//!
//! # Examples
//!
//! ## Streaming a camera
//!
//! ```no_run
//! use hand_tracking_bridge::{
//!     app::{FramePipeline, RunMode, create_sink},
//!     config::Config,
//!     detector::LandmarkDetector,
//! };
//! use opencv::{videoio, core::Mat, prelude::*};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let detector = LandmarkDetector::from_config(&config.models, &config.detection)?;
//! let sink = create_sink(RunMode::Tracking, &config)?;
//! let mut pipeline = FramePipeline::new(detector, sink);
//!
//! let mut cap = videoio::VideoCapture::new(0, videoio::CAP_ANY)?;
//! let mut frame = Mat::default();
//! while cap.read(&mut frame)? && !frame.empty() {
//!     let detection = pipeline.process(&frame)?;
//!     println!("{} hands", detection.result.hands.len());
//! }
//! pipeline.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Converting model output by hand
//!
//! ```
//! use hand_tracking_bridge::{
//!     adapter::CoordinateAdapter,
//!     hand::{Handedness, NormalizedLandmark, RawHand},
//! };
//!
//! let raw = RawHand {
//!     landmarks: [NormalizedLandmark::new(0.5, 0.5, 0.0); 21],
//!     label: Handedness::Left,
//!     score: 0.9,
//! };
//! let hand = CoordinateAdapter::default().adapt(&raw, 800, 600).unwrap();
//! assert_eq!((hand.landmarks[0].x, hand.landmarks[0].y), (400, 300));
//! assert_eq!(hand.side, Handedness::Right);
//! ```
//!
//! ## Replaying a recording
//!
//! ```no_run
//! use hand_tracking_bridge::playback::{AnimationClip, DEFAULT_UNIT_SCALE};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut clip = AnimationClip::load("Animation1.txt", DEFAULT_UNIT_SCALE)?;
//! if let Some(points) = clip.next_frame() {
//!     println!("wrist at {:?}", points[0]);
//! }
//! # Ok(())
//! # }
//! ```

/// Hand skeleton types shared across the pipeline
pub mod hand;

/// Conversion of model output to pixels with handedness correction
pub mod adapter;

/// Palm detection module for locating hands
pub mod palm_detection;

/// Hand landmark regression on a cropped hand
pub mod hand_landmark;

/// Rotated hand regions
pub mod roi;

/// Hand model trait and its ONNX implementation
pub mod model;

/// Landmark detector combining model, adapter and preview mirroring
pub mod detector;

/// Frame sinks: animation files and UDP
pub mod sinks;

/// Consumer-side decoding and animation playback
pub mod playback;

/// Utility functions for image processing and coordinate transformations
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
