//! Landmark detector: infer, convert, mirror the preview, and optionally draw.
//!
//! The model runs on the camera frame as captured and every emitted coordinate
//! refers to it. Only the preview is mirrored, so the user sees a mirror view.

use crate::{
    adapter::CoordinateAdapter,
    config::{DetectionConfig, ModelConfig},
    constants::LANDMARK_RADIUS,
    hand::{FrameResult, RawHand, HAND_CONNECTIONS},
    model::{HandModel, TrackingHandModel},
    utils::mirror_frame,
    Result,
};
use log::debug;
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, LINE_8},
    prelude::*,
};

/// Landmark and skeleton colour (BGR)
const LANDMARK_COLOR: (f64, f64, f64) = (36.0, 122.0, 243.0);

/// Everything produced for one frame
#[derive(Debug)]
pub struct Detection {
    /// Mirrored copy of the analysed frame, for display
    pub image: Mat,
    /// Model output before conversion
    pub raw: Vec<RawHand>,
    /// Pixel coordinates with corrected sides
    pub result: FrameResult,
}

/// Finds hands in camera frames
pub struct LandmarkDetector {
    model: Box<dyn HandModel>,
    adapter: CoordinateAdapter,
    max_num_hands: usize,
}

impl LandmarkDetector {
    /// Wrap any hand model
    #[must_use]
    pub fn new(model: Box<dyn HandModel>, adapter: CoordinateAdapter, max_num_hands: usize) -> Self {
        Self {
            model,
            adapter,
            max_num_hands,
        }
    }

    /// Load the ONNX models named by the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a model cannot be loaded
    pub fn from_config(models: &ModelConfig, detection: &DetectionConfig) -> Result<Self> {
        let model = TrackingHandModel::from_onnx(models, detection)?;
        Ok(Self::new(
            Box::new(model),
            CoordinateAdapter::new(detection.flip_type),
            detection.max_num_hands,
        ))
    }

    /// Run the model on the frame, convert its output to pixels and mirror the preview
    ///
    /// No hands is an empty result, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if inference or mirroring fails
    pub fn find_hands(&mut self, frame: &Mat) -> Result<Detection> {
        let mut raw = self.model.process(frame)?;
        raw.truncate(self.max_num_hands);

        let result = self.adapter.adapt_frame(&raw, frame.cols(), frame.rows());
        let image = mirror_frame(frame)?;
        debug!(
            "{}: {} raw hands, {} converted",
            self.model.name(),
            raw.len(),
            result.hands.len()
        );

        Ok(Detection { image, raw, result })
    }

    /// Name of the underlying model
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

/// Draw skeleton connections and filled landmark circles on the mirrored preview
///
/// Landmarks are in unmirrored frame pixels, so x is reflected across the frame width.
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn draw_hands(image: &mut Mat, result: &FrameResult) -> Result<()> {
    let color = Scalar::new(LANDMARK_COLOR.0, LANDMARK_COLOR.1, LANDMARK_COLOR.2, 0.0);

    let mirror = |x: i32| result.width.saturating_sub(1).saturating_sub(x);

    for hand in &result.hands {
        for (a, b) in HAND_CONNECTIONS {
            let (from, to) = (hand.landmarks[a], hand.landmarks[b]);
            imgproc::line(
                image,
                Point::new(mirror(from.x), from.y),
                Point::new(mirror(to.x), to.y),
                Scalar::new(255.0, 255.0, 255.0, 0.0),
                2,
                LINE_8,
                0,
            )?;
        }

        for landmark in &hand.landmarks {
            imgproc::circle(
                image,
                Point::new(mirror(landmark.x), landmark.y),
                LANDMARK_RADIUS,
                color,
                -1,
                LINE_8,
                0,
            )?;
        }
    }

    Ok(())
}
