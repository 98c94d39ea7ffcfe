//! The hand model seam and its ONNX implementation.
//!
//! [`TrackingHandModel`] chains a palm detector and a landmark regressor. Outside
//! static image mode, every accepted hand seeds the region searched in the next
//! frame, and palm detection only runs while fewer than `max_num_hands` distinct
//! hands are being tracked.

use crate::{
    config::{DetectionConfig, ModelConfig},
    constants::{
        LANDMARK_Z_NORMALIZATION, NUM_HAND_LANDMARKS, PALM_NMS_THRESHOLD, TRACKED_ROI_IOU_THRESHOLD,
    },
    hand::{NormalizedLandmark, RawHand},
    hand_landmark::{HandLandmarker, LandmarkEstimate},
    palm_detection::{PalmDetection, PalmDetector},
    roi::HandRoi,
    Result,
};
use log::{debug, info};
use opencv::core::Mat;
use opencv::prelude::*;

/// Trait for pretrained models that find hands in a frame
pub trait HandModel {
    /// Find hands in a BGR frame, returning landmarks normalized to that frame
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails
    fn process(&mut self, image: &Mat) -> Result<Vec<RawHand>>;

    /// Get model name
    fn name(&self) -> &str;
}

/// First stage: palms in a full frame
pub trait PalmStage {
    /// Palms in frame pixels, best first
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails
    fn detect(&self, image: &Mat) -> Result<Vec<PalmDetection>>;
}

/// Second stage: landmarks in a square hand crop
pub trait LandmarkStage {
    /// Side of the square crop the stage expects
    fn input_size(&self) -> i32;

    /// Landmarks in crop pixels plus presence and handedness
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails
    fn estimate(&self, crop: &Mat) -> Result<LandmarkEstimate>;
}

impl PalmStage for PalmDetector {
    fn detect(&self, image: &Mat) -> Result<Vec<PalmDetection>> {
        PalmDetector::detect(self, image)
    }
}

impl LandmarkStage for HandLandmarker {
    fn input_size(&self) -> i32 {
        HandLandmarker::input_size(self)
    }

    fn estimate(&self, crop: &Mat) -> Result<LandmarkEstimate> {
        HandLandmarker::estimate(self, crop)
    }
}

/// Combine tracked regions with new palm regions, up to `max_hands`
///
/// A region overlapping one already kept is dropped, whether it was tracked or
/// comes from a palm. Tracked regions win over palms.
#[must_use]
pub fn merge_regions(regions: Vec<HandRoi>, palms: &[PalmDetection], max_hands: usize) -> Vec<HandRoi> {
    let mut merged: Vec<HandRoi> = Vec::with_capacity(max_hands);
    for candidate in regions.into_iter().chain(palms.iter().map(HandRoi::from_palm)) {
        if merged.len() >= max_hands {
            break;
        }
        if merged
            .iter()
            .all(|region| region.iou(&candidate) <= TRACKED_ROI_IOU_THRESHOLD)
        {
            merged.push(candidate);
        }
    }
    merged
}

/// Map crop-space landmarks back to coordinates normalized by the frame size
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn project_landmarks(
    estimate: &LandmarkEstimate,
    roi: &HandRoi,
    crop_size: i32,
    frame_width: i32,
    frame_height: i32,
) -> RawHand {
    let (w, h) = (frame_width as f32, frame_height as f32);
    let z_scale = roi.size / (crop_size as f32 * LANDMARK_Z_NORMALIZATION * w);

    let mut landmarks = [NormalizedLandmark::default(); NUM_HAND_LANDMARKS];
    for (out, &(u, v, z)) in landmarks.iter_mut().zip(estimate.landmarks.iter()) {
        let (x, y) = roi.crop_to_frame(u, v, crop_size);
        *out = NormalizedLandmark::new(x / w, y / h, z * z_scale);
    }

    RawHand {
        landmarks,
        label: estimate.handedness,
        score: estimate.presence,
    }
}

/// Palm detector plus landmark regressor, with region tracking between frames
pub struct TrackingHandModel {
    palm: Box<dyn PalmStage>,
    landmarker: Box<dyn LandmarkStage>,
    settings: DetectionConfig,
    tracked: Vec<HandRoi>,
}

impl TrackingHandModel {
    /// Chain two stages
    #[must_use]
    pub fn new(palm: Box<dyn PalmStage>, landmarker: Box<dyn LandmarkStage>, settings: &DetectionConfig) -> Self {
        Self {
            palm,
            landmarker,
            settings: settings.clone(),
            tracked: Vec::new(),
        }
    }

    /// Load the ONNX models selected by `settings.model_complexity`
    ///
    /// # Errors
    ///
    /// Returns an error if the complexity is unsupported or a model fails to load
    pub fn from_onnx(models: &ModelConfig, settings: &DetectionConfig) -> Result<Self> {
        let (palm_path, landmark_path) = models.paths_for(settings.model_complexity)?;
        info!(
            "Loading hand models (complexity {}, max {} hands)",
            settings.model_complexity, settings.max_num_hands
        );

        let palm = PalmDetector::new(palm_path, settings.min_detection_confidence, PALM_NMS_THRESHOLD)?;
        let landmarker = HandLandmarker::new(landmark_path)?;

        Ok(Self::new(Box::new(palm), Box::new(landmarker), settings))
    }

    /// Regions that will be searched first on the next frame
    #[must_use]
    pub fn tracked_regions(&self) -> &[HandRoi] {
        &self.tracked
    }
}

impl HandModel for TrackingHandModel {
    fn process(&mut self, image: &Mat) -> Result<Vec<RawHand>> {
        let (width, height) = (image.cols(), image.rows());
        let max_hands = self.settings.max_num_hands;

        let tracked = if self.settings.static_image_mode {
            Vec::new()
        } else {
            merge_regions(std::mem::take(&mut self.tracked), &[], max_hands)
        };

        let regions = if tracked.len() < max_hands {
            let palms = self.palm.detect(image)?;
            debug!("{} palms detected, {} regions tracked", palms.len(), tracked.len());
            merge_regions(tracked, &palms, max_hands)
        } else {
            tracked
        };

        let crop_size = self.landmarker.input_size();
        let mut hands = Vec::with_capacity(regions.len());
        let mut next = Vec::with_capacity(regions.len());

        for roi in &regions {
            let crop = roi.crop(image, crop_size)?;
            let estimate = self.landmarker.estimate(&crop)?;
            if estimate.presence < self.settings.min_tracking_confidence {
                debug!("Hand lost (presence {:.2})", estimate.presence);
                continue;
            }

            let raw = project_landmarks(&estimate, roi, crop_size, width, height);

            if !self.settings.static_image_mode {
                let points: Vec<(f32, f32)> = raw
                    .landmarks
                    .iter()
                    .map(|lm| (lm.x * width as f32, lm.y * height as f32))
                    .collect();
                next.push(HandRoi::from_landmarks(&points)?);
            }
            hands.push(raw);
        }

        self.tracked = next;
        Ok(hands)
    }

    fn name(&self) -> &str {
        "palm+landmark"
    }
}
