use crate::{
    constants::{LANDMARK_INPUT_SIZE, NUM_HAND_LANDMARKS, VALUES_PER_HAND},
    error::Error,
    hand::Handedness,
    utils::image_conversion::{mat_to_input_tensor, TensorLayout},
    Result,
};
use ndarray::CowArray;
use opencv::core::{Mat, Size};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Landmark model output for one crop
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkEstimate {
    /// (x, y, z) in crop pixels; z is relative depth at the same scale as x
    pub landmarks: [(f32, f32, f32); NUM_HAND_LANDMARKS],
    /// Probability that the crop contains a hand
    pub presence: f32,
    /// Label as seen by the model (before any mirroring correction)
    pub handedness: Handedness,
    /// Probability behind `handedness`
    pub handedness_score: f32,
}

/// Interpret the landmark model's outputs.
///
/// The first output holding 63 values is the screen-space skeleton (a second
/// one, the world skeleton, is ignored). Single-value outputs are, in order,
/// hand presence and the probability of a right hand.
///
/// # Errors
///
/// Returns an error if the skeleton or either scalar output is missing
pub fn parse_outputs(outputs: &[Vec<f32>]) -> Result<LandmarkEstimate> {
    let coords = outputs
        .iter()
        .find(|values| values.len() == VALUES_PER_HAND)
        .ok_or_else(|| Error::ModelOutputError("Landmark model has no 63-value output".to_string()))?;

    let mut scalars = outputs.iter().filter(|values| values.len() == 1).map(|values| values[0]);
    let presence = scalars
        .next()
        .ok_or_else(|| Error::ModelOutputError("Landmark model has no presence output".to_string()))?;
    let right_score = scalars
        .next()
        .ok_or_else(|| Error::ModelOutputError("Landmark model has no handedness output".to_string()))?;

    let mut landmarks = [(0.0, 0.0, 0.0); NUM_HAND_LANDMARKS];
    for (out, xyz) in landmarks.iter_mut().zip(coords.chunks_exact(3)) {
        *out = (xyz[0], xyz[1], xyz[2]);
    }

    let (handedness, handedness_score) = if right_score > 0.5 {
        (Handedness::Right, right_score)
    } else {
        (Handedness::Left, 1.0 - right_score)
    };

    Ok(LandmarkEstimate {
        landmarks,
        presence,
        handedness,
        handedness_score,
    })
}

/// Hand landmark regressor using ONNX Runtime
pub struct HandLandmarker {
    session: Session,
    layout: TensorLayout,
    input_size: i32,
}

impl HandLandmarker {
    /// Create a new landmark model from an ONNX file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file is missing or cannot be loaded
    /// - The model has no inputs
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        log::info!("Initializing HandLandmarker with model: {}", model_path.display());
        if !model_path.is_file() {
            return Err(Error::ModelError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        let environment = Arc::new(
            Environment::builder()
                .with_name("hand_landmarker")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)
            .map_err(|e| Error::ModelError(format!("Failed to load {}: {e}", model_path.display())))?;

        let input_shape = &session
            .inputs
            .first()
            .ok_or_else(|| Error::ModelInputError("Model has no inputs".to_string()))?
            .dimensions;

        let layout = TensorLayout::from_dimensions(input_shape);
        #[allow(clippy::cast_possible_wrap)]
        let input_size = layout
            .spatial_size(input_shape)
            .map_or(LANDMARK_INPUT_SIZE, |(w, _)| w as i32);

        Ok(Self {
            session,
            layout,
            input_size,
        })
    }

    /// Square crop size the model expects
    #[must_use]
    pub fn input_size(&self) -> i32 {
        self.input_size
    }

    /// Estimate the skeleton in a BGR hand crop
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing, inference or output parsing fails
    pub fn estimate(&self, crop: &Mat) -> Result<LandmarkEstimate> {
        let input = if crop.cols() == self.input_size && crop.rows() == self.input_size {
            crop.clone()
        } else {
            let mut resized = Mat::default();
            imgproc::resize(
                crop,
                &mut resized,
                Size::new(self.input_size, self.input_size),
                0.0,
                0.0,
                InterpolationFlags::INTER_LINEAR as i32,
            )?;
            resized
        };

        let tensor = mat_to_input_tensor(&input, self.layout)?;
        let cow_array = CowArray::from(tensor.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;
        let values = outputs
            .iter()
            .map(|output| {
                let tensor = output.try_extract::<f32>()?;
                let view = tensor.view();
                Ok(view.iter().copied().collect::<Vec<f32>>())
            })
            .collect::<Result<Vec<_>>>()?;

        parse_outputs(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(presence: f32, right: f32) -> Vec<Vec<f32>> {
        let screen: Vec<f32> = (0..VALUES_PER_HAND).map(|v| v as f32).collect();
        let world = vec![0.0; VALUES_PER_HAND];
        vec![screen, vec![presence], vec![right], world]
    }

    #[test]
    fn test_parse_outputs() {
        let estimate = parse_outputs(&outputs(0.9, 0.8)).unwrap();
        assert_eq!(estimate.landmarks[0], (0.0, 1.0, 2.0));
        assert_eq!(estimate.landmarks[20], (60.0, 61.0, 62.0));
        assert!((estimate.presence - 0.9).abs() < 1e-6);
        assert_eq!(estimate.handedness, Handedness::Right);
    }

    #[test]
    fn test_low_right_score_is_left() {
        let estimate = parse_outputs(&outputs(0.9, 0.2)).unwrap();
        assert_eq!(estimate.handedness, Handedness::Left);
        assert!((estimate.handedness_score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_missing_outputs() {
        assert!(parse_outputs(&[vec![0.5], vec![0.5]]).is_err());
        assert!(parse_outputs(&[vec![0.0; VALUES_PER_HAND], vec![0.5]]).is_err());
    }
}
