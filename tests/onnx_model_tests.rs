//! Tests for ONNX model loading and inference

use hand_tracking_bridge::{
    config::{DetectionConfig, ModelConfig},
    constants::{LANDMARK_INPUT_SIZE, PALM_NMS_THRESHOLD},
    detector::LandmarkDetector,
    hand_landmark::HandLandmarker,
    model::{HandModel, TrackingHandModel},
    palm_detection::PalmDetector,
    Error, Result,
};
use opencv::core::{Mat, Scalar, CV_8UC3};
use std::path::Path;

fn gray_frame() -> Result<Mat> {
    Ok(Mat::new_rows_cols_with_default(
        480,
        640,
        CV_8UC3,
        Scalar::new(128.0, 128.0, 128.0, 0.0),
    )?)
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_load_palm_detector_model() -> Result<()> {
    let models = ModelConfig::default();
    assert!(models.palm_detector_lite.exists(), "Palm detector model not found");

    let _detector = PalmDetector::new(&models.palm_detector_lite, 0.4, PALM_NMS_THRESHOLD)?;
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_load_landmark_model() -> Result<()> {
    let model_path = Path::new("assets/hand_landmark_lite.onnx");
    assert!(model_path.exists(), "Hand landmark model not found");

    let landmarker = HandLandmarker::new(model_path)?;
    assert_eq!(landmarker.input_size(), LANDMARK_INPUT_SIZE);
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_blank_frame_has_no_palms() -> Result<()> {
    let detector = PalmDetector::new("assets/palm_detection_lite.onnx", 0.4, PALM_NMS_THRESHOLD)?;
    let palms = detector.detect(&gray_frame()?)?;
    assert!(palms.is_empty());
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_model_pipeline_on_blank_frame() -> Result<()> {
    let mut model = TrackingHandModel::from_onnx(&ModelConfig::default(), &DetectionConfig::default())?;
    let hands = model.process(&gray_frame()?)?;
    assert!(hands.is_empty());
    assert!(model.tracked_regions().is_empty());
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_detector_from_config() -> Result<()> {
    let mut detector = LandmarkDetector::from_config(&ModelConfig::default(), &DetectionConfig::default())?;
    let detection = detector.find_hands(&gray_frame()?)?;
    assert!(detection.result.is_empty());
    assert_eq!((detection.result.width, detection.result.height), (640, 480));
    Ok(())
}

#[test]
fn test_missing_model_is_an_error() {
    let models = ModelConfig {
        palm_detector_lite: "/nonexistent/palm.onnx".into(),
        ..ModelConfig::default()
    };
    let result = TrackingHandModel::from_onnx(&models, &DetectionConfig::default());
    assert!(matches!(result, Err(Error::ModelError(msg)) if msg.contains("/nonexistent/palm.onnx")));
}

#[test]
fn test_unsupported_complexity_is_an_error() {
    let settings = DetectionConfig {
        model_complexity: 3,
        ..DetectionConfig::default()
    };
    assert!(TrackingHandModel::from_onnx(&ModelConfig::default(), &settings).is_err());
}
