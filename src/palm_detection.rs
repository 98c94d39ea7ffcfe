use crate::{
    constants::{PALM_BOX_VALUES, PALM_INPUT_SIZE, PALM_NUM_KEYPOINTS, PALM_SCORE_CLIP},
    error::Error,
    utils::image_conversion::{mat_to_input_tensor, TensorLayout},
    Result,
};
use ndarray::{Array2, CowArray};
use opencv::core::{Mat, Rect, Scalar, Size, CV_8UC3};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Feature map strides of the palm detector's SSD heads
pub const PALM_STRIDES: [i32; 4] = [8, 16, 16, 16];

/// Anchors emitted per location for each head
const ANCHORS_PER_LAYER: usize = 2;

/// Palm detection result in frame pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PalmDetection {
    /// Center of the palm box
    pub center: (f32, f32),
    pub width: f32,
    pub height: f32,
    /// Seven palm keypoints; 0 is the wrist, 2 the middle finger base
    pub keypoints: Vec<(f32, f32)>,
    /// Confidence score of the detection
    pub score: f32,
}

impl PalmDetection {
    /// Axis-aligned box as (x1, y1, x2, y2)
    #[must_use]
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        (
            self.center.0 - self.width / 2.0,
            self.center.1 - self.height / 2.0,
            self.center.0 + self.width / 2.0,
            self.center.1 + self.height / 2.0,
        )
    }

    /// Intersection over union with another detection
    #[must_use]
    pub fn iou(&self, other: &Self) -> f32 {
        let (ax1, ay1, ax2, ay2) = self.corners();
        let (bx1, by1, bx2, by2) = other.corners();

        let w = (ax2.min(bx2) - ax1.max(bx1)).max(0.0);
        let h = (ay2.min(by2) - ay1.max(by1)).max(0.0);
        let inter = w * h;
        let union = self.width * self.height + other.width * other.height - inter;

        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }
}

/// Logistic function with the logit clipped to `[-PALM_SCORE_CLIP, PALM_SCORE_CLIP]`
#[must_use]
pub fn sigmoid(logit: f32) -> f32 {
    1.0 / (1.0 + (-logit.clamp(-PALM_SCORE_CLIP, PALM_SCORE_CLIP)).exp())
}

/// Generate normalized SSD anchor centers, one row (cx, cy) per anchor
///
/// Consecutive heads with the same stride share one feature map and stack
/// their anchors per location.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn generate_anchors(input_size: i32, strides: &[i32]) -> Array2<f32> {
    let mut centers = Vec::new();
    let mut layer = 0;

    while layer < strides.len() {
        let stride = strides[layer];
        let mut repeats = 0;
        while layer < strides.len() && strides[layer] == stride {
            repeats += ANCHORS_PER_LAYER;
            layer += 1;
        }

        let grid = (input_size + stride - 1) / stride;
        for y in 0..grid {
            for x in 0..grid {
                let cx = (x as f32 + 0.5) / grid as f32;
                let cy = (y as f32 + 0.5) / grid as f32;
                for _ in 0..repeats {
                    centers.push(cx);
                    centers.push(cy);
                }
            }
        }
    }

    let n_anchors = centers.len() / 2;
    Array2::from_shape_vec((n_anchors, 2), centers).unwrap_or_else(|_| Array2::zeros((0, 2)))
}

/// Decode raw regressor rows into frame-space detections above `threshold`
///
/// `boxes` holds one row of [`PALM_BOX_VALUES`] per anchor, in model input pixels
/// relative to the anchor. `det_scale` is the letterbox resize factor.
///
/// # Errors
///
/// Returns an error if boxes, scores and anchors disagree in count
#[allow(clippy::cast_precision_loss)]
pub fn decode_palms(
    boxes: &Array2<f32>,
    scores: &[f32],
    anchors: &Array2<f32>,
    input_size: i32,
    threshold: f32,
    det_scale: f32,
) -> Result<Vec<PalmDetection>> {
    let n_anchors = anchors.nrows();
    if boxes.nrows() != n_anchors || scores.len() != n_anchors || boxes.ncols() < PALM_BOX_VALUES {
        return Err(Error::ModelDataFormatError(format!(
            "Palm outputs do not match anchors: {} boxes x {}, {} scores, {} anchors",
            boxes.nrows(),
            boxes.ncols(),
            scores.len(),
            n_anchors
        )));
    }

    let size = input_size as f32;
    // Normalized input coordinates to frame pixels
    let to_frame = size / det_scale;

    let detections = scores
        .iter()
        .enumerate()
        .filter_map(|(i, &logit)| {
            let score = sigmoid(logit);
            if score < threshold {
                return None;
            }

            let row = boxes.row(i);
            let (ax, ay) = (anchors[[i, 0]], anchors[[i, 1]]);
            let keypoints = (0..PALM_NUM_KEYPOINTS)
                .map(|k| {
                    (
                        (row[4 + k * 2] / size + ax) * to_frame,
                        (row[5 + k * 2] / size + ay) * to_frame,
                    )
                })
                .collect();

            Some(PalmDetection {
                center: ((row[0] / size + ax) * to_frame, (row[1] / size + ay) * to_frame),
                width: row[2] / size * to_frame,
                height: row[3] / size * to_frame,
                keypoints,
                score,
            })
        })
        .collect();

    Ok(detections)
}

/// Greedy non-maximum suppression, highest score first
#[must_use]
pub fn non_max_suppression(mut detections: Vec<PalmDetection>, iou_threshold: f32) -> Vec<PalmDetection> {
    detections.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut keep: Vec<PalmDetection> = Vec::new();
    for candidate in detections {
        if keep.iter().all(|kept| kept.iou(&candidate) <= iou_threshold) {
            keep.push(candidate);
        }
    }
    keep
}

/// SSD palm detector using ONNX Runtime
pub struct PalmDetector {
    session: Session,
    layout: TensorLayout,
    input_size: i32,
    conf_threshold: f32,
    nms_threshold: f32,
    anchors: Array2<f32>,
}

impl PalmDetector {
    /// Create a new palm detector from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file is missing or cannot be loaded
    /// - The model has no inputs
    pub fn new<P: AsRef<Path>>(model_path: P, conf_threshold: f32, nms_threshold: f32) -> Result<Self> {
        let model_path = model_path.as_ref();
        log::info!("Initializing PalmDetector with model: {}", model_path.display());
        if !model_path.is_file() {
            return Err(Error::ModelError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        let environment = Arc::new(
            Environment::builder()
                .with_name("palm_detector")
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
            .map_or(PALM_INPUT_SIZE, |(w, _)| w as i32);

        let anchors = generate_anchors(input_size, &PALM_STRIDES);
        log::debug!(
            "Palm detector input {}x{} ({:?}), {} anchors",
            input_size,
            input_size,
            layout,
            anchors.nrows()
        );

        Ok(Self {
            session,
            layout,
            input_size,
            conf_threshold,
            nms_threshold,
            anchors,
        })
    }

    /// Detect palms in a BGR frame
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn detect(&self, image: &Mat) -> Result<Vec<PalmDetection>> {
        let img_height = image.rows();
        let img_width = image.cols();
        if img_height <= 0 || img_width <= 0 {
            return Err(Error::InvalidInput(format!(
                "Cannot detect palms in a {img_width}x{img_height} image"
            )));
        }

        // Letterbox into the square input, anchored top-left
        let ratio_img = img_height as f32 / img_width as f32;
        let (new_width, new_height) = if ratio_img > 1.0 {
            let new_height = self.input_size;
            ((new_height as f32 / ratio_img) as i32, new_height)
        } else {
            let new_width = self.input_size;
            (new_width, (new_width as f32 * ratio_img) as i32)
        };
        let det_scale = new_height as f32 / img_height as f32;

        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(new_width.max(1), new_height.max(1)),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut det_img =
            Mat::new_rows_cols_with_default(self.input_size, self.input_size, CV_8UC3, Scalar::all(0.0))?;
        let mut roi = det_img.roi_mut(Rect::new(0, 0, resized.cols(), resized.rows()))?;
        resized.copy_to(&mut roi)?;

        let (boxes, scores) = self.forward(&det_img)?;
        let detections = decode_palms(
            &boxes,
            &scores,
            &self.anchors,
            self.input_size,
            self.conf_threshold,
            det_scale,
        )?;

        Ok(non_max_suppression(detections, self.nms_threshold))
    }

    /// Run the model, returning (regressors, score logits)
    fn forward(&self, det_img: &Mat) -> Result<(Array2<f32>, Vec<f32>)> {
        let inputs = mat_to_input_tensor(det_img, self.layout)?;
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let mut boxes = None;
        let mut scores = None;
        for output in &outputs {
            let tensor = output.try_extract::<f32>()?;
            let view = tensor.view();
            match view.shape().last() {
                Some(&PALM_BOX_VALUES) => boxes = Some(view.iter().copied().collect::<Vec<f32>>()),
                Some(&1) => scores = Some(view.iter().copied().collect::<Vec<f32>>()),
                _ => log::debug!("Ignoring palm output with shape {:?}", view.shape()),
            }
        }

        let boxes = boxes.ok_or_else(|| Error::ModelOutputError("Palm model has no box regressor output".to_string()))?;
        let scores = scores.ok_or_else(|| Error::ModelOutputError("Palm model has no score output".to_string()))?;

        let rows = boxes.len() / PALM_BOX_VALUES;
        let boxes = Array2::from_shape_vec((rows, PALM_BOX_VALUES), boxes)
            .map_err(|e| Error::ModelDataFormatError(format!("Failed to reshape palm boxes: {e}")))?;

        Ok((boxes, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palm(cx: f32, cy: f32, size: f32, score: f32) -> PalmDetection {
        PalmDetection {
            center: (cx, cy),
            width: size,
            height: size,
            keypoints: Vec::new(),
            score,
        }
    }

    #[test]
    fn test_anchor_count() {
        let anchors = generate_anchors(PALM_INPUT_SIZE, &PALM_STRIDES);
        // 24x24x2 on stride 8, 12x12x6 on the merged stride 16 heads
        assert_eq!(anchors.nrows(), 2016);
        assert!((anchors[[0, 0]] - 0.5 / 24.0).abs() < 1e-6);
        assert_eq!(anchors.row(0), anchors.row(1));
        assert!((anchors[[1152, 0]] - 0.5 / 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_sigmoid_clipped() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[test]
    fn test_decode_scales_to_frame() {
        let anchors = Array2::from_shape_vec((2, 2), vec![0.5, 0.5, 0.25, 0.25]).unwrap();
        let mut boxes = Array2::zeros((2, PALM_BOX_VALUES));
        boxes[[0, 2]] = 48.0;
        boxes[[0, 3]] = 48.0;
        boxes[[0, 4]] = 19.2;
        let scores = [5.0, -5.0];

        // 640x480 frame letterboxed into 192: det_scale = 0.3
        let palms = decode_palms(&boxes, &scores, &anchors, 192, 0.5, 0.3).unwrap();
        assert_eq!(palms.len(), 1);
        let p = &palms[0];
        assert!((p.center.0 - 320.0).abs() < 1e-3);
        assert!((p.center.1 - 320.0).abs() < 1e-3);
        assert!((p.width - 160.0).abs() < 1e-3);
        assert_eq!(p.keypoints.len(), PALM_NUM_KEYPOINTS);
        assert!((p.keypoints[0].0 - 384.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_rejects_mismatched_outputs() {
        let anchors = Array2::zeros((3, 2));
        let boxes = Array2::zeros((2, PALM_BOX_VALUES));
        assert!(decode_palms(&boxes, &[0.0, 0.0], &anchors, 192, 0.5, 1.0).is_err());
    }

    #[test]
    fn test_nms_keeps_best_overlapping() {
        let kept = non_max_suppression(
            vec![
                palm(100.0, 100.0, 50.0, 0.6),
                palm(105.0, 100.0, 50.0, 0.9),
                palm(400.0, 100.0, 50.0, 0.7),
            ],
            0.3,
        );
        assert_eq!(kept.len(), 2);
        assert!((kept[0].score - 0.9).abs() < 1e-6);
        assert!((kept[1].score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_iou() {
        let a = palm(100.0, 100.0, 40.0, 1.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
        assert!((a.iou(&palm(120.0, 100.0, 40.0, 1.0)) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(a.iou(&palm(300.0, 100.0, 40.0, 1.0)), 0.0);
    }
}
