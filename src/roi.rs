//! Rotated square regions of interest that the landmark model is run on.

use crate::{
    constants::{PALM_ROI_SCALE, PALM_ROI_SHIFT_Y, TRACKED_ROI_SCALE, TRACKED_ROI_SHIFT_Y},
    hand::landmarks,
    palm_detection::PalmDetection,
    Error, Result,
};
use opencv::core::{Mat, Scalar, Size, BORDER_CONSTANT};
use opencv::imgproc::{self, InterpolationFlags};
use std::f32::consts::{FRAC_PI_2, PI};

/// Wrap an angle into `[-PI, PI)`
#[must_use]
pub fn normalize_radians(angle: f32) -> f32 {
    angle - 2.0 * PI * ((angle + PI) / (2.0 * PI)).floor()
}

/// Rotation that turns the `from -> to` direction into `target` (image y axis points down)
#[must_use]
pub fn rotation_between(from: (f32, f32), to: (f32, f32), target: f32) -> f32 {
    normalize_radians(target - (-(to.1 - from.1)).atan2(to.0 - from.0))
}

/// Square region in frame pixels, rotated clockwise by `rotation` radians around its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandRoi {
    pub center_x: f32,
    pub center_y: f32,
    pub size: f32,
    pub rotation: f32,
}

impl HandRoi {
    /// Shift a rotated rectangle in its own axes and grow it into a square
    #[must_use]
    pub fn from_rect(
        center: (f32, f32),
        width: f32,
        height: f32,
        rotation: f32,
        shift_y: f32,
        scale: f32,
    ) -> Self {
        let (sin, cos) = rotation.sin_cos();
        let x_shift = -height * shift_y * sin;
        let y_shift = height * shift_y * cos;

        Self {
            center_x: center.0 + x_shift,
            center_y: center.1 + y_shift,
            size: width.max(height) * scale,
            rotation,
        }
    }

    /// Region covering the whole hand around a detected palm
    #[must_use]
    pub fn from_palm(palm: &PalmDetection) -> Self {
        let rotation = match (palm.keypoints.first(), palm.keypoints.get(2)) {
            (Some(wrist), Some(middle)) => rotation_between(*wrist, *middle, FRAC_PI_2),
            _ => 0.0,
        };
        Self::from_rect(
            palm.center,
            palm.width,
            palm.height,
            rotation,
            PALM_ROI_SHIFT_Y,
            PALM_ROI_SCALE,
        )
    }

    /// Region for the next frame derived from this frame's landmarks (frame pixels)
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 21 landmarks are given
    pub fn from_landmarks(points: &[(f32, f32)]) -> Result<Self> {
        if points.len() <= landmarks::PINKY_TIP {
            return Err(Error::InvalidInput(format!(
                "Expected 21 landmarks for region tracking, got {}",
                points.len()
            )));
        }

        let rotation = rotation_between(
            points[landmarks::WRIST],
            points[landmarks::MIDDLE_FINGER_MCP],
            FRAC_PI_2,
        );
        let palm: Vec<(f32, f32)> = landmarks::PALM.iter().map(|&i| points[i]).collect();

        let (min_x, max_x, min_y, max_y) = bounds(palm.iter().copied());
        let axis_center = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

        // Bounds measured along the region's own axes
        let (sin, cos) = rotation.sin_cos();
        let local = palm.iter().map(|&(x, y)| {
            let (dx, dy) = (x - axis_center.0, y - axis_center.1);
            (cos * dx + sin * dy, -sin * dx + cos * dy)
        });
        let (lmin_x, lmax_x, lmin_y, lmax_y) = bounds(local);
        let (lcx, lcy) = ((lmin_x + lmax_x) / 2.0, (lmin_y + lmax_y) / 2.0);
        let center = (
            axis_center.0 + cos * lcx - sin * lcy,
            axis_center.1 + sin * lcx + cos * lcy,
        );

        Ok(Self::from_rect(
            center,
            lmax_x - lmin_x,
            lmax_y - lmin_y,
            rotation,
            TRACKED_ROI_SHIFT_Y,
            TRACKED_ROI_SCALE,
        ))
    }

    /// Affine transform (2x3, row-major) from frame pixels to a `crop_size` square crop
    #[must_use]
    pub fn frame_to_crop(&self, crop_size: i32) -> [[f64; 3]; 2] {
        let k = f64::from(crop_size) / f64::from(self.size.max(f32::EPSILON));
        let half = f64::from(crop_size) / 2.0;
        let (sin, cos) = f64::from(self.rotation).sin_cos();
        let (cx, cy) = (f64::from(self.center_x), f64::from(self.center_y));

        [
            [k * cos, k * sin, half - k * (cos * cx + sin * cy)],
            [-k * sin, k * cos, half - k * (-sin * cx + cos * cy)],
        ]
    }

    /// Map a point of the crop back into frame pixels
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn crop_to_frame(&self, u: f32, v: f32, crop_size: i32) -> (f32, f32) {
        let half = crop_size as f32 / 2.0;
        let scale = self.size / crop_size as f32;
        let (lx, ly) = ((u - half) * scale, (v - half) * scale);
        let (sin, cos) = self.rotation.sin_cos();
        (
            self.center_x + cos * lx - sin * ly,
            self.center_y + sin * lx + cos * ly,
        )
    }

    /// Cut the region out of `image` as an upright `crop_size` square
    ///
    /// # Errors
    ///
    /// Returns an error if the warp fails
    pub fn crop(&self, image: &Mat, crop_size: i32) -> Result<Mat> {
        let matrix = Mat::from_slice_2d(&self.frame_to_crop(crop_size))?;
        let mut crop = Mat::default();
        imgproc::warp_affine(
            image,
            &mut crop,
            &matrix,
            Size::new(crop_size, crop_size),
            InterpolationFlags::INTER_LINEAR as i32,
            BORDER_CONSTANT,
            Scalar::all(0.0),
        )?;
        Ok(crop)
    }

    /// Corners in frame pixels, clockwise from top-left of the crop
    #[must_use]
    pub fn corners(&self) -> [(f32, f32); 4] {
        let half = self.size / 2.0;
        let (sin, cos) = self.rotation.sin_cos();
        [(-half, -half), (half, -half), (half, half), (-half, half)].map(|(lx, ly)| {
            (
                self.center_x + cos * lx - sin * ly,
                self.center_y + sin * lx + cos * ly,
            )
        })
    }

    /// Intersection over union of the axis-aligned bounds of two regions
    #[must_use]
    pub fn iou(&self, other: &Self) -> f32 {
        let (ax0, ax1, ay0, ay1) = bounds(self.corners().into_iter());
        let (bx0, bx1, by0, by1) = bounds(other.corners().into_iter());

        let w = (ax1.min(bx1) - ax0.max(bx0)).max(0.0);
        let h = (ay1.min(by1) - ay0.max(by0)).max(0.0);
        let inter = w * h;
        let union = (ax1 - ax0) * (ay1 - ay0) + (bx1 - bx0) * (by1 - by0) - inter;

        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }
}

/// (min_x, max_x, min_y, max_y) of a point set
fn bounds(points: impl Iterator<Item = (f32, f32)>) -> (f32, f32, f32, f32) {
    points.fold(
        (f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), (x, y)| (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y)),
    )
}
