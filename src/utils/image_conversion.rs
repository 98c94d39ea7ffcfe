//! Image conversion utilities for OpenCV Mat and ndarray interoperability.

use crate::Result;
use ndarray::{Array3, Array4, Axis};
use opencv::core::{Mat, MatTraitConst, CV_32F};
use opencv::imgproc;

/// Memory layout a model expects for its image input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// Batch, channels, height, width
    Nchw,
    /// Batch, height, width, channels
    Nhwc,
}

impl TensorLayout {
    /// Infer the layout from a model's declared input dimensions.
    ///
    /// A 4D input whose second axis is 3 is taken as channels-first; anything else
    /// (including dynamic axes) falls back to channels-last, the layout of the
    /// converted hand models.
    #[must_use]
    pub fn from_dimensions(dimensions: &[Option<u32>]) -> Self {
        match dimensions {
            [_, Some(3), _, _] => Self::Nchw,
            _ => Self::Nhwc,
        }
    }

    /// Spatial size (width, height) declared by the input, if static
    #[must_use]
    pub fn spatial_size(self, dimensions: &[Option<u32>]) -> Option<(u32, u32)> {
        if dimensions.len() != 4 {
            return None;
        }
        let (h, w) = match self {
            Self::Nchw => (dimensions[2], dimensions[3]),
            Self::Nhwc => (dimensions[1], dimensions[2]),
        };
        Some((w?, h?))
    }
}

/// Convert an OpenCV Mat to an ndarray Array3<f32>
///
/// # Arguments
/// * `mat` - OpenCV Mat with shape (height, width, channels) and `CV_32F` depth
///
/// # Errors
/// * Returns error if Mat dimensions are invalid
/// * Returns error if Mat data cannot be accessed
#[allow(clippy::cast_sign_loss)] // dimensions are validated positive
pub fn mat_to_array3_f32(mat: &Mat) -> Result<Array3<f32>> {
    let rows = mat.rows();
    let cols = mat.cols();
    let channels = mat.channels();

    if rows <= 0 || cols <= 0 || !(channels == 1 || channels == 3) {
        return Err(crate::error::Error::InvalidInput(format!(
            "Invalid Mat dimensions: {rows}x{cols}x{channels}"
        )));
    }

    let mut data = vec![0.0f32; (rows * cols * channels) as usize];

    for row in 0..rows {
        for col in 0..cols {
            let base_idx = ((row * cols + col) * channels) as usize;
            if channels == 3 {
                let pixel = mat.at_2d::<opencv::core::Vec3f>(row, col)?;
                data[base_idx] = pixel[0];
                data[base_idx + 1] = pixel[1];
                data[base_idx + 2] = pixel[2];
            } else {
                data[base_idx] = *mat.at_2d::<f32>(row, col)?;
            }
        }
    }

    Array3::from_shape_vec((rows as usize, cols as usize, channels as usize), data)
        .map_err(|e| crate::error::Error::InvalidInput(format!("Failed to create array from Mat: {e}")))
}

/// Turn an 8-bit BGR image into a float RGB image scaled to [0, 1]
///
/// # Errors
///
/// Returns an error if colour conversion fails
pub fn bgr_to_unit_rgb(image: &Mat) -> Result<Mat> {
    let mut rgb_image = Mat::default();
    imgproc::cvt_color(image, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

    let mut float_image = Mat::default();
    rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;
    Ok(float_image)
}

/// Build a single-image batch tensor from an 8-bit BGR image already at model resolution
///
/// # Errors
///
/// Returns an error if the image cannot be converted
pub fn mat_to_input_tensor(image: &Mat, layout: TensorLayout) -> Result<Array4<f32>> {
    let float_image = bgr_to_unit_rgb(image)?;
    let hwc = mat_to_array3_f32(&float_image)?;
    let batch = hwc.insert_axis(Axis(0));

    Ok(match layout {
        TensorLayout::Nhwc => batch,
        TensorLayout::Nchw => batch.permuted_axes([0, 3, 1, 2]).as_standard_layout().to_owned(),
    })
}
