//! Image conversion from OpenCV `Mat` to model input tensors.

use crate::{utils::safe_cast::usize_to_i32, Error, Result};
use ndarray::Array4;
use opencv::core::{Mat, Size, Vec3f, CV_32F, CV_8UC3};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;

/// Resize a BGR image and pack it as a `[1, 3, height, width]` tensor.
///
/// Pixel values stay in the 0..255 range and keep BGR channel order, which
/// is what the detection, head-pose and landmark models expect.
///
/// # Errors
///
/// Returns an error if the image is empty, is not 8-bit 3-channel, or an
/// `OpenCV` operation fails.
#[allow(clippy::cast_sign_loss)] // Target sizes are positive
pub fn bgr_blob(image: &Mat, width: i32, height: i32) -> Result<Array4<f32>> {
    if image.empty() {
        return Err(Error::InvalidInput("Cannot build a tensor from an empty image".to_string()));
    }
    if image.typ() != CV_8UC3 {
        return Err(Error::InvalidInput(format!(
            "Expected an 8-bit BGR image, got Mat type {}",
            image.typ()
        )));
    }

    let mut resized = Mat::default();
    imgproc::resize(
        image,
        &mut resized,
        Size::new(width, height),
        0.0,
        0.0,
        InterpolationFlags::INTER_LINEAR as i32,
    )?;

    let mut float_image = Mat::default();
    resized.convert_to(&mut float_image, CV_32F, 1.0, 0.0)?;

    let rows = height as usize;
    let cols = width as usize;
    let mut blob = Array4::<f32>::zeros((1, 3, rows, cols));

    for row in 0..rows {
        for col in 0..cols {
            let pixel = float_image.at_2d::<Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
            for ch in 0..3 {
                blob[[0, ch, row, col]] = pixel[ch];
            }
        }
    }

    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_32FC3};

    #[test]
    fn test_blob_shape_and_channel_order() {
        let image = Mat::new_rows_cols_with_default(20, 30, CV_8UC3, Scalar::new(10.0, 20.0, 30.0, 0.0)).unwrap();

        let blob = bgr_blob(&image, 48, 48).unwrap();
        assert_eq!(blob.shape(), &[1, 3, 48, 48]);
        assert_eq!(blob[[0, 0, 0, 0]], 10.0);
        assert_eq!(blob[[0, 1, 47, 47]], 20.0);
        assert_eq!(blob[[0, 2, 24, 10]], 30.0);
    }

    #[test]
    fn test_blob_rejects_empty_image() {
        assert!(bgr_blob(&Mat::default(), 60, 60).is_err());
    }

    #[test]
    fn test_blob_rejects_float_image() {
        let image = Mat::new_rows_cols_with_default(4, 4, CV_32FC3, Scalar::all(1.0)).unwrap();
        assert!(bgr_blob(&image, 60, 60).is_err());
    }
}
