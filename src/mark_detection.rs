use crate::{
    constants::{LANDMARK_INPUT_SIZE, NUM_LANDMARKS},
    face_detection::BoundingBox,
    inference::OnnxModel,
    utils::image_conversion::bgr_blob,
    Error, Result,
};
use opencv::core::{Mat, Point2d, Point2f};
use std::path::Path;

/// Facial landmark regression back-end
pub trait LandmarkModel {
    /// Detect landmarks in a cropped face image.
    ///
    /// Points are normalized to the crop: (0, 0) is its top-left corner and
    /// (1, 1) its bottom-right corner. Index 0 is the right eye, index 1 the
    /// left eye.
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails
    fn detect(&mut self, face: &Mat) -> Result<Vec<Point2f>>;
}

/// Five-point landmark detector (`landmarks-regression-retail-0009` exported to ONNX)
pub struct OnnxLandmarkDetector {
    model: OnnxModel,
    input_size: i32,
}

impl OnnxLandmarkDetector {
    /// Create a new landmark detector from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is missing or cannot be loaded
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Ok(Self {
            model: OnnxModel::load("landmarks", model_path)?,
            input_size: LANDMARK_INPUT_SIZE,
        })
    }
}

impl LandmarkModel for OnnxLandmarkDetector {
    fn detect(&mut self, face: &Mat) -> Result<Vec<Point2f>> {
        let blob = bgr_blob(face, self.input_size, self.input_size)?;
        let outputs = self.model.run(blob)?;
        reshape_points(outputs.first()?)
    }
}

/// Reshape a flat `[x0, y0, x1, y1, ...]` output into points
///
/// # Errors
///
/// Returns an error if the output length is odd or shorter than the
/// landmark count
pub fn reshape_points(raw: &[f32]) -> Result<Vec<Point2f>> {
    if raw.len() % 2 != 0 || raw.len() < NUM_LANDMARKS * 2 {
        return Err(Error::ModelOutputError(format!(
            "Expected {} landmark values, got {}",
            NUM_LANDMARKS * 2,
            raw.len()
        )));
    }
    Ok(raw.chunks_exact(2).map(|xy| Point2f::new(xy[0], xy[1])).collect())
}

/// Map crop-normalized points to frame pixels using the face box
#[must_use]
pub fn to_frame_pixels(points: &[Point2f], bbox: &BoundingBox) -> Vec<Point2d> {
    let (w, h) = (f64::from(bbox.width()), f64::from(bbox.height()));
    let (ox, oy) = (f64::from(bbox.x0), f64::from(bbox.y0));
    points
        .iter()
        .map(|p| Point2d::new(f64::from(p.x).mul_add(w, ox), f64::from(p.y).mul_add(h, oy)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reshape_points() {
        let raw = [0.3, 0.4, 0.7, 0.4, 0.5, 0.6, 0.35, 0.8, 0.65, 0.8];
        let points = reshape_points(&raw).unwrap();
        assert_eq!(points.len(), NUM_LANDMARKS);
        assert_eq!(points[1], Point2f::new(0.7, 0.4));
    }

    #[test]
    fn test_reshape_rejects_short_output() {
        assert!(reshape_points(&[0.1, 0.2, 0.3, 0.4]).is_err());
        assert!(reshape_points(&[0.1; 11]).is_err());
    }

    #[test]
    fn test_pixels_use_box_size_not_model_size() {
        let bbox = BoundingBox { x0: 100, y0: 50, x1: 300, y1: 250 };
        let points = [Point2f::new(0.25, 0.5), Point2f::new(1.0, 0.0)];
        let pixels = to_frame_pixels(&points, &bbox);
        assert!((pixels[0].x - 150.0).abs() < 1e-9);
        assert!((pixels[0].y - 150.0).abs() < 1e-9);
        assert!((pixels[1].x - 300.0).abs() < 1e-9);
        assert!((pixels[1].y - 50.0).abs() < 1e-9);
    }
}
