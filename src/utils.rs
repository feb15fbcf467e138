//! Utility functions for box geometry and coordinate transformations.

pub mod image_conversion;
pub mod safe_cast;

use crate::face_detection::BoundingBox;
use opencv::core::Point2d;
use safe_cast::f64_to_i32_clamp;

/// Expand a box by `fraction` of its larger side on every side, then clamp
/// it to the `[0, frame_width] x [0, frame_height]` frame.
///
/// Returns `None` when the clamped box is degenerate (no usable face).
#[must_use]
pub fn pad_and_clamp(bbox: BoundingBox, fraction: f64, frame_width: i32, frame_height: i32) -> Option<BoundingBox> {
    let larger_side = bbox.width().max(bbox.height());
    let pad = f64_to_i32_clamp(fraction * f64::from(larger_side), 0, i32::MAX / 4);

    let padded = BoundingBox {
        x0: bbox.x0.saturating_sub(pad).max(0),
        y0: bbox.y0.saturating_sub(pad).max(0),
        x1: bbox.x1.saturating_add(pad).min(frame_width),
        y1: bbox.y1.saturating_add(pad).min(frame_height),
    };

    padded.is_valid().then_some(padded)
}

/// Euclidean distance between two pixel points
#[must_use]
pub fn euclidean_distance(a: Point2d, b: Point2d) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_uses_larger_side() {
        // 100 x 50 box, pad = int(0.12 * 100) = 12
        let bbox = BoundingBox { x0: 200, y0: 200, x1: 300, y1: 250 };
        let padded = pad_and_clamp(bbox, 0.12, 640, 480).unwrap();
        assert_eq!(padded, BoundingBox { x0: 188, y0: 188, x1: 312, y1: 262 });
    }

    #[test]
    fn test_pad_truncates_fractional_padding() {
        // int(0.12 * 30) = 3
        let bbox = BoundingBox { x0: 10, y0: 10, x1: 40, y1: 40 };
        let padded = pad_and_clamp(bbox, 0.12, 640, 480).unwrap();
        assert_eq!(padded, BoundingBox { x0: 7, y0: 7, x1: 43, y1: 43 });
    }

    #[test]
    fn test_pad_clamps_to_frame() {
        let bbox = BoundingBox { x0: 5, y0: 2, x1: 630, y1: 478 };
        let padded = pad_and_clamp(bbox, 0.12, 640, 480).unwrap();
        assert_eq!(padded, BoundingBox { x0: 0, y0: 0, x1: 640, y1: 480 });
    }

    #[test]
    fn test_degenerate_box_is_unusable() {
        // Entirely right of the frame
        let bbox = BoundingBox { x0: 700, y0: 10, x1: 720, y1: 30 };
        assert!(pad_and_clamp(bbox, 0.12, 640, 480).is_none());

        // Zero-area detection
        let bbox = BoundingBox { x0: 50, y0: 50, x1: 50, y1: 50 };
        assert!(pad_and_clamp(bbox, 0.0, 640, 480).is_none());
    }

    #[test]
    fn test_euclidean_distance() {
        let d = euclidean_distance(Point2d::new(0.0, 0.0), Point2d::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }
}
