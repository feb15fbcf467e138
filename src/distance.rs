//! Face distance from eye spacing.
//!
//! A pinhole model relates the real interpupillary distance to its size in
//! pixels: `distance = f * ipd_real / ipd_px`. Turning the head shrinks the
//! projected spacing by roughly `cos(yaw)`, so the estimate is corrected by
//! that factor, floored to keep it finite near profile views.

use crate::{
    config::DistanceConfig,
    filters::{ExponentialFilter, ScalarFilter},
    pose_sampler::EyePoints,
};

/// Focal length in pixels for a horizontal field of view
#[must_use]
pub fn focal_length_px(frame_width: i32, fov_deg: f64) -> f64 {
    (f64::from(frame_width) / 2.0) / (fov_deg.to_radians() / 2.0).tan()
}

/// Uncorrected-for-scale distance in centimeters.
///
/// `min_yaw_cosine` floors the yaw correction; at extreme yaw the distance
/// is underestimated.
#[must_use]
pub fn raw_distance_cm(focal_px: f64, ipd_real_cm: f64, ipd_px: f64, yaw_deg: f64, min_yaw_cosine: f64) -> f64 {
    let cos_y = yaw_deg.to_radians().cos().max(min_yaw_cosine);
    focal_px * ipd_real_cm * cos_y / ipd_px
}

/// Smoothed distance estimate with a lazily computed focal length
#[derive(Debug, Clone)]
pub struct DistanceEstimator {
    ipd_real_cm: f64,
    fov_deg: f64,
    dist_scale: f64,
    min_eye_separation_px: f64,
    min_yaw_cosine: f64,
    focal_px: Option<f64>,
    filter: ExponentialFilter,
}

impl DistanceEstimator {
    /// # Panics
    ///
    /// Panics if `config.ema_alpha` is not in (0, 1]
    #[must_use]
    pub fn new(config: &DistanceConfig) -> Self {
        Self {
            ipd_real_cm: config.ipd_real_cm,
            fov_deg: config.fov_deg,
            dist_scale: config.dist_scale,
            min_eye_separation_px: config.min_eye_separation_px,
            min_yaw_cosine: config.min_yaw_cosine,
            focal_px: None,
            filter: ExponentialFilter::new(config.ema_alpha),
        }
    }

    /// Focal length, fixed by the first frame width seen
    pub fn focal_length(&mut self, frame_width: i32) -> f64 {
        let fov_deg = self.fov_deg;
        *self.focal_px.get_or_insert_with(|| focal_length_px(frame_width, fov_deg))
    }

    /// Fold a fresh eye measurement into the estimate.
    ///
    /// Returns the new smoothed distance, or `None` when the eyes are too
    /// close together to measure; the previous estimate is kept then.
    pub fn update(&mut self, eyes: &EyePoints, yaw_deg: f64, frame_width: i32) -> Option<f64> {
        let ipd_px = eyes.separation();
        if ipd_px.is_nan() || ipd_px <= self.min_eye_separation_px {
            log::trace!("Eye separation {:.4}px too small, distance skipped", ipd_px);
            return None;
        }

        let focal = self.focal_length(frame_width);
        let raw = raw_distance_cm(focal, self.ipd_real_cm, ipd_px, yaw_deg, self.min_yaw_cosine);
        Some(self.filter.apply(self.dist_scale * raw))
    }

    /// Latest smoothed distance; `None` before the first measurement
    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        self.filter.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Point2d;

    fn eyes(separation: f64) -> EyePoints {
        EyePoints {
            right: Point2d::new(300.0, 200.0),
            left: Point2d::new(300.0 + separation, 200.0),
        }
    }

    #[test]
    fn test_focal_length() {
        // tan(30 deg) = 1/sqrt(3)
        let f = focal_length_px(1280, 60.0);
        assert!((f - 640.0 * 3.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_raw_distance_frontal() {
        let d = raw_distance_cm(1000.0, 6.3, 63.0, 0.0, 0.5);
        assert!((d - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_yaw_cosine_floor() {
        let at_60 = raw_distance_cm(1000.0, 6.3, 63.0, 60.0, 0.5);
        let at_85 = raw_distance_cm(1000.0, 6.3, 63.0, 85.0, 0.5);
        assert!((at_60 - 50.0).abs() < 1e-9);
        assert!((at_85 - 50.0).abs() < 1e-9);
        assert_eq!(
            raw_distance_cm(1000.0, 6.3, 63.0, -85.0, 0.5),
            raw_distance_cm(1000.0, 6.3, 63.0, 85.0, 0.5)
        );
    }

    #[test]
    fn test_estimator_smooths_and_holds() {
        let mut estimator = DistanceEstimator::new(&DistanceConfig::default());
        assert!(estimator.distance().is_none());

        let first = estimator.update(&eyes(60.0), 0.0, 1280).unwrap();
        let focal = focal_length_px(1280, 60.0);
        assert!((first - focal * 6.3 / 60.0).abs() < 1e-9);

        let second = estimator.update(&eyes(120.0), 0.0, 1280).unwrap();
        let expected = 0.8 * first + 0.2 * (focal * 6.3 / 120.0);
        assert!((second - expected).abs() < 1e-9);

        assert!(estimator.update(&eyes(0.0), 0.0, 1280).is_none());
        assert_eq!(estimator.distance(), Some(second));
    }

    #[test]
    fn test_focal_length_fixed_after_first_frame() {
        let mut estimator = DistanceEstimator::new(&DistanceConfig::default());
        let f = estimator.focal_length(640);
        assert_eq!(estimator.focal_length(1920), f);
    }

    #[test]
    fn test_scale_applied() {
        let config = DistanceConfig { dist_scale: 2.0, ..DistanceConfig::default() };
        let mut scaled = DistanceEstimator::new(&config);
        let mut plain = DistanceEstimator::new(&DistanceConfig::default());
        let a = scaled.update(&eyes(50.0), 10.0, 640).unwrap();
        let b = plain.update(&eyes(50.0), 10.0, 640).unwrap();
        assert!((a - 2.0 * b).abs() < 1e-9);
    }
}
