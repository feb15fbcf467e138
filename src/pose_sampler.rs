//! Head pose and eye landmark sampling on a frame cadence.
//!
//! On sampling ticks the face box is cropped out of the frame and handed to
//! the head-pose and landmark back-ends. Angles go through their own
//! smoothing state; the first two landmarks become the eye points. Between
//! sampling ticks every value is held as last-known-good.

use crate::{
    constants::{LEFT_EYE_INDEX, RIGHT_EYE_INDEX},
    face_detection::BoundingBox,
    filters::{ScalarFilter, SmoothedScalar},
    mark_detection::{to_frame_pixels, LandmarkModel},
    pose_estimation::{HeadPose, HeadPoseModel},
    utils::euclidean_distance,
    Error, Result,
};
use opencv::core::{Mat, Point2d};
use opencv::prelude::*;

/// Eye centers in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePoints {
    pub right: Point2d,
    pub left: Point2d,
}

impl EyePoints {
    /// Pixel distance between the eyes
    #[must_use]
    pub fn separation(&self) -> f64 {
        euclidean_distance(self.left, self.right)
    }
}

/// Per-tick result of the sampler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// Models ran this tick
    Fresh { raw_pose: HeadPose, eyes: EyePoints },
    /// Not a sampling tick, or no usable face
    Skipped,
}

/// Cadenced head-pose and landmark sampler with per-angle smoothing
#[derive(Debug, Clone)]
pub struct PoseSampler {
    sample_every: u64,
    yaw: SmoothedScalar,
    pitch: SmoothedScalar,
    roll: SmoothedScalar,
    eyes: Option<EyePoints>,
}

impl PoseSampler {
    /// # Panics
    ///
    /// Panics if `sample_every` is zero, `alpha` is outside (0, 1] or
    /// `dead_zone_deg` is negative
    #[must_use]
    pub fn new(sample_every: u64, alpha: f64, dead_zone_deg: f64) -> Self {
        assert!(sample_every > 0, "Sampling interval must be greater than 0");
        Self {
            sample_every,
            yaw: SmoothedScalar::new(alpha, dead_zone_deg),
            pitch: SmoothedScalar::new(alpha, dead_zone_deg),
            roll: SmoothedScalar::new(alpha, dead_zone_deg),
            eyes: None,
        }
    }

    #[must_use]
    pub const fn should_sample(&self, tick: u64) -> bool {
        tick % self.sample_every == 0
    }

    /// Run the pose and landmark models if this is a sampling tick and a face box exists.
    ///
    /// # Errors
    ///
    /// Returns an error if cropping fails, a back-end fails, or the landmark
    /// model returns fewer than two points.
    pub fn sample<P, L>(
        &mut self,
        tick: u64,
        frame: &Mat,
        bbox: Option<BoundingBox>,
        pose_model: &mut P,
        landmark_model: &mut L,
    ) -> Result<Sample>
    where
        P: HeadPoseModel + ?Sized,
        L: LandmarkModel + ?Sized,
    {
        let Some(bbox) = bbox else {
            return Ok(Sample::Skipped);
        };
        if !self.should_sample(tick) {
            return Ok(Sample::Skipped);
        }

        let face = Mat::roi(frame, bbox.to_rect())?.try_clone()?;
        if face.empty() {
            return Ok(Sample::Skipped);
        }

        let raw_pose = pose_model.estimate(&face)?;
        self.yaw.apply(raw_pose.yaw);
        self.pitch.apply(raw_pose.pitch);
        self.roll.apply(raw_pose.roll);

        let normalized = landmark_model.detect(&face)?;
        if normalized.len() <= LEFT_EYE_INDEX.max(RIGHT_EYE_INDEX) {
            return Err(Error::ModelOutputError(format!(
                "Landmark model returned {} points, eyes need at least 2",
                normalized.len()
            )));
        }
        let pixels = to_frame_pixels(&normalized, &bbox);
        let eyes = EyePoints {
            right: pixels[RIGHT_EYE_INDEX],
            left: pixels[LEFT_EYE_INDEX],
        };
        self.eyes = Some(eyes);

        Ok(Sample::Fresh { raw_pose, eyes })
    }

    /// Smoothed, dead-zoned head pose; `None` before the first sample
    #[must_use]
    pub fn pose(&self) -> Option<HeadPose> {
        Some(HeadPose {
            yaw: self.yaw.output()?,
            pitch: self.pitch.output()?,
            roll: self.roll.output()?,
        })
    }

    /// Yaw used for distance correction: the dead-zoned output, else the
    /// smoothed value, else 0
    #[must_use]
    pub fn yaw_for_distance(&self) -> f64 {
        self.yaw.output().or_else(|| self.yaw.smoothed()).unwrap_or(0.0)
    }

    /// Last known eye points
    #[must_use]
    pub const fn eyes(&self) -> Option<EyePoints> {
        self.eyes
    }
}
