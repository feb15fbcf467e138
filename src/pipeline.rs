//! Per-tick perception-to-control pipeline.
//!
//! Each tick runs, in order: face location (on its cadence), pose and
//! landmark sampling (on its cadence), distance estimation (only when eye
//! points were refreshed), the elbow controller, and command encoding.
//! Stages that do not run this tick leave their state untouched, and later
//! stages read that held state.

use crate::{
    command::JointCommand,
    config::Config,
    controller::ElbowController,
    distance::DistanceEstimator,
    face_detection::{FaceDetector, FaceLocator, FaceState, OnnxFaceDetector},
    mark_detection::{LandmarkModel, OnnxLandmarkDetector},
    pose_estimation::{HeadPose, HeadPoseModel, OnnxHeadPoseEstimator},
    pose_sampler::{EyePoints, PoseSampler, Sample},
    Error, Result,
};
use opencv::core::Mat;
use opencv::prelude::*;

/// All state persisted across ticks
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub tick: u64,
    pub face: FaceLocator,
    pub sampler: PoseSampler,
    pub distance: DistanceEstimator,
    pub controller: ElbowController,
}

impl PipelineState {
    /// Fresh state from a validated configuration
    ///
    /// # Panics
    ///
    /// Panics on out-of-range parameters; call [`Config::validate`] first
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let fd = &config.face_detection;
        Self {
            tick: 0,
            face: FaceLocator::new(fd.detect_every, fd.confidence_threshold, fd.bbox_padding),
            sampler: PoseSampler::new(config.pose.sample_every, config.pose.ema_alpha, config.pose.dead_zone_deg),
            distance: DistanceEstimator::new(&config.distance),
            controller: ElbowController::new(config.controller),
        }
    }
}

/// What one tick produced, for display and logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    /// Zero-based index of this tick
    pub tick: u64,
    pub face: FaceState,
    /// Confidence of the detection behind the current box
    pub confidence: f32,
    /// Smoothed head pose (held between samples)
    pub pose: Option<HeadPose>,
    /// Eye points (held between samples)
    pub eyes: Option<EyePoints>,
    /// Pose and eyes were measured this tick
    pub sampled: bool,
    /// Smoothed distance (held between measurements)
    pub distance_cm: Option<f64>,
    /// Distance was updated this tick
    pub distance_updated: bool,
    pub elbow: f64,
    pub command: JointCommand,
}

/// Face-distance pipeline over pluggable inference back-ends
pub struct Pipeline<D, P, L> {
    state: PipelineState,
    detector: D,
    pose_model: P,
    landmark_model: L,
    command_type: u16,
    speed: u16,
    acceleration: u16,
}

/// Pipeline backed by the ONNX models
pub type OnnxPipeline = Pipeline<OnnxFaceDetector, OnnxHeadPoseEstimator, OnnxLandmarkDetector>;

impl OnnxPipeline {
    /// Load all three models named in the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a model file is
    /// missing, or a model fails to load
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        config.check_models()?;

        log::info!("Loading face detector from {}", config.models.face_detector.display());
        let detector = OnnxFaceDetector::new(&config.models.face_detector)?;
        log::info!("Loading head pose model from {}", config.models.head_pose.display());
        let pose_model = OnnxHeadPoseEstimator::new(&config.models.head_pose)?;
        log::info!("Loading landmark model from {}", config.models.landmarks.display());
        let landmark_model = OnnxLandmarkDetector::new(&config.models.landmarks)?;

        Self::new(config, detector, pose_model, landmark_model)
    }
}

impl<D, P, L> Pipeline<D, P, L>
where
    D: FaceDetector,
    P: HeadPoseModel,
    L: LandmarkModel,
{
    /// Build a pipeline around the given back-ends
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration does not validate
    pub fn new(config: &Config, detector: D, pose_model: P, landmark_model: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: PipelineState::new(config),
            detector,
            pose_model,
            landmark_model,
            command_type: config.command.command_type,
            speed: config.command.speed,
            acceleration: config.command.acceleration,
        })
    }

    /// Process one frame.
    ///
    /// A missing face or an unmeasurable eye pair is a normal outcome; the
    /// elbow holds and a command is still produced.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty frame or a failing inference back-end
    pub fn tick(&mut self, frame: &Mat) -> Result<TickOutput> {
        if frame.empty() {
            return Err(Error::InvalidInput("Empty frame".to_string()));
        }

        let tick = self.state.tick;
        let state = &mut self.state;

        let face = state.face.locate(tick, frame, &mut self.detector)?;
        let sample = state.sampler.sample(
            tick,
            frame,
            face.bbox(),
            &mut self.pose_model,
            &mut self.landmark_model,
        )?;

        let (sampled, distance_updated) = match sample {
            Sample::Fresh { eyes, .. } => {
                let yaw = state.sampler.yaw_for_distance();
                (true, state.distance.update(&eyes, yaw, frame.cols()).is_some())
            }
            Sample::Skipped => (false, false),
        };

        let distance_cm = state.distance.distance();
        let elbow = state.controller.update(distance_cm);
        let command = JointCommand::with_type(self.command_type, elbow, self.speed, self.acceleration);

        state.tick += 1;

        Ok(TickOutput {
            tick,
            face,
            confidence: state.face.confidence(),
            pose: state.sampler.pose(),
            eyes: state.sampler.eyes(),
            sampled,
            distance_cm,
            distance_updated,
            elbow,
            command,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Current elbow angle
    #[must_use]
    pub const fn elbow(&self) -> f64 {
        self.state.controller.angle()
    }

    #[must_use]
    pub const fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    #[must_use]
    pub const fn pose_model(&self) -> &P {
        &self.pose_model
    }

    #[must_use]
    pub const fn landmark_model(&self) -> &L {
        &self.landmark_model
    }
}
