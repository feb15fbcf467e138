//! Configuration management for the face-follow arm

use crate::constants::{
    DEFAULT_ACCELERATION, DEFAULT_BBOX_PADDING, DEFAULT_CAMERA_FPS, DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH,
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_DEAD_ZONE_DEG, DEFAULT_DETECT_EVERY, DEFAULT_DIST_SCALE, DEFAULT_ELBOW_MAX,
    DEFAULT_ELBOW_MIN, DEFAULT_EMA_ALPHA, DEFAULT_FOV_DEG, DEFAULT_GAIN, DEFAULT_IPD_REAL_CM, DEFAULT_MAX_DELTA,
    DEFAULT_MIN_YAW_COSINE, DEFAULT_NEUTRAL_ANGLE, DEFAULT_SAMPLE_EVERY, DEFAULT_SPEED, DEFAULT_TARGET_DISTANCE_CM,
    DEFAULT_TOLERANCE_CM, JOINT_ANGLE_COMMAND, MAX_STATUS_INTERVAL_SECS, MIN_EYE_SEPARATION_PX,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model configuration
    pub models: ModelConfig,

    /// Camera configuration
    pub camera: CameraConfig,

    /// Face detection configuration
    pub face_detection: FaceDetectionConfig,

    /// Head pose and landmark sampling configuration
    pub pose: PoseConfig,

    /// Distance estimation configuration
    pub distance: DistanceConfig,

    /// Elbow controller configuration
    pub controller: ControllerConfig,

    /// Outgoing command configuration
    pub command: CommandConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to face detection ONNX model
    pub face_detector: PathBuf,

    /// Path to head pose ONNX model
    pub head_pose: PathBuf,

    /// Path to facial landmarks ONNX model
    pub landmarks: PathBuf,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera index
    pub index: i32,

    /// Video file to read instead of the camera
    pub video_file: Option<PathBuf>,

    /// Requested frame width
    pub width: i32,

    /// Requested frame height
    pub height: i32,

    /// Requested frame rate (best effort)
    pub fps: f64,

    /// Request MJPG encoding from the camera
    pub use_mjpg: bool,

    /// Mirror frames horizontally
    pub flip_horizontal: bool,
}

/// Face detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceDetectionConfig {
    /// Confidence threshold for face detection (0.0-1.0)
    pub confidence_threshold: f32,

    /// Run detection every N frames
    pub detect_every: u64,

    /// Padding added on each side, as a fraction of the larger box side
    pub bbox_padding: f64,
}

/// Head pose and landmark parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Run head pose and landmarks every N frames
    pub sample_every: u64,

    /// EMA coefficient for yaw, pitch and roll
    pub ema_alpha: f64,

    /// Dead-zone for the angle outputs (degrees)
    pub dead_zone_deg: f64,
}

/// Distance estimation parameters.
///
/// `fov_deg`, `dist_scale` and `min_yaw_cosine` are uncalibrated
/// approximations; tune them per camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Real-world interpupillary distance (cm)
    pub ipd_real_cm: f64,

    /// Assumed horizontal field of view (degrees)
    pub fov_deg: f64,

    /// Scale applied to the raw estimate
    pub dist_scale: f64,

    /// EMA coefficient for the distance
    pub ema_alpha: f64,

    /// Eye separation (px) below which a measurement is discarded
    pub min_eye_separation_px: f64,

    /// Floor for the yaw cosine correction
    pub min_yaw_cosine: f64,
}

/// Elbow controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Distance to hold (cm)
    pub target_distance_cm: f64,

    /// No correction while the error is below this (cm)
    pub tolerance_cm: f64,

    /// Lower elbow limit (degrees)
    pub elbow_min: f64,

    /// Upper elbow limit (degrees)
    pub elbow_max: f64,

    /// Degrees per unit of relative distance error; negative retracts when too far
    pub gain: f64,

    /// Largest elbow change per tick (degrees)
    pub max_delta: f64,

    /// Starting and reference elbow angle (degrees)
    pub neutral_angle: f64,
}

/// Outgoing command parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Command type tag understood by the arm firmware
    pub command_type: u16,

    /// Joint speed
    pub speed: u16,

    /// Joint acceleration
    pub acceleration: u16,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the camera window
    pub show_window: bool,

    /// Draw box, eyes and readouts on the shown frame
    pub draw_debug: bool,

    /// Seconds between status log lines when no window is shown
    pub status_interval_secs: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_detector: PathBuf::from("models/face-detection-retail-0004.onnx"),
            head_pose: PathBuf::from("models/head-pose-estimation-adas-0001.onnx"),
            landmarks: PathBuf::from("models/landmarks-regression-retail-0009.onnx"),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            video_file: None,
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
            fps: DEFAULT_CAMERA_FPS,
            use_mjpg: true,
            flip_horizontal: true,
        }
    }
}

impl Default for FaceDetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            detect_every: DEFAULT_DETECT_EVERY,
            bbox_padding: DEFAULT_BBOX_PADDING,
        }
    }
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            sample_every: DEFAULT_SAMPLE_EVERY,
            ema_alpha: DEFAULT_EMA_ALPHA,
            dead_zone_deg: DEFAULT_DEAD_ZONE_DEG,
        }
    }
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            ipd_real_cm: DEFAULT_IPD_REAL_CM,
            fov_deg: DEFAULT_FOV_DEG,
            dist_scale: DEFAULT_DIST_SCALE,
            ema_alpha: DEFAULT_EMA_ALPHA,
            min_eye_separation_px: MIN_EYE_SEPARATION_PX,
            min_yaw_cosine: DEFAULT_MIN_YAW_COSINE,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            target_distance_cm: DEFAULT_TARGET_DISTANCE_CM,
            tolerance_cm: DEFAULT_TOLERANCE_CM,
            elbow_min: DEFAULT_ELBOW_MIN,
            elbow_max: DEFAULT_ELBOW_MAX,
            gain: DEFAULT_GAIN,
            max_delta: DEFAULT_MAX_DELTA,
            neutral_angle: DEFAULT_NEUTRAL_ANGLE,
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            command_type: JOINT_ANGLE_COMMAND,
            speed: DEFAULT_SPEED,
            acceleration: DEFAULT_ACCELERATION,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_window: true,
            draw_debug: true,
            status_interval_secs: 1.0,
        }
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{name} must be in (0, 1], got {value}")))
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{name} must be positive, got {value}")))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{name} must be non-negative, got {value}")))
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text; missing keys take defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate parameter ranges
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first invalid parameter
    pub fn validate(&self) -> Result<()> {
        if self.camera.width <= 0 || self.camera.height <= 0 {
            return Err(Error::ConfigError(format!(
                "Camera resolution must be positive, got {}x{}",
                self.camera.width, self.camera.height
            )));
        }

        let fd = &self.face_detection;
        if !(0.0..=1.0).contains(&fd.confidence_threshold) {
            return Err(Error::ConfigError(
                "Confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if fd.detect_every == 0 {
            return Err(Error::ConfigError("detect_every must be greater than 0".to_string()));
        }
        check_non_negative("bbox_padding", fd.bbox_padding)?;

        let pose = &self.pose;
        if pose.sample_every == 0 {
            return Err(Error::ConfigError("sample_every must be greater than 0".to_string()));
        }
        check_unit_interval("pose.ema_alpha", pose.ema_alpha)?;
        check_non_negative("dead_zone_deg", pose.dead_zone_deg)?;

        let dist = &self.distance;
        check_positive("ipd_real_cm", dist.ipd_real_cm)?;
        if !(dist.fov_deg > 0.0 && dist.fov_deg < 180.0) {
            return Err(Error::ConfigError(format!(
                "fov_deg must be in (0, 180), got {}",
                dist.fov_deg
            )));
        }
        check_positive("dist_scale", dist.dist_scale)?;
        check_unit_interval("distance.ema_alpha", dist.ema_alpha)?;
        check_non_negative("min_eye_separation_px", dist.min_eye_separation_px)?;
        check_unit_interval("min_yaw_cosine", dist.min_yaw_cosine)?;

        let ctl = &self.controller;
        check_positive("target_distance_cm", ctl.target_distance_cm)?;
        check_non_negative("tolerance_cm", ctl.tolerance_cm)?;
        check_positive("max_delta", ctl.max_delta)?;
        if !ctl.gain.is_finite() {
            return Err(Error::ConfigError("gain must be finite".to_string()));
        }
        if ctl.elbow_min >= ctl.elbow_max {
            return Err(Error::ConfigError(format!(
                "elbow_min ({}) must be below elbow_max ({})",
                ctl.elbow_min, ctl.elbow_max
            )));
        }
        if !(ctl.elbow_min..=ctl.elbow_max).contains(&ctl.neutral_angle) {
            return Err(Error::ConfigError(format!(
                "neutral_angle {} is outside the elbow range",
                ctl.neutral_angle
            )));
        }

        check_positive("status_interval_secs", self.display.status_interval_secs)?;
        if self.display.status_interval_secs > MAX_STATUS_INTERVAL_SECS {
            return Err(Error::ConfigError(format!(
                "status_interval_secs must be at most {MAX_STATUS_INTERVAL_SECS}, got {}",
                self.display.status_interval_secs
            )));
        }

        Ok(())
    }

    /// Check that every model file exists
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFound` for the first missing file
    pub fn check_models(&self) -> Result<()> {
        for path in [&self.models.face_detector, &self.models.head_pose, &self.models.landmarks] {
            if !path.exists() {
                return Err(Error::ModelNotFound(path.clone()));
            }
        }
        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face-follow arm configuration

# Model paths (ONNX exports of the Open Model Zoo models)
models:
  face_detector: "models/face-detection-retail-0004.onnx"
  head_pose: "models/head-pose-estimation-adas-0001.onnx"
  landmarks: "models/landmarks-regression-retail-0009.onnx"

# Camera
camera:
  index: 0
  width: 1280
  height: 720
  fps: 30.0
  use_mjpg: true
  flip_horizontal: true

# Face detection
face_detection:
  confidence_threshold: 0.3
  detect_every: 5
  bbox_padding: 0.12

# Head pose and landmarks
pose:
  sample_every: 2
  ema_alpha: 0.2
  dead_zone_deg: 0.5

# Distance estimation (fov_deg, dist_scale and min_yaw_cosine need calibration)
distance:
  ipd_real_cm: 6.3
  fov_deg: 60.0
  dist_scale: 1.0
  ema_alpha: 0.2
  min_eye_separation_px: 0.001
  min_yaw_cosine: 0.5

# Elbow controller
controller:
  target_distance_cm: 30.0
  tolerance_cm: 3.0
  elbow_min: -45.0
  elbow_max: 180.0
  gain: -50.0
  max_delta: 3.0
  neutral_angle: 90.0

# Outgoing joint command
command:
  command_type: 122
  speed: 10
  acceleration: 10

# Display
display:
  show_window: true
  draw_debug: true
  status_interval_secs: 1.0
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let parsed = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.controller, defaults.controller);
        assert_eq!(parsed.face_detection.detect_every, defaults.face_detection.detect_every);
        assert_eq!(parsed.pose.sample_every, defaults.pose.sample_every);
        assert_eq!(parsed.command.command_type, 122);
        assert_eq!(parsed.models.head_pose, defaults.models.head_pose);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml("controller:\n  target_distance_cm: 45.0\n").unwrap();
        assert_eq!(config.controller.target_distance_cm, 45.0);
        assert_eq!(config.controller.max_delta, 3.0);
        assert_eq!(config.face_detection.detect_every, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.face_detection.detect_every = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.controller.elbow_min = 200.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pose.ema_alpha = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.distance.fov_deg = 180.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.controller.neutral_angle = -90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_status_interval_bounded() {
        let mut config = Config::default();
        config.display.status_interval_secs = 3600.0;
        assert!(config.validate().is_ok());

        config.display.status_interval_secs = 1e300;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_missing_models_reported() {
        let mut config = Config::default();
        config.models.face_detector = PathBuf::from("no/such/detector.onnx");
        match config.check_models() {
            Err(Error::ModelNotFound(path)) => assert_eq!(path, PathBuf::from("no/such/detector.onnx")),
            other => panic!("expected ModelNotFound, got {other:?}"),
        }
    }
}
