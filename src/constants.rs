//! Constants used throughout the application

/// Face detector input size (width, height)
pub const FACE_DETECTOR_INPUT_SIZE: (i32, i32) = (300, 300);

/// Head pose model input side length
pub const HEAD_POSE_INPUT_SIZE: i32 = 60;

/// Landmark model input side length
pub const LANDMARK_INPUT_SIZE: i32 = 48;

/// Number of points produced by the landmark model
pub const NUM_LANDMARKS: usize = 5;

/// Landmark index of the right eye
pub const RIGHT_EYE_INDEX: usize = 0;

/// Landmark index of the left eye
pub const LEFT_EYE_INDEX: usize = 1;

/// Values per detector row: image id, class, confidence, x0, y0, x1, y1
pub const DETECTION_ROW_LEN: usize = 7;

/// Head pose output channel names
pub const YAW_OUTPUT: &str = "angle_y_fc";
pub const PITCH_OUTPUT: &str = "angle_p_fc";
pub const ROLL_OUTPUT: &str = "angle_r_fc";

/// Joint angle command type understood by the arm firmware
pub const JOINT_ANGLE_COMMAND: u16 = 122;

/// Fixed joint positions (degrees)
pub const FIXED_BASE_DEG: f64 = 0.0;
pub const FIXED_SHOULDER_DEG: f64 = 0.0;
pub const FIXED_WRIST_DEG: f64 = 180.0;

/// Default command speed and acceleration
pub const DEFAULT_SPEED: u16 = 10;
pub const DEFAULT_ACCELERATION: u16 = 10;

/// Default cadence intervals (frames)
pub const DEFAULT_DETECT_EVERY: u64 = 5;
pub const DEFAULT_SAMPLE_EVERY: u64 = 2;

/// Default detection confidence threshold
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.30;

/// Fraction of the larger box side added on every side
pub const DEFAULT_BBOX_PADDING: f64 = 0.12;

/// Default smoothing parameters
pub const DEFAULT_EMA_ALPHA: f64 = 0.20;
pub const DEFAULT_DEAD_ZONE_DEG: f64 = 0.50;

/// Average adult interpupillary distance
pub const DEFAULT_IPD_REAL_CM: f64 = 6.3;

/// Assumed horizontal field of view (uncalibrated)
pub const DEFAULT_FOV_DEG: f64 = 60.0;

/// Distance scale factor (uncalibrated)
pub const DEFAULT_DIST_SCALE: f64 = 1.0;

/// Eye separation below which a measurement is discarded
pub const MIN_EYE_SEPARATION_PX: f64 = 1e-3;

/// Floor for the yaw cosine correction
pub const DEFAULT_MIN_YAW_COSINE: f64 = 0.5;

/// Default controller tuning
pub const DEFAULT_TARGET_DISTANCE_CM: f64 = 30.0;
pub const DEFAULT_TOLERANCE_CM: f64 = 3.0;
pub const DEFAULT_ELBOW_MIN: f64 = -45.0;
pub const DEFAULT_ELBOW_MAX: f64 = 180.0;
pub const DEFAULT_GAIN: f64 = -50.0;
pub const DEFAULT_MAX_DELTA: f64 = 3.0;
pub const DEFAULT_NEUTRAL_ANGLE: f64 = 90.0;

/// Default camera settings
pub const DEFAULT_CAMERA_WIDTH: i32 = 1280;
pub const DEFAULT_CAMERA_HEIGHT: i32 = 720;
pub const DEFAULT_CAMERA_FPS: f64 = 30.0;

/// Longest allowed interval between headless status lines
pub const MAX_STATUS_INTERVAL_SECS: f64 = 3600.0;
