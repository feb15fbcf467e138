use crate::{
    constants::{HEAD_POSE_INPUT_SIZE, PITCH_OUTPUT, ROLL_OUTPUT, YAW_OUTPUT},
    inference::{ModelOutputs, OnnxModel},
    utils::image_conversion::bgr_blob,
    Error, Result,
};
use opencv::core::Mat;
use std::path::Path;

/// Head orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadPose {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Head pose regression back-end
pub trait HeadPoseModel {
    /// Estimate yaw, pitch and roll from a cropped face image
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails
    fn estimate(&mut self, face: &Mat) -> Result<HeadPose>;
}

/// Head pose estimator (`head-pose-estimation-adas-0001` exported to ONNX)
pub struct OnnxHeadPoseEstimator {
    model: OnnxModel,
    input_size: i32,
}

impl OnnxHeadPoseEstimator {
    /// Create a new head pose estimator from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is missing or cannot be loaded
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Ok(Self {
            model: OnnxModel::load("head_pose", model_path)?,
            input_size: HEAD_POSE_INPUT_SIZE,
        })
    }
}

impl HeadPoseModel for OnnxHeadPoseEstimator {
    fn estimate(&mut self, face: &Mat) -> Result<HeadPose> {
        let blob = bgr_blob(face, self.input_size, self.input_size)?;
        let outputs = self.model.run(blob)?;
        read_pose(&outputs)
    }
}

/// Read the three named angle channels from model outputs
///
/// # Errors
///
/// Returns an error if a channel is missing or empty
pub fn read_pose(outputs: &ModelOutputs) -> Result<HeadPose> {
    let channel = |name: &str| -> Result<f64> {
        outputs
            .named(name)?
            .first()
            .map(|&v| f64::from(v))
            .ok_or_else(|| Error::ModelOutputError(format!("Output channel '{name}' is empty")))
    };

    Ok(HeadPose {
        yaw: channel(YAW_OUTPUT)?,
        pitch: channel(PITCH_OUTPUT)?,
        roll: channel(ROLL_OUTPUT)?,
    })
}
