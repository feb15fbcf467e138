//! Tests for ONNX model loading and inference

use face_follow_arm::{
    config::Config,
    face_detection::{FaceDetector, OnnxFaceDetector},
    mark_detection::{LandmarkModel, OnnxLandmarkDetector},
    pipeline::OnnxPipeline,
    pose_estimation::{HeadPoseModel, OnnxHeadPoseEstimator},
    Error, Result,
};
use opencv::{
    core::{Mat, CV_8UC3},
    prelude::*,
};
use std::path::PathBuf;

fn gray_image(size: i32) -> Result<Mat> {
    Ok(Mat::new_rows_cols_with_default(size, size, CV_8UC3, opencv::core::Scalar::all(128.0))?)
}

#[test]
fn test_missing_model_reported_before_loading() {
    let mut config = Config::default();
    config.models.head_pose = PathBuf::from("nowhere/head_pose.onnx");
    config.models.face_detector = PathBuf::from("nowhere/face.onnx");
    assert!(matches!(OnnxPipeline::from_config(&config), Err(Error::ModelNotFound(_))));
    assert!(matches!(OnnxFaceDetector::new("nowhere/face.onnx"), Err(Error::ModelNotFound(_))));
}

#[test]
fn test_directory_is_not_a_model() {
    let dir = env!("CARGO_MANIFEST_DIR");
    assert!(matches!(OnnxFaceDetector::new(dir), Err(Error::ModelError(_))));
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_face_detector_on_blank_frame() -> Result<()> {
    let config = Config::default();
    let mut detector = OnnxFaceDetector::new(&config.models.face_detector)?;
    let frame = gray_image(480)?;

    let detections = detector.detect(&frame)?;
    assert!(detections.iter().all(|d| (0.0..=1.0).contains(&d.confidence)));
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_head_pose_outputs_are_finite() -> Result<()> {
    let config = Config::default();
    let mut model = OnnxHeadPoseEstimator::new(&config.models.head_pose)?;

    let pose = model.estimate(&gray_image(120)?)?;
    assert!(pose.yaw.is_finite() && pose.pitch.is_finite() && pose.roll.is_finite());
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_landmarks_are_normalized() -> Result<()> {
    let config = Config::default();
    let mut model = OnnxLandmarkDetector::new(&config.models.landmarks)?;

    let points = model.detect(&gray_image(96)?)?;
    assert_eq!(points.len(), 5);
    assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    Ok(())
}

#[test]
#[ignore = "Requires ONNX models"]
fn test_pipeline_runs_on_blank_frames() -> Result<()> {
    let mut pipeline = OnnxPipeline::from_config(&Config::default())?;
    let frame = gray_image(480)?;
    for _ in 0..10 {
        let out = pipeline.tick(&frame)?;
        assert!(out.elbow >= -45.0 && out.elbow <= 180.0);
    }
    Ok(())
}
