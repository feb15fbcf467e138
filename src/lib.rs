//! Face-distance arm controller.
//!
//! Watches a face through a camera and drives the elbow joint of a robotic
//! arm so the face stays at a target distance. Built on:
//! - ONNX Runtime for the face detector, head-pose and landmark models
//! - `OpenCV` for capture, cropping and drawing
//! - Exponential smoothing with a dead-zone for the noisy vision signals
//!
//! Every frame is one tick of the pipeline:
//! 1. Face detection on a cadence, holding the padded box in between
//! 2. Head pose and eye landmarks on their own cadence
//! 3. Distance from eye spacing, corrected for yaw
//! 4. A rate-limited proportional step of the elbow angle
//! 5. A joint command, written as one JSON line
//!
//! # Examples
//!
//! ## Controller only
//!
//! ```
//! use face_follow_arm::{config::ControllerConfig, controller::ElbowController};
//!
//! let mut elbow = ElbowController::new(ControllerConfig::default());
//! // Face 50 cm away with a 30 cm target: retract by at most 3 degrees
//! assert_eq!(elbow.update(Some(50.0)), 87.0);
//! // Unknown distance: hold
//! assert_eq!(elbow.update(None), 87.0);
//! ```
//!
//! ## Full pipeline
//!
//! ```no_run
//! use face_follow_arm::{config::Config, pipeline::OnnxPipeline};
//! use opencv::{prelude::*, videoio};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut pipeline = OnnxPipeline::from_config(&config)?;
//!
//! let mut cap = videoio::VideoCapture::new(0, videoio::CAP_ANY)?;
//! let mut frame = opencv::core::Mat::default();
//! while cap.read(&mut frame)? {
//!     let output = pipeline.tick(&frame)?;
//!     println!("{}", output.command.to_line()?);
//! }
//! # Ok(())
//! # }
//! ```

/// Face detection and bounding box persistence
pub mod face_detection;

/// Five-point facial landmark detection
pub mod mark_detection;

/// Head pose (yaw, pitch, roll) regression
pub mod pose_estimation;

/// Cadenced head pose and eye point sampling
pub mod pose_sampler;

/// Signal filtering for noisy measurements
pub mod filters;

/// Distance estimation from eye spacing
pub mod distance;

/// Elbow joint controller
pub mod controller;

/// Joint commands and command sinks
pub mod command;

/// Per-frame pipeline
pub mod pipeline;

/// ONNX Runtime session wrapper
pub mod inference;

/// Camera and video file sources
pub mod capture;

/// Debug overlay drawing
pub mod overlay;

/// Utility functions for box geometry and image conversion
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
