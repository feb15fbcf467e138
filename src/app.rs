//! Main application loop: frames in, joint commands out.

use crate::{
    capture::{self, FrameSource},
    command::CommandSink,
    config::Config,
    face_detection::{FaceDetector, OnnxFaceDetector},
    mark_detection::{LandmarkModel, OnnxLandmarkDetector},
    overlay,
    pipeline::{OnnxPipeline, Pipeline, TickOutput},
    pose_estimation::{HeadPoseModel, OnnxHeadPoseEstimator},
    Result,
};
use log::{debug, info};
use opencv::highgui::{self, WINDOW_NORMAL};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const WINDOW_NAME: &str = "Face Follow Arm";
const KEY_ESC: i32 = 27;

/// Frames-per-second meter, recomputed once per second
#[derive(Debug, Clone)]
pub struct FpsMeter {
    window_start: Instant,
    frames: u32,
    fps: f64,
}

impl FpsMeter {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self { window_start: now, frames: 0, fps: 0.0 }
    }

    /// Count one frame and return the current rate
    pub fn tick(&mut self, now: Instant) -> f64 {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_secs(1) {
            self.fps = f64::from(self.frames) / elapsed.as_secs_f64();
            self.frames = 0;
            self.window_start = now;
        }
        self.fps
    }

    #[must_use]
    pub const fn fps(&self) -> f64 {
        self.fps
    }
}

/// Totals reported when the loop ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub commands_sent: u64,
    pub final_elbow: f64,
}

/// Face-follow application
pub struct App<D, P, L> {
    pipeline: Pipeline<D, P, L>,
    source: Box<dyn FrameSource>,
    sink: Box<dyn CommandSink>,
    show_window: bool,
    draw_debug: bool,
    status_interval: Duration,
    stop: Arc<AtomicBool>,
}

/// Application backed by the ONNX models
pub type OnnxApp = App<OnnxFaceDetector, OnnxHeadPoseEstimator, OnnxLandmarkDetector>;

impl OnnxApp {
    /// Load the ONNX models, then open the configured frame source.
    ///
    /// Models are checked before the camera is touched so a missing model
    /// never reaches the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a model is missing
    /// or fails to load, or the frame source cannot be opened
    pub fn from_config(config: &Config, sink: Box<dyn CommandSink>) -> Result<Self> {
        let pipeline = OnnxPipeline::from_config(config)?;
        let source = capture::open_source(&config.camera)?;
        Ok(Self::new(config, pipeline, source, sink))
    }
}

impl<D, P, L> App<D, P, L>
where
    D: FaceDetector,
    P: HeadPoseModel,
    L: LandmarkModel,
{
    /// Assemble an application from its parts
    #[must_use]
    pub fn new(
        config: &Config,
        pipeline: Pipeline<D, P, L>,
        source: Box<dyn FrameSource>,
        sink: Box<dyn CommandSink>,
    ) -> Self {
        Self {
            pipeline,
            source,
            sink,
            show_window: config.display.show_window,
            draw_debug: config.display.draw_debug,
            status_interval: Duration::try_from_secs_f64(config.display.status_interval_secs)
                .unwrap_or(Duration::from_secs(1)),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends the loop before the next tick once set
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline<D, P, L> {
        &self.pipeline
    }

    /// Run until the source ends, the stop flag is set, or ESC/q is pressed
    ///
    /// # Errors
    ///
    /// Returns an error if inference, the command sink or the display fails
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting main loop");

        if self.show_window {
            highgui::named_window(WINDOW_NAME, WINDOW_NORMAL)?;
        }

        let mut fps_meter = FpsMeter::new(Instant::now());
        let mut last_status = Instant::now();
        let mut commands_sent = 0;

        loop {
            if self.stop.load(Ordering::Relaxed) {
                info!("Stop requested");
                break;
            }

            let Some(mut frame) = self.source.next_frame()? else {
                info!("Frame source ended");
                break;
            };

            let output = self.pipeline.tick(&frame)?;
            self.sink.send(&output.command)?;
            commands_sent += 1;

            let fps = fps_meter.tick(Instant::now());

            if self.show_window {
                if self.draw_debug {
                    overlay::draw(&mut frame, &output, fps)?;
                }
                highgui::imshow(WINDOW_NAME, &frame)?;

                let key = highgui::wait_key(1)?;
                if key == KEY_ESC || key == i32::from(b'q') {
                    info!("Exit requested by user");
                    break;
                }
            } else if last_status.elapsed() >= self.status_interval {
                log_status(&output, fps);
                last_status = Instant::now();
            } else {
                debug!("tick {} elbow {:.2}", output.tick, output.elbow);
            }
        }

        if self.show_window {
            highgui::destroy_all_windows()?;
        }

        let summary = RunSummary {
            ticks: self.pipeline.state().tick,
            commands_sent,
            final_elbow: self.pipeline.elbow(),
        };
        info!(
            "Shutting down after {} ticks, elbow at {:.2}",
            summary.ticks, summary.final_elbow
        );
        Ok(summary)
    }
}

fn log_status(output: &TickOutput, fps: f64) {
    let distance = output
        .distance_cm
        .map_or_else(|| "--".to_string(), |d| format!("{d:.1} cm"));
    let yaw = output.pose.map_or_else(|| "--".to_string(), |p| format!("{:.1}", p.yaw));
    info!(
        "fps {:.1} | face {} | yaw {} | dist {} | elbow {:.1}",
        fps,
        if output.face.bbox().is_some() { "yes" } else { "no" },
        yaw,
        distance,
        output.elbow
    );
}
