//! Face-follow arm: keeps a face at a target distance by driving the elbow joint.

use anyhow::{Context, Result};
use clap::Parser;
use face_follow_arm::{
    app::OnnxApp,
    command::{CommandSink, LineSink},
    config::{Config, EXAMPLE_CONFIG},
};
use log::info;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to process instead of the camera
    #[arg(short, long)]
    video: Option<PathBuf>,

    /// Requested frame width
    #[arg(long)]
    width: Option<i32>,

    /// Requested frame height
    #[arg(long)]
    height: Option<i32>,

    /// Run face detection every N frames
    #[arg(long)]
    detect_every: Option<u64>,

    /// Run head pose and landmarks every N frames
    #[arg(long)]
    sample_every: Option<u64>,

    /// Target face distance in centimeters
    #[arg(long)]
    target_cm: Option<f64>,

    /// Write commands to this path (serial device node or file) instead of stdout
    #[arg(long)]
    sink: Option<PathBuf>,

    /// Do not open a window
    #[arg(long)]
    headless: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(index) = self.cam {
            config.camera.index = index;
        }
        if let Some(video) = &self.video {
            config.camera.video_file = Some(video.clone());
        }
        if let Some(width) = self.width {
            config.camera.width = width;
        }
        if let Some(height) = self.height {
            config.camera.height = height;
        }
        if let Some(n) = self.detect_every {
            config.face_detection.detect_every = n;
        }
        if let Some(n) = self.sample_every {
            config.pose.sample_every = n;
        }
        if let Some(target) = self.target_cm {
            config.controller.target_distance_cm = target;
        }
        if self.headless {
            config.display.show_window = false;
        }
    }
}

fn open_sink(path: Option<&PathBuf>) -> Result<Box<dyn CommandSink>> {
    match path {
        Some(path) => {
            info!("Writing commands to {}", path.display());
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open command sink {}", path.display()))?;
            Ok(Box::new(LineSink::new(file)))
        }
        None => Ok(Box::new(LineSink::new(io::stdout()))),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Logs go to stderr; stdout may carry the command stream
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Face Follow Arm");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let sink = open_sink(args.sink.as_ref())?;
    let mut app = OnnxApp::from_config(&config, sink)?;
    let summary = app.run()?;

    info!(
        "Processed {} frames, sent {} commands",
        summary.ticks, summary.commands_sent
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied() {
        let args = Args::try_parse_from([
            "face-follow-arm",
            "--cam",
            "2",
            "--detect-every",
            "3",
            "--sample-every",
            "1",
            "--target-cm",
            "40",
            "--headless",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.camera.index, 2);
        assert_eq!(config.face_detection.detect_every, 3);
        assert_eq!(config.pose.sample_every, 1);
        assert_eq!(config.controller.target_distance_cm, 40.0);
        assert!(!config.display.show_window);
        assert!(config.camera.video_file.is_none());
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = Args::try_parse_from(["face-follow-arm"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert!(config.display.show_window);
        assert_eq!(config.controller, Config::default().controller);
    }

    #[test]
    fn test_video_flag() {
        let args = Args::try_parse_from(["face-follow-arm", "--video", "clip.mp4", "--sink", "/dev/ttyUSB0"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.camera.video_file, Some(PathBuf::from("clip.mp4")));
        assert_eq!(args.sink, Some(PathBuf::from("/dev/ttyUSB0")));
    }
}
