//! Frame sources: a live camera or a video file.

use crate::{config::CameraConfig, Error, Result};
use log::{info, warn};
use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter, CAP_PROP_BUFFERSIZE, CAP_PROP_FOURCC, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use std::path::Path;

/// Source of BGR frames
pub trait FrameSource {
    /// Next frame, or `None` at end of stream or on a failed read
    ///
    /// # Errors
    ///
    /// Returns an error if post-processing the frame fails
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

/// Mirror a frame around its vertical axis
///
/// # Errors
///
/// Returns an error if the `OpenCV` flip fails
pub fn flip_horizontal(frame: &Mat) -> Result<Mat> {
    let mut flipped = Mat::default();
    core::flip(frame, &mut flipped, 1)?;
    Ok(flipped)
}

/// Read one frame from a capture; read errors end the stream
fn read_frame(capture: &mut VideoCapture, flip: bool) -> Result<Option<Mat>> {
    let mut frame = Mat::default();
    match capture.read(&mut frame) {
        Ok(true) if !frame.empty() => {}
        Ok(_) => return Ok(None),
        Err(e) => {
            warn!("Frame read failed: {}", e);
            return Ok(None);
        }
    }
    if flip {
        frame = flip_horizontal(&frame)?;
    }
    Ok(Some(frame))
}

/// Live camera opened with the requested format
pub struct CameraSource {
    capture: VideoCapture,
    flip: bool,
}

impl CameraSource {
    /// Open the camera at `config.index` and request MJPG, resolution and FPS
    ///
    /// # Errors
    ///
    /// Returns a `CameraError` if the camera cannot be opened
    pub fn open(config: &CameraConfig) -> Result<Self> {
        info!("Opening camera {}", config.index);
        let mut capture = VideoCapture::new(config.index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::CameraError(format!("Cannot open camera {}", config.index)));
        }

        if config.use_mjpg {
            let fourcc = VideoWriter::fourcc('M', 'J', 'P', 'G')?;
            capture.set(CAP_PROP_FOURCC, f64::from(fourcc))?;
        }
        capture.set(CAP_PROP_FRAME_WIDTH, f64::from(config.width))?;
        capture.set(CAP_PROP_FRAME_HEIGHT, f64::from(config.height))?;
        capture.set(CAP_PROP_FPS, config.fps)?;
        // Keep latency low; not every backend honors this
        capture.set(CAP_PROP_BUFFERSIZE, 1.0)?;

        info!(
            "Camera {} running at {}x{} @ {:.1} fps",
            config.index,
            capture.get(CAP_PROP_FRAME_WIDTH)?,
            capture.get(CAP_PROP_FRAME_HEIGHT)?,
            capture.get(CAP_PROP_FPS)?
        );

        Ok(Self {
            capture,
            flip: config.flip_horizontal,
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        read_frame(&mut self.capture, self.flip)
    }
}

/// Recorded video, played frame by frame
pub struct VideoFileSource {
    capture: VideoCapture,
    flip: bool,
}

impl VideoFileSource {
    /// Open a video file
    ///
    /// # Errors
    ///
    /// Returns a `CameraError` if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P, flip: bool) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening video file: {}", path.display());
        let capture = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::CameraError(format!("Cannot open video file {}", path.display())));
        }
        Ok(Self { capture, flip })
    }
}

impl FrameSource for VideoFileSource {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        read_frame(&mut self.capture, self.flip)
    }
}

/// Open the source named by the configuration: the video file if set, else the camera
///
/// # Errors
///
/// Returns a `CameraError` if the source cannot be opened
pub fn open_source(config: &CameraConfig) -> Result<Box<dyn FrameSource>> {
    match &config.video_file {
        Some(path) => Ok(Box::new(VideoFileSource::open(path, config.flip_horizontal)?)),
        None => Ok(Box::new(CameraSource::open(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vec3b, CV_8UC3};

    #[test]
    fn test_flip_mirrors_columns() {
        let mut frame = Mat::new_rows_cols_with_default(2, 3, CV_8UC3, Scalar::all(0.0)).unwrap();
        *frame.at_2d_mut::<Vec3b>(0, 0).unwrap() = Vec3b::from([255, 0, 0]);

        let flipped = flip_horizontal(&frame).unwrap();
        assert_eq!(flipped.at_2d::<Vec3b>(0, 2).unwrap()[0], 255);
        assert_eq!(flipped.at_2d::<Vec3b>(0, 0).unwrap()[0], 0);
    }

    #[test]
    fn test_missing_video_file_is_camera_error() {
        let result = VideoFileSource::open("does/not/exist.mp4", false);
        assert!(result.is_err());
    }
}
