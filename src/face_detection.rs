use crate::{
    constants::{DETECTION_ROW_LEN, FACE_DETECTOR_INPUT_SIZE},
    inference::OnnxModel,
    utils::{image_conversion::bgr_blob, pad_and_clamp, safe_cast::f32_to_i32_clamp},
    Result,
};
use opencv::core::{Mat, Rect};
use opencv::prelude::*;
use std::path::Path;

/// Face box in frame pixel coordinates, `x1 > x0` and `y1 > y0` when valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Non-empty box
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.x1 > self.x0 && self.y1 > self.y0
    }

    /// `OpenCV` region of interest covering this box
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x0, self.y0, self.width(), self.height())
    }
}

/// One raw detector candidate, coordinates normalized to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub class_id: f32,
    pub confidence: f32,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Detection {
    /// Scale to pixel coordinates of a `frame_width` x `frame_height` frame, truncating
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_pixels(&self, frame_width: i32, frame_height: i32) -> BoundingBox {
        let w = frame_width as f32;
        let h = frame_height as f32;
        // Keep slightly out-of-frame boxes intact so padding sees the full size
        let (min_x, max_x) = (-frame_width, frame_width.saturating_mul(2));
        let (min_y, max_y) = (-frame_height, frame_height.saturating_mul(2));
        BoundingBox {
            x0: f32_to_i32_clamp(self.x0 * w, min_x, max_x),
            y0: f32_to_i32_clamp(self.y0 * h, min_y, max_y),
            x1: f32_to_i32_clamp(self.x1 * w, min_x, max_x),
            y1: f32_to_i32_clamp(self.y1 * h, min_y, max_y),
        }
    }
}

/// Face detection back-end
pub trait FaceDetector {
    /// Detect face candidates in a full BGR frame
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Detection>>;
}

/// SSD-style face detector (`face-detection-retail-0004` exported to ONNX)
pub struct OnnxFaceDetector {
    model: OnnxModel,
    input_size: (i32, i32),
}

impl OnnxFaceDetector {
    /// Create a new face detector from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is missing or cannot be loaded
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Ok(Self {
            model: OnnxModel::load("face_detector", model_path)?,
            input_size: FACE_DETECTOR_INPUT_SIZE,
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Detection>> {
        let (width, height) = self.input_size;
        let blob = bgr_blob(frame, width, height)?;
        let outputs = self.model.run(blob)?;
        Ok(parse_detections(outputs.first()?))
    }
}

/// Parse a flat `[1, 1, N, 7]` detection output.
///
/// Rows are `(image_id, class, confidence, x0, y0, x1, y1)`; a negative
/// image id marks the end of valid rows.
#[must_use]
pub fn parse_detections(raw: &[f32]) -> Vec<Detection> {
    raw.chunks_exact(DETECTION_ROW_LEN)
        .take_while(|row| row[0] >= 0.0)
        .map(|row| Detection {
            class_id: row[1],
            confidence: row[2],
            x0: row[3],
            y0: row[4],
            x1: row[5],
            y1: row[6],
        })
        .collect()
}

/// Pick the most confident candidate at or above `threshold`.
///
/// Ties keep the first candidate in detector order. Returns the pixel box
/// and its confidence.
#[must_use]
pub fn select_best_detection(
    detections: &[Detection],
    threshold: f32,
    frame_width: i32,
    frame_height: i32,
) -> Option<(BoundingBox, f32)> {
    let mut best: Option<&Detection> = None;
    for detection in detections {
        if detection.confidence.is_nan() || detection.confidence < threshold {
            continue;
        }
        if best.map_or(true, |b| detection.confidence > b.confidence) {
            best = Some(detection);
        }
    }
    best.map(|d| (d.to_pixels(frame_width, frame_height), d.confidence))
}

/// Result of the face locator for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceState {
    /// Detection ran this tick and produced a usable box
    Fresh(BoundingBox),
    /// Detection was skipped; the box from the last detection tick is reused
    Stale(BoundingBox),
    /// No usable face
    Missing,
}

impl FaceState {
    #[must_use]
    pub const fn bbox(&self) -> Option<BoundingBox> {
        match self {
            Self::Fresh(b) | Self::Stale(b) => Some(*b),
            Self::Missing => None,
        }
    }
}

/// Runs face detection on a cadence and holds the last padded box in between
#[derive(Debug, Clone)]
pub struct FaceLocator {
    detect_every: u64,
    confidence_threshold: f32,
    padding: f64,
    bbox: Option<BoundingBox>,
    confidence: f32,
}

impl FaceLocator {
    /// # Panics
    ///
    /// Panics if `detect_every` is zero
    #[must_use]
    pub fn new(detect_every: u64, confidence_threshold: f32, padding: f64) -> Self {
        assert!(detect_every > 0, "Detection interval must be greater than 0");
        Self {
            detect_every,
            confidence_threshold,
            padding,
            bbox: None,
            confidence: 0.0,
        }
    }

    /// Last padded and clamped box
    #[must_use]
    pub const fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    /// Confidence of the detection that produced the current box
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Whether detection runs on this tick
    #[must_use]
    pub const fn should_detect(&self, tick: u64) -> bool {
        self.bbox.is_none() || tick % self.detect_every == 0
    }

    /// Update the face box for one tick.
    ///
    /// # Errors
    ///
    /// Returns an error only if the detector back-end fails; "no face" is a
    /// normal outcome.
    pub fn locate<D: FaceDetector + ?Sized>(&mut self, tick: u64, frame: &Mat, detector: &mut D) -> Result<FaceState> {
        if !self.should_detect(tick) {
            return Ok(self.bbox.map_or(FaceState::Missing, FaceState::Stale));
        }

        let (frame_width, frame_height) = (frame.cols(), frame.rows());
        let detections = detector.detect(frame)?;
        let had_face = self.bbox.is_some();

        let chosen = select_best_detection(&detections, self.confidence_threshold, frame_width, frame_height)
            .and_then(|(raw, conf)| pad_and_clamp(raw, self.padding, frame_width, frame_height).map(|b| (b, conf)));

        match chosen {
            Some((bbox, conf)) => {
                log::debug!("Face at {:?} (conf {:.2}) on tick {}", bbox, conf, tick);
                self.bbox = Some(bbox);
                self.confidence = conf;
                Ok(FaceState::Fresh(bbox))
            }
            None => {
                if had_face {
                    log::debug!("Face lost on tick {}", tick);
                }
                self.bbox = None;
                self.confidence = 0.0;
                Ok(FaceState::Missing)
            }
        }
    }
}
