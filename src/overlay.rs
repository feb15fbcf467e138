//! Debug drawing on the displayed frame

use crate::{pipeline::TickOutput, utils::safe_cast::{f64_to_i32_clamp, usize_to_i32}, Result};
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};

const GREEN: (f64, f64, f64) = (0.0, 255.0, 0.0);
const RED: (f64, f64, f64) = (0.0, 0.0, 255.0);
const YELLOW: (f64, f64, f64) = (0.0, 255.0, 255.0);
const WHITE: (f64, f64, f64) = (255.0, 255.0, 255.0);

fn color((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

fn put_text(frame: &mut Mat, text: &str, origin: Point, scale: f64, rgb: (f64, f64, f64)) -> Result<()> {
    imgproc::put_text(frame, text, origin, FONT_HERSHEY_SIMPLEX, scale, color(rgb), 2, LINE_8, false)?;
    Ok(())
}

/// Text lines shown in the top-left corner
#[must_use]
pub fn readout_lines(output: &TickOutput, fps: f64) -> Vec<String> {
    let mut lines = vec![format!("FPS: {fps:.1}")];
    if let Some(pose) = output.pose {
        lines.push(format!("Yaw: {:.1}  Pitch: {:.1}  Roll: {:.1}", pose.yaw, pose.pitch, pose.roll));
    }
    match output.distance_cm {
        Some(d) => lines.push(format!("Dist: {d:.1} cm")),
        None => lines.push("Dist: --".to_string()),
    }
    lines.push(format!("Elbow: {:.1}", output.elbow));
    lines
}

/// Draw the face box, eye points and readouts.
///
/// Eye points are drawn from held values on ticks where the models did not run.
///
/// # Errors
///
/// Returns an error if an `OpenCV` drawing call fails
pub fn draw(frame: &mut Mat, output: &TickOutput, fps: f64) -> Result<()> {
    if let Some(bbox) = output.face.bbox() {
        imgproc::rectangle(frame, bbox.to_rect(), color(GREEN), 2, LINE_8, 0)?;
        let label = format!("FD conf: {:.2}", output.confidence);
        put_text(frame, &label, Point::new(bbox.x0, (bbox.y0 - 8).max(12)), 0.5, GREEN)?;
    }

    if let Some(eyes) = output.eyes {
        for eye in [eyes.right, eyes.left] {
            let center = Point::new(
                f64_to_i32_clamp(eye.x.round(), i32::MIN, i32::MAX),
                f64_to_i32_clamp(eye.y.round(), i32::MIN, i32::MAX),
            );
            imgproc::circle(frame, center, 3, color(RED), -1, LINE_8, 0)?;
        }
    }

    for (i, line) in readout_lines(output, fps).iter().enumerate() {
        let y = 30 + 28 * usize_to_i32(i)?;
        let rgb = if i == 0 { WHITE } else { YELLOW };
        put_text(frame, line, Point::new(10, y), 0.7, rgb)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{command::JointCommand, face_detection::FaceState, pose_estimation::HeadPose};

    fn output() -> TickOutput {
        TickOutput {
            tick: 3,
            face: FaceState::Missing,
            confidence: 0.0,
            pose: Some(HeadPose { yaw: 12.34, pitch: -1.0, roll: 0.5 }),
            eyes: None,
            sampled: false,
            distance_cm: Some(41.27),
            distance_updated: false,
            elbow: 87.0,
            command: JointCommand::joint_angles(87.0, 10, 10),
        }
    }

    #[test]
    fn test_readout_lines() {
        let lines = readout_lines(&output(), 29.96);
        assert_eq!(lines[0], "FPS: 30.0");
        assert_eq!(lines[1], "Yaw: 12.3  Pitch: -1.0  Roll: 0.5");
        assert_eq!(lines[2], "Dist: 41.3 cm");
        assert_eq!(lines[3], "Elbow: 87.0");
    }

    #[test]
    fn test_readout_without_distance() {
        let mut out = output();
        out.pose = None;
        out.distance_cm = None;
        let lines = readout_lines(&out, 0.0);
        assert_eq!(lines, vec!["FPS: 0.0", "Dist: --", "Elbow: 87.0"]);
    }
}
