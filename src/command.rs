//! Joint commands for the arm firmware.
//!
//! Commands go out as one compact JSON object per line, e.g.
//! `{"T":122,"b":0.0,"s":0.0,"e":87.0,"h":180.0,"spd":10,"acc":10}`.

use crate::{
    constants::{FIXED_BASE_DEG, FIXED_SHOULDER_DEG, FIXED_WRIST_DEG, JOINT_ANGLE_COMMAND},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Joint angle command; only the elbow is driven, the other joints are fixed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointCommand {
    #[serde(rename = "T")]
    pub command_type: u16,
    #[serde(rename = "b")]
    pub base: f64,
    #[serde(rename = "s")]
    pub shoulder: f64,
    #[serde(rename = "e")]
    pub elbow: f64,
    #[serde(rename = "h")]
    pub wrist: f64,
    #[serde(rename = "spd")]
    pub speed: u16,
    #[serde(rename = "acc")]
    pub acceleration: u16,
}

impl JointCommand {
    /// Standard joint angle command for an elbow angle
    #[must_use]
    pub const fn joint_angles(elbow: f64, speed: u16, acceleration: u16) -> Self {
        Self::with_type(JOINT_ANGLE_COMMAND, elbow, speed, acceleration)
    }

    /// Joint angle command with an explicit command type tag
    #[must_use]
    pub const fn with_type(command_type: u16, elbow: f64, speed: u16, acceleration: u16) -> Self {
        Self {
            command_type,
            base: FIXED_BASE_DEG,
            shoulder: FIXED_SHOULDER_DEG,
            elbow,
            wrist: FIXED_WRIST_DEG,
            speed,
            acceleration,
        }
    }

    /// Serialize to a single line without the trailing newline
    ///
    /// # Errors
    ///
    /// Returns an error if a joint angle is not finite
    pub fn to_line(&self) -> Result<String> {
        if ![self.base, self.shoulder, self.elbow, self.wrist].iter().all(|a| a.is_finite()) {
            return Err(Error::CommandError(format!("Non-finite joint angle in {self:?}")));
        }
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a line produced by [`JointCommand::to_line`]
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not a joint command object
    pub fn from_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// Destination for outgoing commands
pub trait CommandSink {
    /// Deliver one command
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be written
    fn send(&mut self, command: &JointCommand) -> Result<()>;
}

/// Writes newline-delimited commands to any writer (stdout, a file, a serial device node)
pub struct LineSink<W: Write> {
    writer: W,
    sent: u64,
}

impl<W: Write> LineSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer, sent: 0 }
    }

    /// Number of commands written so far
    #[must_use]
    pub const fn sent(&self) -> u64 {
        self.sent
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CommandSink for LineSink<W> {
    fn send(&mut self, command: &JointCommand) -> Result<()> {
        let line = command.to_line()?;
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|e| Error::CommandError(format!("Failed to write command: {e}")))?;
        self.sent += 1;
        Ok(())
    }
}
