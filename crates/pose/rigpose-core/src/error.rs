//! Error types for the pose solver

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which flat per-frame array (or scalar group) an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameField {
    Location,
    Rotation,
    Length,
    Offset,
}

impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameField::Location => "location",
            FrameField::Rotation => "rotation",
            FrameField::Length => "length",
            FrameField::Offset => "offset",
        };
        f.write_str(s)
    }
}

/// Comprehensive error type for skeleton and pose operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PoseError {
    /// A joint names a parent that has not been emitted (yet) by the rig source
    #[error("Joint '{joint}' references unknown parent '{parent}'")]
    UnknownParent { joint: String, parent: String },

    /// The same joint name was emitted twice
    #[error("Duplicate joint '{joint}'")]
    DuplicateJoint { joint: String },

    /// More than one joint without a parent
    #[error("Joint '{second}' has no parent but '{first}' is already the root")]
    MultipleRoots { first: String, second: String },

    /// The rig source yielded no joints
    #[error("Skeleton has no joints")]
    EmptySkeleton,

    /// The rig source itself failed
    #[error("Rig source error: {reason}")]
    Source { reason: String },

    /// A joint name was not found in the joint order
    #[error("Joint not found: {name}")]
    UnknownJoint { name: String },

    /// A per-frame array is too short for the joint/slot it has to address
    #[error("Frame {field} data too short: need {required} values, got {actual}")]
    FrameShape {
        field: FrameField,
        required: usize,
        actual: usize,
    },

    /// A quaternion with (near) zero norm cannot be turned into a rotation
    #[error("Degenerate rotation for joint '{joint}'")]
    DegenerateRotation { joint: String },

    /// A frame arrived after a later frame of the same rig was already forwarded
    #[error("Frame {frame} arrived after frame {previous}")]
    OutOfOrderFrame { previous: i32, frame: i32 },

    /// Advisory sanity check failed for one value of a frame
    #[error("Unreasonable {field} value {value} at index {index}")]
    UnreasonableValue {
        field: FrameField,
        index: usize,
        value: f64,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A pose sink refused a pose
    #[error("Sink error: {reason}")]
    Sink { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// IO error
    #[error("IO error: {reason}")]
    Io { reason: String },
}

impl PoseError {
    /// Frame-level errors: the offending frame is skipped and the run continues.
    /// Everything else invalidates the skeleton template or the setup.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FrameShape { .. }
                | Self::DegenerateRotation { .. }
                | Self::OutOfOrderFrame { .. }
                | Self::UnreasonableValue { .. }
                | Self::Sink { .. }
                | Self::Io { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownParent { .. }
            | Self::DuplicateJoint { .. }
            | Self::MultipleRoots { .. }
            | Self::EmptySkeleton
            | Self::Source { .. } => "topology",
            Self::UnknownJoint { .. } => "lookup",
            Self::FrameShape { .. }
            | Self::DegenerateRotation { .. }
            | Self::OutOfOrderFrame { .. } => "frame",
            Self::UnreasonableValue { .. } | Self::InvalidConfig { .. } => "validation",
            Self::Sink { .. } => "sink",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
        }
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PoseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
