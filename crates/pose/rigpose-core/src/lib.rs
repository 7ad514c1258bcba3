//! Rigpose Core
//!
//! Hierarchical skeleton pose solver. A [`RestPose`] is built once from a joint catalog;
//! every incoming frame (root location, per-joint rotations, optional length and offset
//! overrides) is resolved into a fresh [`Pose`] holding absolute head, tail and rotation
//! for each bone. Frames stream through a [`FrameProcessor`] into [`PoseSink`]s such as
//! the CSV writer or the viewport adapter.

pub mod bone;
pub mod bounds;
pub mod catalog;
pub mod config;
pub mod csv;
pub mod error;
pub mod frame;
pub mod joint_order;
pub mod math;
pub mod pose;
pub mod propagate;
pub mod rest_pose;
pub mod source;
pub mod stream;
pub mod validate;
pub mod viewport;

// Re-exports for consumers (sinks, tools)
pub use bone::{Bone, BoneId};
pub use bounds::{FrameBounds, FrameRange};
pub use catalog::{humanoid, AttachMode, JointCatalog, JointDescriptor};
pub use config::{OffsetMode, SolverConfig, ValidationLimits};
pub use csv::{CsvDirectorySink, CsvSink};
pub use error::{FrameField, PoseError};
pub use frame::FrameData;
pub use joint_order::JointOrder;
pub use math::{Quat, Vec3};
pub use pose::{apply_pose, Pose};
pub use rest_pose::{RestOverrides, RestPose};
pub use source::{DescriptorList, RigSource};
pub use stream::{
    run_partitioned, FrameProcessor, PoseSink, PosedFrame, ProcessReport, RigRun, SkippedFrame,
};
pub use validate::validate_frame;
pub use viewport::{AxisConvention, ViewportAdapter, ViewportBone, ViewportSink};

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, PoseError>;
