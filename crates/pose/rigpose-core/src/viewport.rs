//! Conversion of resolved poses into a 3D viewport's conventions.
//!
//! The solver works Y-up with every bone along +Y. Viewports that are Z-up need the
//! axes remapped, and some need a roll fix-up on the feet.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bounds::FrameRange;
use crate::math::Vec3;
use crate::pose::Pose;
use crate::stream::PoseSink;
use crate::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisConvention {
    /// Solver space, unchanged.
    #[default]
    YUp,
    /// `(x, y, z)` becomes `(-x, z, y)`.
    ZUp,
}

impl AxisConvention {
    pub fn map(self, v: Vec3) -> Vec3 {
        match self {
            AxisConvention::YUp => v,
            AxisConvention::ZUp => Vec3::new(-v.x, v.z, v.y),
        }
    }
}

/// A bone as a viewport wants it: endpoints plus roll about the head→tail axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportBone {
    pub name: String,
    pub parent: Option<String>,
    pub head: Vec3,
    pub tail: Vec3,
    pub roll: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportAdapter {
    pub axis: AxisConvention,
    /// Flip ankle and toe-base bones by π.
    pub fix_foot_roll: bool,
}

impl Default for ViewportAdapter {
    fn default() -> Self {
        Self {
            axis: AxisConvention::ZUp,
            fix_foot_roll: true,
        }
    }
}

impl ViewportAdapter {
    pub fn new(axis: AxisConvention) -> Self {
        Self {
            axis,
            ..Self::default()
        }
    }

    pub fn with_foot_roll_fix(mut self, enabled: bool) -> Self {
        self.fix_foot_roll = enabled;
        self
    }

    pub fn roll_for(&self, name: &str) -> f64 {
        if !self.fix_foot_roll {
            return 0.0;
        }
        let lower = name.to_ascii_lowercase();
        if lower.ends_with("ankle") || lower.ends_with("toebase") {
            PI
        } else {
            0.0
        }
    }

    /// Convert every bone of `pose`, in joint order.
    pub fn convert(&self, pose: &Pose) -> Vec<ViewportBone> {
        pose.bones()
            .iter()
            .map(|bone| ViewportBone {
                name: bone.name.clone(),
                parent: pose.parent_of(bone).map(|p| p.name.clone()),
                head: self.axis.map(bone.head_abs),
                tail: self.axis.map(bone.tail_abs),
                roll: self.roll_for(&bone.name),
            })
            .collect()
    }
}

/// One converted frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportFrame {
    pub rig_id: String,
    pub frame: i32,
    pub bones: Vec<ViewportBone>,
}

/// Collects converted frames plus the per-rig timeline range.
#[derive(Clone, Debug, Default)]
pub struct ViewportSink {
    adapter: ViewportAdapter,
    frames: Vec<ViewportFrame>,
    ranges: Vec<(String, FrameRange)>,
}

impl ViewportSink {
    pub fn new(adapter: ViewportAdapter) -> Self {
        Self {
            adapter,
            frames: Vec::new(),
            ranges: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[ViewportFrame] {
        &self.frames
    }

    pub fn ranges(&self) -> &[(String, FrameRange)] {
        &self.ranges
    }
}

impl PoseSink for ViewportSink {
    fn on_pose(&mut self, rig_id: &str, frame: i32, pose: &Pose) -> Result<()> {
        self.frames.push(ViewportFrame {
            rig_id: rig_id.to_string(),
            frame,
            bones: self.adapter.convert(pose),
        });
        Ok(())
    }

    fn on_bounds(&mut self, rig_id: &str, range: FrameRange) -> Result<()> {
        self.ranges.push((rig_id.to_string(), range));
        Ok(())
    }
}
