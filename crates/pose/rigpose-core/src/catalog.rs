//! Static skeleton topologies.
//!
//! A catalog lists joint descriptors in parent-before-child order and names the two
//! special joint subsets: joints attached at their parent's head, and joints whose
//! attachment offset can be overridden per frame.

use serde::{Deserialize, Serialize};

use crate::error::PoseError;
use crate::Result;

/// Static description of one joint as delivered by a rig data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointDescriptor {
    pub name: String,
    /// Empty for the root joint.
    #[serde(default)]
    pub parent: String,
    /// Local translation applied when attaching to the parent.
    #[serde(default)]
    pub offset: [f64; 3],
    /// Rest rotation relative to the parent, `[x, y, z, w]`.
    #[serde(default = "identity_xyzw")]
    pub rotation: [f64; 4],
    pub length: f64,
}

fn identity_xyzw() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl JointDescriptor {
    pub fn new(name: impl Into<String>, parent: impl Into<String>, length: f64) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            offset: [0.0; 3],
            rotation: identity_xyzw(),
            length,
        }
    }

    pub fn with_offset(mut self, offset: [f64; 3]) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, rotation: [f64; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Where a child bone starts on its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachMode {
    /// Start at the parent's head (branching joints such as hips).
    Head,
    /// Start at the parent's tail (ordinary chain continuation).
    Tail,
}

/// Joint topology plus attachment conventions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointCatalog {
    pub name: String,
    pub joints: Vec<JointDescriptor>,
    /// Joints that attach to their parent's head instead of its tail.
    #[serde(default)]
    pub head_attached: Vec<String>,
    /// Offset-bearing joints; frame offset arrays are indexed by position in this list.
    #[serde(default)]
    pub offset_bearing: Vec<String>,
}

pub mod humanoid {
    //! Joint names of the built-in humanoid.

    pub const PELVIS: &str = "pelvis";
    pub const R_HIP: &str = "rHip";
    pub const R_KNEE: &str = "rKnee";
    pub const R_ANKLE: &str = "rAnkle";
    pub const R_TOE_BASE: &str = "rToeBase";
    pub const L_HIP: &str = "lHip";
    pub const L_KNEE: &str = "lKnee";
    pub const L_ANKLE: &str = "lAnkle";
    pub const L_TOE_BASE: &str = "lToeBase";
    pub const SPINE2: &str = "spine2";
    pub const SPINE3: &str = "spine3";
    pub const SPINE4: &str = "spine4";
    pub const R_SHOULDER: &str = "rShoulder";
    pub const R_ELBOW: &str = "rElbow";
    pub const R_WRIST: &str = "rWrist";
    pub const L_SHOULDER: &str = "lShoulder";
    pub const L_ELBOW: &str = "lElbow";
    pub const L_WRIST: &str = "lWrist";
    pub const BASE_NECK: &str = "baseNeck";
    pub const BASE_HEAD: &str = "baseHead";

    pub const JOINT_COUNT: usize = 20;

    /// Offset slots, in frame offset-array order.
    pub const OFFSET_BEARING: [&str; 4] = [R_HIP, L_HIP, R_SHOULDER, L_SHOULDER];
    pub const HEAD_ATTACHED: [&str; 2] = [R_HIP, L_HIP];
}

// Rest lengths are averaged over adult athletes and scaled by 0.9.
const PELVIS_LENGTH: f64 = 0.126220303905998;
const HIP_LENGTH: f64 = 0.370963097762336;
const KNEE_LENGTH: f64 = 0.386561431929226;
const ANKLE_LENGTH: f64 = 0.141880341123086;
const TOE_BASE_LENGTH: f64 = 0.04729344704103;
const SPINE2_LENGTH: f64 = 0.122532125318093;
const SPINE3_LENGTH: f64 = 0.126637363035725;
const SPINE4_LENGTH: f64 = 0.122532125318093;
const SHOULDER_LENGTH: f64 = 0.266648027895734;
const ELBOW_LENGTH: f64 = 0.207658895203634;
const WRIST_LENGTH: f64 = 0.132146569675043;
const BASE_NECK_LENGTH: f64 = 0.084940724767463;
const BASE_HEAD_LENGTH: f64 = 0.204343368655985;

const HIP_HALF_WIDTH: f64 = 0.096862528167303;
const SHOULDER_HALF_WIDTH: f64 = 0.169329877973758;

// PI about Z: legs hang down.
const HIP_ROTATION: [f64; 4] = [0.0, 0.0, 1.0, 0.0];
// PI * 7/18 about X.
const ANKLE_ROTATION: [f64; 4] = [0.5735764, 0.0, 0.0, 0.819152];
// PI / 9 about X.
const TOE_BASE_ROTATION: [f64; 4] = [0.1736482, 0.0, 0.0, 0.9848078];
// +/- PI / 2 about Z: arms stretch sideways.
const R_SHOULDER_ROTATION: [f64; 4] = [0.0, 0.0, 0.7071068, 0.7071068];
const L_SHOULDER_ROTATION: [f64; 4] = [0.0, 0.0, -0.7071068, 0.7071068];

impl JointCatalog {
    /// Empty catalog without special joints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joints: Vec::new(),
            head_attached: Vec::new(),
            offset_bearing: Vec::new(),
        }
    }

    pub fn with_joint(mut self, joint: JointDescriptor) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn with_head_attached<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.head_attached = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_offset_bearing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.offset_bearing = names.into_iter().map(Into::into).collect();
        self
    }

    /// The 20-joint humanoid with its default rest pose.
    pub fn humanoid() -> Self {
        use humanoid::*;

        let joints = vec![
            JointDescriptor::new(PELVIS, "", PELVIS_LENGTH),
            JointDescriptor::new(R_HIP, PELVIS, HIP_LENGTH)
                .with_rotation(HIP_ROTATION)
                .with_offset([-HIP_HALF_WIDTH, 0.0, 0.0]),
            JointDescriptor::new(R_KNEE, R_HIP, KNEE_LENGTH),
            JointDescriptor::new(R_ANKLE, R_KNEE, ANKLE_LENGTH).with_rotation(ANKLE_ROTATION),
            JointDescriptor::new(R_TOE_BASE, R_ANKLE, TOE_BASE_LENGTH)
                .with_rotation(TOE_BASE_ROTATION),
            JointDescriptor::new(L_HIP, PELVIS, HIP_LENGTH)
                .with_rotation(HIP_ROTATION)
                .with_offset([HIP_HALF_WIDTH, 0.0, 0.0]),
            JointDescriptor::new(L_KNEE, L_HIP, KNEE_LENGTH),
            JointDescriptor::new(L_ANKLE, L_KNEE, ANKLE_LENGTH).with_rotation(ANKLE_ROTATION),
            JointDescriptor::new(L_TOE_BASE, L_ANKLE, TOE_BASE_LENGTH)
                .with_rotation(TOE_BASE_ROTATION),
            JointDescriptor::new(SPINE2, PELVIS, SPINE2_LENGTH),
            JointDescriptor::new(SPINE3, SPINE2, SPINE3_LENGTH),
            JointDescriptor::new(SPINE4, SPINE3, SPINE4_LENGTH),
            JointDescriptor::new(R_SHOULDER, SPINE4, SHOULDER_LENGTH)
                .with_rotation(R_SHOULDER_ROTATION)
                .with_offset([-SHOULDER_HALF_WIDTH, 0.0, 0.0]),
            JointDescriptor::new(R_ELBOW, R_SHOULDER, ELBOW_LENGTH),
            JointDescriptor::new(R_WRIST, R_ELBOW, WRIST_LENGTH),
            JointDescriptor::new(L_SHOULDER, SPINE4, SHOULDER_LENGTH)
                .with_rotation(L_SHOULDER_ROTATION)
                .with_offset([SHOULDER_HALF_WIDTH, 0.0, 0.0]),
            JointDescriptor::new(L_ELBOW, L_SHOULDER, ELBOW_LENGTH),
            JointDescriptor::new(L_WRIST, L_ELBOW, WRIST_LENGTH),
            JointDescriptor::new(BASE_NECK, SPINE4, BASE_NECK_LENGTH),
            JointDescriptor::new(BASE_HEAD, BASE_NECK, BASE_HEAD_LENGTH),
        ];

        Self {
            name: "humanoid".to_string(),
            joints,
            head_attached: HEAD_ATTACHED.iter().map(|s| s.to_string()).collect(),
            offset_bearing: OFFSET_BEARING.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse a catalog from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(s)?;
        Ok(catalog)
    }

    #[inline]
    pub fn joints(&self) -> &[JointDescriptor] {
        &self.joints
    }

    pub fn joint(&self, name: &str) -> Option<&JointDescriptor> {
        self.joints.iter().find(|j| j.name == name)
    }

    /// Attachment mode is decided by name alone.
    pub fn attach_mode(&self, name: &str) -> AttachMode {
        if self.head_attached.iter().any(|n| n == name) {
            AttachMode::Head
        } else {
            AttachMode::Tail
        }
    }

    /// Position of `name` within the offset-bearing subset.
    pub fn offset_slot(&self, name: &str) -> Option<usize> {
        self.offset_bearing.iter().position(|n| n == name)
    }

    /// Name of the first parentless joint.
    pub fn root_name(&self) -> Result<&str> {
        self.joints
            .iter()
            .find(|j| j.is_root())
            .map(|j| j.name.as_str())
            .ok_or(PoseError::EmptySkeleton)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanoid_is_parent_before_child() {
        let catalog = JointCatalog::humanoid();
        assert_eq!(catalog.joints().len(), humanoid::JOINT_COUNT);
        for (i, joint) in catalog.joints().iter().enumerate() {
            if joint.is_root() {
                assert_eq!(i, 0);
                continue;
            }
            let parent_pos = catalog
                .joints()
                .iter()
                .position(|j| j.name == joint.parent)
                .expect("parent exists");
            assert!(parent_pos < i, "{} listed before its parent", joint.name);
        }
        assert_eq!(catalog.root_name().unwrap(), humanoid::PELVIS);
    }

    #[test]
    fn special_subsets() {
        let catalog = JointCatalog::humanoid();
        assert_eq!(catalog.attach_mode("rHip"), AttachMode::Head);
        assert_eq!(catalog.attach_mode("lHip"), AttachMode::Head);
        assert_eq!(catalog.attach_mode("rShoulder"), AttachMode::Tail);
        assert_eq!(catalog.offset_slot("rHip"), Some(0));
        assert_eq!(catalog.offset_slot("lShoulder"), Some(3));
        assert_eq!(catalog.offset_slot("rKnee"), None);
    }

    #[test]
    fn parses_json_with_defaults() {
        let json = r#"{
            "name": "chain",
            "joints": [
                { "name": "root", "length": 1.0 },
                { "name": "tip", "parent": "root", "length": 0.5, "offset": [0.1, 0.0, 0.0] }
            ],
            "head_attached": ["tip"]
        }"#;
        let catalog = JointCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.joints()[0].rotation, [0.0, 0.0, 0.0, 1.0]);
        assert!(catalog.joints()[0].is_root());
        assert_eq!(catalog.joint("tip").unwrap().offset, [0.1, 0.0, 0.0]);
        assert_eq!(catalog.attach_mode("tip"), AttachMode::Head);
        assert!(catalog.offset_bearing.is_empty());
    }
}
