//! Rest pose construction.
//!
//! Walks a [`RigSource`], creates one bone per joint, wires the tree and resolves the
//! initial absolute pose. The result is the immutable template every frame is posed from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bone::{checked_length, Bone, BoneId};
use crate::catalog::JointCatalog;
use crate::config::SolverConfig;
use crate::error::PoseError;
use crate::joint_order::JointOrder;
use crate::math::{quat_from_xyzw, vec3, vec3_at};
use crate::pose::Pose;
use crate::propagate::propagate;
use crate::source::RigSource;
use crate::Result;

/// Per-character adjustments applied while building a rest pose.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestOverrides {
    /// Where the root's head is placed.
    pub root_location: [f64; 3],
    /// Lengths by joint-order index; joints not covered keep the source length.
    pub lengths: Option<Vec<f64>>,
    /// Offsets by offset slot (3 values each); slots not covered keep the source offset.
    pub offsets: Option<Vec<f64>>,
}

impl RestOverrides {
    pub fn with_root_location(mut self, location: [f64; 3]) -> Self {
        self.root_location = location;
        self
    }

    pub fn with_lengths(mut self, lengths: Vec<f64>) -> Self {
        self.lengths = Some(lengths);
        self
    }

    pub fn with_offsets(mut self, offsets: Vec<f64>) -> Self {
        self.offsets = Some(offsets);
        self
    }
}

/// Immutable skeleton template.
#[derive(Clone, Debug, PartialEq)]
pub struct RestPose {
    pub(crate) pose: Pose,
    pub(crate) cfg: SolverConfig,
    /// Number of offset slots addressed by joints of this skeleton.
    pub(crate) offset_slots: usize,
}

impl RestPose {
    /// Build from a catalog that also serves as its own rig source.
    pub fn from_catalog(catalog: &JointCatalog, cfg: SolverConfig) -> Result<Self> {
        Self::build(catalog, catalog, &RestOverrides::default(), cfg)
    }

    /// Build from `source`, taking attachment conventions from `catalog`.
    pub fn build<S>(
        catalog: &JointCatalog,
        source: &S,
        overrides: &RestOverrides,
        cfg: SolverConfig,
    ) -> Result<Self>
    where
        S: RigSource + ?Sized,
    {
        cfg.validate()?;

        let mut order = JointOrder::with_capacity(catalog.joints().len());
        let mut bones: Vec<Bone> = Vec::with_capacity(catalog.joints().len());
        let mut root: Option<BoneId> = None;
        let mut offset_slots = 0usize;

        let mut cursor: Option<String> = None;
        while let Some(joint) = source.next_joint(cursor.as_deref())? {
            if order.index_of(&joint.name).is_some() {
                return Err(PoseError::DuplicateJoint { joint: joint.name });
            }

            let id = BoneId(bones.len() as u32);
            let parent = if joint.is_root() {
                if let Some(existing) = root {
                    return Err(PoseError::MultipleRoots {
                        first: bones[existing.index()].name.clone(),
                        second: joint.name,
                    });
                }
                root = Some(id);
                None
            } else {
                let parent = order
                    .id_of(&joint.parent)
                    .ok_or_else(|| PoseError::UnknownParent {
                        joint: joint.name.clone(),
                        parent: joint.parent.clone(),
                    })?;
                Some(parent)
            };

            let rotation =
                quat_from_xyzw(joint.rotation).ok_or_else(|| PoseError::DegenerateRotation {
                    joint: joint.name.clone(),
                })?;

            let slot = catalog.offset_slot(&joint.name);
            let offset = slot
                .and_then(|s| {
                    overrides
                        .offsets
                        .as_deref()
                        .and_then(|offsets| vec3_at(offsets, s * 3))
                })
                .unwrap_or_else(|| vec3(joint.offset));
            if let Some(s) = slot {
                offset_slots = offset_slots.max(s + 1);
            }

            let length = overrides
                .lengths
                .as_deref()
                .and_then(|lengths| lengths.get(id.index()).copied())
                .unwrap_or(joint.length);
            let length = checked_length(id.index(), length)?;

            let mut bone = Bone::new(joint.name.as_str(), catalog.attach_mode(&joint.name), slot);
            bone.parent = parent;
            bone.relative_rotation = rotation;
            bone.offset = offset;
            bone.set_length(length);

            if let Some(p) = parent {
                bones[p.index()].children.push(id);
            }
            bones.push(bone);
            order.push(&joint.name);

            cursor = Some(joint.name);
        }

        let root = root.ok_or(PoseError::EmptySkeleton)?;

        bones[root.index()].head_abs = vec3(overrides.root_location);
        for bone in bones.iter_mut() {
            bone.seed_tail();
        }
        propagate(&mut bones, root, &cfg);

        debug!(
            catalog = %catalog.name,
            joints = bones.len(),
            offset_slots,
            "rest pose built"
        );

        Ok(Self {
            pose: Pose {
                order: Arc::new(order),
                bones,
                root,
            },
            cfg,
            offset_slots,
        })
    }

    /// The resolved rest pose.
    #[inline]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    #[inline]
    pub fn joint_order(&self) -> &JointOrder {
        self.pose.joint_order()
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.pose.len()
    }

    /// Offset values expected per frame: `3 * offset_slots`.
    #[inline]
    pub fn offset_slots(&self) -> usize {
        self.offset_slots
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.cfg
    }
}
