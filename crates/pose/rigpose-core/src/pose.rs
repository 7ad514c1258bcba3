//! Posed snapshots and the per-frame pose applier.

use std::sync::Arc;

use hashbrown::HashMap;
use serde::Serialize;

use crate::bone::{checked_length, Bone, BoneId};
use crate::error::{FrameField, PoseError};
use crate::frame::FrameData;
use crate::joint_order::JointOrder;
use crate::math::{quat_at, vec3, vec3_at, Vec3};
use crate::propagate::propagate;
use crate::rest_pose::RestPose;
use crate::Result;

/// A fully resolved skeleton: an arena of bones in joint order.
///
/// Cloning is a deep copy of the bones; only the joint order is shared.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pose {
    #[serde(skip)]
    pub(crate) order: Arc<JointOrder>,
    pub(crate) bones: Vec<Bone>,
    pub(crate) root: BoneId,
}

impl Pose {
    #[inline]
    pub fn root(&self) -> BoneId {
        self.root
    }

    #[inline]
    pub fn root_bone(&self) -> &Bone {
        &self.bones[self.root.index()]
    }

    /// Bones in joint order.
    #[inline]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id.index())
    }

    pub fn get(&self, name: &str) -> Option<&Bone> {
        self.order.index_of(name).and_then(|i| self.bones.get(i))
    }

    /// Like [`Pose::get`], but reports unknown names as errors.
    pub fn require(&self, name: &str) -> Result<&Bone> {
        self.get(name).ok_or_else(|| PoseError::UnknownJoint {
            name: name.to_string(),
        })
    }

    pub fn parent_of(&self, bone: &Bone) -> Option<&Bone> {
        bone.parent.and_then(|p| self.bone(p))
    }

    #[inline]
    pub fn joint_order(&self) -> &JointOrder {
        &self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Head positions in joint order.
    pub fn heads(&self) -> Vec<Vec3> {
        self.bones.iter().map(|b| b.head_abs).collect()
    }

    /// Name-keyed copy of every bone.
    pub fn to_map(&self) -> HashMap<String, Bone> {
        self.bones
            .iter()
            .map(|b| (b.name.clone(), b.clone()))
            .collect()
    }
}

impl RestPose {
    /// Pose one frame. The rest pose is left untouched; on error nothing is produced.
    ///
    /// `rotations` holds `[x, y, z, w]` per joint in joint order and is composed onto the
    /// rest rotation (`rest * delta`). `lengths` overrides the joints it covers. `offsets`
    /// replaces the offsets of offset-bearing joints, indexed by offset slot.
    pub fn apply(
        &self,
        location: [f64; 3],
        lengths: Option<&[f64]>,
        rotations: &[f64],
        offsets: Option<&[f64]>,
    ) -> Result<Pose> {
        let required = 4 * self.joint_count();
        if rotations.len() < required {
            return Err(PoseError::FrameShape {
                field: FrameField::Rotation,
                required,
                actual: rotations.len(),
            });
        }
        if let Some(offsets) = offsets {
            let required = 3 * self.offset_slots;
            if offsets.len() < required {
                return Err(PoseError::FrameShape {
                    field: FrameField::Offset,
                    required,
                    actual: offsets.len(),
                });
            }
        }

        let mut bones = self.pose.bones.clone();

        for (index, bone) in bones.iter_mut().enumerate() {
            let delta = match quat_at(rotations, index * 4) {
                Some(Some(q)) => q,
                Some(None) => {
                    return Err(PoseError::DegenerateRotation {
                        joint: bone.name.clone(),
                    })
                }
                None => {
                    return Err(PoseError::FrameShape {
                        field: FrameField::Rotation,
                        required,
                        actual: rotations.len(),
                    })
                }
            };
            bone.relative_rotation *= delta;
            if self.cfg.renormalize {
                bone.relative_rotation.renormalize();
            }

            if let Some(length) = lengths.and_then(|l| l.get(index)) {
                bone.set_length(checked_length(index, *length)?);
            }

            if let (Some(offsets), Some(slot)) = (offsets, bone.offset_slot) {
                bone.offset = vec3_at(offsets, slot * 3).ok_or(PoseError::FrameShape {
                    field: FrameField::Offset,
                    required: slot * 3 + 3,
                    actual: offsets.len(),
                })?;
            }
        }

        bones[self.pose.root.index()].head_abs = vec3(location);
        for bone in bones.iter_mut() {
            bone.seed_tail();
        }
        propagate(&mut bones, self.pose.root, &self.cfg);

        Ok(Pose {
            order: Arc::clone(&self.pose.order),
            bones,
            root: self.pose.root,
        })
    }

    /// Pose a frame delivered by the frame stream.
    pub fn apply_frame(&self, frame: &FrameData) -> Result<Pose> {
        self.apply(
            frame.location,
            frame.lengths.as_deref(),
            &frame.rotations,
            frame.offsets.as_deref(),
        )
    }
}

/// Free-function form of [`RestPose::apply`].
pub fn apply_pose(
    rest: &RestPose,
    location: [f64; 3],
    lengths: Option<&[f64]>,
    rotations: &[f64],
    offsets: Option<&[f64]>,
) -> Result<Pose> {
    rest.apply(location, lengths, rotations, offsets)
}
