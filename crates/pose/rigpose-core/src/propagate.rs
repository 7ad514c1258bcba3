//! Hierarchy propagation (forward kinematics).
//!
//! Resolves absolute head, tail and rotation of every bone below `root`. The root's
//! `head_abs` must already be set, and every bone's `tail_abs - head_abs` must encode
//! its length (see [`Bone::seed_tail`]). Parents are always resolved before children.

use crate::bone::{Bone, BoneId};
use crate::catalog::AttachMode;
use crate::config::{OffsetMode, SolverConfig};
use crate::math::{length_vector, Vec3};

/// Propagate absolute state from `root` down through its subtree.
pub fn propagate(bones: &mut [Bone], root: BoneId, cfg: &SolverConfig) {
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        let parent = bones[id.index()].parent.map(|p| {
            let pb = &bones[p.index()];
            (pb.head_abs, pb.tail_abs, pb.rotation_abs)
        });

        let bone = &mut bones[id.index()];
        // Captured before head/tail are overwritten.
        let length = bone.length();

        match parent {
            Some((parent_head, parent_tail, parent_rotation)) => {
                let mut rotation = parent_rotation * bone.relative_rotation;
                if cfg.renormalize {
                    rotation.renormalize();
                }
                bone.rotation_abs = rotation;

                bone.offset_abs = match cfg.offset_mode {
                    OffsetMode::World => bone.offset,
                    OffsetMode::ParentLocal => parent_rotation * bone.offset,
                };

                let anchor = match bone.attach {
                    AttachMode::Head => parent_head,
                    AttachMode::Tail => parent_tail,
                };
                bone.head_abs = anchor + bone.offset_abs;
            }
            None => {
                let mut rotation = bone.relative_rotation;
                if cfg.renormalize {
                    rotation.renormalize();
                }
                bone.rotation_abs = rotation;
                bone.offset_abs = Vec3::zeros();
            }
        }

        bone.tail_abs = bone.head_abs + bone.rotation_abs * length_vector(length);

        // Reverse so siblings are visited in declaration order.
        stack.extend(bone.children.iter().rev().copied());
    }
}
