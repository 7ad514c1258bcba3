//! Bone entity stored in a pose arena.

use serde::{Deserialize, Serialize};

use crate::catalog::AttachMode;
use crate::error::{FrameField, PoseError};
use crate::math::{length_vector, Quat, Vec3};
use crate::Result;

/// Bone lengths must be finite and strictly positive. `index` is the joint-order index.
pub(crate) fn checked_length(index: usize, length: f64) -> Result<f64> {
    if length.is_finite() && length > 0.0 {
        Ok(length)
    } else {
        Err(PoseError::UnreasonableValue {
            field: FrameField::Length,
            index,
            value: length,
        })
    }
}

/// Index of a bone inside its pose arena. Equal to the joint-order index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoneId(pub u32);

impl BoneId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Live per-joint record. `head_abs`, `tail_abs`, `rotation_abs` and `offset_abs`
/// are only meaningful after propagation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub parent: Option<BoneId>,
    pub children: Vec<BoneId>,
    pub attach: AttachMode,
    /// Position within the offset-bearing subset.
    pub offset_slot: Option<usize>,

    pub relative_rotation: Quat,
    pub offset: Vec3,
    /// Canonical axis scaled by the bone length.
    pub local_tail: Vec3,

    pub head_abs: Vec3,
    pub tail_abs: Vec3,
    pub rotation_abs: Quat,
    pub offset_abs: Vec3,
}

impl Bone {
    pub fn new(name: impl Into<String>, attach: AttachMode, offset_slot: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            attach,
            offset_slot,
            relative_rotation: Quat::identity(),
            offset: Vec3::zeros(),
            local_tail: Vec3::zeros(),
            head_abs: Vec3::zeros(),
            tail_abs: Vec3::zeros(),
            rotation_abs: Quat::identity(),
            offset_abs: Vec3::zeros(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn set_length(&mut self, length: f64) {
        self.local_tail = length_vector(length);
    }

    /// Length carried by the pre-propagation encoding.
    #[inline]
    pub fn rest_length(&self) -> f64 {
        self.local_tail.norm()
    }

    /// Resolved length, `|tail_abs - head_abs|`.
    #[inline]
    pub fn length(&self) -> f64 {
        (self.tail_abs - self.head_abs).norm()
    }

    /// Re-encode the length into `tail_abs` relative to the current head.
    #[inline]
    pub fn seed_tail(&mut self) {
        self.tail_abs = self.head_abs + self.local_tail;
    }
}
