//! One frame of rig animation data as delivered by the frame stream.

use serde::{Deserialize, Serialize};

/// Flat per-frame arrays are indexed by the template's joint order
/// (rotations, lengths) or by offset slot (offsets).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    pub rig_id: String,
    pub frame: i32,
    /// World position of the root joint.
    pub location: [f64; 3],
    /// `4 * joint_count` values, `[x, y, z, w]` per joint.
    pub rotations: Vec<f64>,
    /// Per-joint bone lengths; may cover only a prefix of the joints.
    #[serde(default)]
    pub lengths: Option<Vec<f64>>,
    /// `3 * offset_slot_count` values.
    #[serde(default)]
    pub offsets: Option<Vec<f64>>,
}

impl FrameData {
    pub fn new(
        rig_id: impl Into<String>,
        frame: i32,
        location: [f64; 3],
        rotations: Vec<f64>,
    ) -> Self {
        Self {
            rig_id: rig_id.into(),
            frame,
            location,
            rotations,
            lengths: None,
            offsets: None,
        }
    }

    /// Frame with identity rotations for `joint_count` joints.
    pub fn identity(rig_id: impl Into<String>, frame: i32, location: [f64; 3], joint_count: usize) -> Self {
        let rotations = (0..joint_count)
            .flat_map(|_| [0.0, 0.0, 0.0, 1.0])
            .collect();
        Self::new(rig_id, frame, location, rotations)
    }

    pub fn with_lengths(mut self, lengths: Vec<f64>) -> Self {
        self.lengths = Some(lengths);
        self
    }

    pub fn with_offsets(mut self, offsets: Vec<f64>) -> Self {
        self.offsets = Some(offsets);
        self
    }

    /// Overwrite the rotation of joint `index` with `[x, y, z, w]`.
    /// Does nothing when the rotation array does not cover `index`.
    pub fn set_rotation(&mut self, index: usize, q: [f64; 4]) {
        if let Some(slot) = self.rotations.get_mut(index * 4..index * 4 + 4) {
            slot.copy_from_slice(&q);
        }
    }
}
