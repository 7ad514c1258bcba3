//! Advisory plausibility checks for incoming frames.
//!
//! The solver never needs these to be correct; they catch corrupt input before a
//! frame reaches a sink.

use crate::config::ValidationLimits;
use crate::error::{FrameField, PoseError};
use crate::frame::FrameData;
use crate::Result;

fn check<F>(field: FrameField, values: &[f64], ok: F) -> Result<()>
where
    F: Fn(f64) -> bool,
{
    match values.iter().position(|v| !v.is_finite() || !ok(*v)) {
        Some(index) => Err(PoseError::UnreasonableValue {
            field,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Report the first unreasonable value of `frame`, checking location, rotations,
/// lengths and offsets in that order.
pub fn validate_frame(frame: &FrameData, limits: &ValidationLimits) -> Result<()> {
    check(FrameField::Location, &frame.location, |v| {
        v.abs() <= limits.max_location
    })?;
    check(FrameField::Rotation, &frame.rotations, |v| {
        v.abs() <= limits.max_rotation_component
    })?;
    if let Some(lengths) = &frame.lengths {
        check(FrameField::Length, lengths, |v| {
            v > limits.min_length && v <= limits.max_length
        })?;
    }
    if let Some(offsets) = &frame.offsets {
        check(FrameField::Offset, offsets, |v| v.abs() <= limits.max_offset)?;
    }
    Ok(())
}
