//! Configuration for the pose solver and frame processor

use serde::{Deserialize, Serialize};

use crate::error::PoseError;
use crate::Result;

/// How joint offsets are interpreted during propagation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetMode {
    /// Offsets are already expressed in world space (what the frame stream delivers).
    #[default]
    World,
    /// Offsets are local to the parent and get rotated by the parent's absolute rotation.
    ParentLocal,
}

/// Solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Offset interpretation for propagation
    pub offset_mode: OffsetMode,
    /// Renormalize composed rotations to counter drift
    pub renormalize: bool,
    /// Run advisory value checks before posing a frame
    pub validate_frames: bool,
    /// Bounds used by frame validation
    pub limits: ValidationLimits,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            offset_mode: OffsetMode::World,
            renormalize: true,
            validate_frames: true,
            limits: ValidationLimits::default(),
        }
    }
}

impl SolverConfig {
    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.limits.validate()
    }

    #[inline]
    pub fn with_offset_mode(mut self, mode: OffsetMode) -> Self {
        self.offset_mode = mode;
        self
    }

    #[inline]
    pub fn with_renormalize(mut self, enabled: bool) -> Self {
        self.renormalize = enabled;
        self
    }

    #[inline]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_frames = enabled;
        self
    }

    #[inline]
    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Plausibility bounds for frame values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Largest accepted absolute root location component
    pub max_location: f64,
    /// Largest accepted absolute quaternion component
    pub max_rotation_component: f64,
    /// Lengths must be strictly greater than this
    pub min_length: f64,
    /// Lengths must not exceed this
    pub max_length: f64,
    /// Largest accepted absolute offset component
    pub max_offset: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_location: 1_000_000.0,
            max_rotation_component: 1.0,
            min_length: 0.01,
            max_length: 1000.0,
            max_offset: 100.0,
        }
    }
}

impl ValidationLimits {
    pub fn validate(&self) -> Result<()> {
        let all = [
            self.max_location,
            self.max_rotation_component,
            self.min_length,
            self.max_length,
            self.max_offset,
        ];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PoseError::InvalidConfig {
                reason: "validation limits must be finite and non-negative".to_string(),
            });
        }
        if self.min_length >= self.max_length {
            return Err(PoseError::InvalidConfig {
                reason: format!(
                    "min_length ({}) must be below max_length ({})",
                    self.min_length, self.max_length
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SolverConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.offset_mode, OffsetMode::World);
        assert!(cfg.renormalize);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = SolverConfig::from_json_str(
            r#"{ "offset_mode": "parent_local", "limits": { "max_offset": 2.5 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.offset_mode, OffsetMode::ParentLocal);
        assert!(cfg.validate_frames);
        assert_eq!(cfg.limits.max_offset, 2.5);
        assert_eq!(cfg.limits.max_length, 1000.0);
    }

    #[test]
    fn inverted_length_range_is_rejected() {
        let limits = ValidationLimits {
            min_length: 5.0,
            max_length: 1.0,
            ..Default::default()
        };
        let err = SolverConfig::default()
            .with_limits(limits)
            .validate()
            .unwrap_err();
        assert!(matches!(err, PoseError::InvalidConfig { .. }));
    }
}
