//! Persistent tuning knobs for the transform subsystem.
//!
//! Stored as JSON next to the host application's other configuration. All
//! fields carry serde defaults so old files keep loading after new knobs
//! are added.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::prop::Falloff;
use crate::snap::ProjectMissPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Rotations larger than this are applied in sub-steps so Euler
    /// channels stay continuous. Radians.
    pub large_rotation_step: f32,
    /// Scale applied to per-step angle deltas while precision is held.
    pub angle_precision_scale: f32,
    /// Scale applied to per-step linear deltas while precision is held.
    pub linear_precision_scale: f32,
    /// Element count above which kernels fan out across threads.
    pub parallel_threshold: usize,
    /// Minimum time between scene snap queries, in milliseconds.
    pub snap_interval_ms: u64,
    /// Coarse increment for translation snapping, in scene units.
    pub increment: f32,
    /// Fine increment used while precision is held.
    pub increment_precision: f32,
    /// Coarse angular increment, radians.
    pub increment_angle: f32,
    /// Fine angular increment, radians.
    pub increment_angle_precision: f32,
    /// What to do with elements whose individual projection finds no surface.
    pub project_miss_policy: ProjectMissPolicy,
    /// Default proportional falloff curve.
    pub prop_falloff: Falloff,
    /// Default proportional influence radius.
    pub prop_size: f32,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            large_rotation_step: 0.9 * std::f32::consts::PI,
            angle_precision_scale: 0.1,
            linear_precision_scale: 0.1,
            parallel_threshold: 1024,
            snap_interval_ms: 10,
            increment: 1.0,
            increment_precision: 0.1,
            increment_angle: 5.0_f32.to_radians(),
            increment_angle_precision: 1.0_f32.to_radians(),
            project_miss_policy: ProjectMissPolicy::KeepTransformed,
            prop_falloff: Falloff::Smooth,
            prop_size: 1.0,
        }
    }
}

impl TransformSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| TransformError::Settings {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&data).map_err(|e| TransformError::Settings {
            reason: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).map_err(|e| TransformError::Settings {
            reason: format!("failed to serialize settings: {e}"),
        })?;
        fs::write(path, data).map_err(|e| TransformError::Settings {
            reason: format!("failed to write {}: {}", path.display(), e),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.prop_size <= 0.0 {
            return Err(TransformError::Settings {
                reason: "prop_size must be positive".into(),
            });
        }
        if self.increment <= 0.0 || self.increment_precision <= 0.0 {
            return Err(TransformError::Settings {
                reason: "snap increments must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Settings shared between the session and the host UI.
pub type SettingsHandle = Arc<RwLock<TransformSettings>>;

pub fn settings_handle(settings: TransformSettings) -> SettingsHandle {
    Arc::new(RwLock::new(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(TransformSettings::default().validate().is_ok());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transform.json");
        let mut settings = TransformSettings::default();
        settings.parallel_threshold = 64;
        settings.prop_falloff = Falloff::Sharp;
        settings.save(&path).unwrap();

        let loaded = TransformSettings::load(&path).unwrap();
        assert_eq!(loaded.parallel_threshold, 64);
        assert_eq!(loaded.prop_falloff, Falloff::Sharp);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: TransformSettings =
            serde_json::from_str(r#"{"increment": 2.5}"#).unwrap();
        assert_eq!(loaded.increment, 2.5);
        assert_eq!(loaded.parallel_threshold, 1024);
    }

    #[test]
    fn test_invalid_prop_size_rejected() {
        let mut settings = TransformSettings::default();
        settings.prop_size = 0.0;
        assert!(settings.validate().is_err());
    }
}
