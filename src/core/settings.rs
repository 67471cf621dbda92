//! Optimizer settings and their loading.
//!
//! Every field has a default, so a settings file only needs the keys it
//! changes. `IMAGE_OPTIMIZER_CONFIG` names a JSON settings file and
//! `IMAGE_OPTIMIZER_TEMP_DIR` overrides where scratch output is written.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::utils::{OptimizerError, OptimizerResult, validate_settings};

pub const CONFIG_ENV: &str = "IMAGE_OPTIMIZER_CONFIG";
pub const TEMP_DIR_ENV: &str = "IMAGE_OPTIMIZER_TEMP_DIR";

/// Top-level settings for [`crate::ImageOptimizer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizerSettings {
    /// Scratch directory for optimized output; system temp dir when unset
    pub temp_dir: Option<PathBuf>,
    pub standard: StandardSettings,
    pub raster: RasterSettings,
}

/// Settings for the standard (format-preserving) path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandardSettings {
    /// Uploads smaller than this are returned untouched
    pub min_bytes: u64,
    pub max_width: u32,
    pub quality: u8,
}

impl Default for StandardSettings {
    fn default() -> Self {
        Self {
            min_bytes: 512_000,
            max_width: 1920,
            quality: 85,
        }
    }
}

/// Settings for the raster (always-JPEG) path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RasterSettings {
    pub max_width: u32,
    pub quality: u8,
    /// Uncompressed RGB estimate (KB) above which the target is pre-shrunk
    pub raw_estimate_limit_kb: u64,
    pub pre_shrink_factor: f64,
    pub pre_shrink_quality: u8,
    /// Written files larger than this get one corrective re-encode
    pub corrective_threshold_bytes: u64,
    pub corrective_factor: f64,
    pub corrective_quality: u8,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            max_width: 1600,
            quality: 75,
            raw_estimate_limit_kb: 1500,
            pre_shrink_factor: 0.7,
            pre_shrink_quality: 70,
            corrective_threshold_bytes: 1_900_000,
            corrective_factor: 0.8,
            corrective_quality: 65,
        }
    }
}

impl OptimizerSettings {
    /// Reads and validates a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> OptimizerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OptimizerError::config(format!("Cannot read settings file {}: {}", path.display(), e))
        })?;
        let settings: Self = serde_json::from_str(&raw)?;
        validate_settings(&settings)?;
        debug!("Loaded optimizer settings from {}", path.display());
        Ok(settings)
    }

    /// Defaults, then the file named by `IMAGE_OPTIMIZER_CONFIG`, then
    /// `IMAGE_OPTIMIZER_TEMP_DIR`.
    pub fn from_env() -> OptimizerResult<Self> {
        Self::from_vars(|key| std::env::var_os(key))
    }

    fn from_vars(var: impl Fn(&str) -> Option<OsString>) -> OptimizerResult<Self> {
        let mut settings = match var(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => Self::default(),
        };

        if let Some(dir) = var(TEMP_DIR_ENV) {
            settings.temp_dir = Some(PathBuf::from(dir));
            validate_settings(&settings)?;
        }

        Ok(settings)
    }

    /// Directory scratch files are written to.
    pub fn scratch_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "raster": { "quality": 60 }, "standard": { "minBytes": 1024 } }"#).unwrap();

        let settings = OptimizerSettings::load(&path).unwrap();
        assert_eq!(settings.raster.quality, 60);
        assert_eq!(settings.raster.max_width, 1600);
        assert_eq!(settings.raster.corrective_threshold_bytes, 1_900_000);
        assert_eq!(settings.standard.min_bytes, 1024);
        assert_eq!(settings.standard.max_width, 1920);
        assert_eq!(settings.temp_dir, None);
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "standard": { "maxWidth": 0 } }"#).unwrap();
        assert!(matches!(
            OptimizerSettings::load(&path),
            Err(OptimizerError::Validation(_))
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(OptimizerSettings::load(&path), Err(OptimizerError::Config(_))));
    }

    fn vars(pairs: &[(&str, &Path)]) -> impl Fn(&str) -> Option<OsString> {
        let pairs: Vec<(String, OsString)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_os_str().to_os_string()))
            .collect();
        move |key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn env_without_vars_gives_defaults() {
        let settings = OptimizerSettings::from_vars(vars(&[])).unwrap();
        assert_eq!(settings, OptimizerSettings::default());
    }

    #[test]
    fn env_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "raster": { "correctiveThresholdBytes": 1000 } }"#).unwrap();

        let settings = OptimizerSettings::from_vars(vars(&[(CONFIG_ENV, path.as_path())])).unwrap();
        assert_eq!(settings.raster.corrective_threshold_bytes, 1000);
        assert_eq!(settings.standard.min_bytes, 512_000);

        let missing = dir.path().join("absent.json");
        assert!(matches!(
            OptimizerSettings::from_vars(vars(&[(CONFIG_ENV, missing.as_path())])),
            Err(OptimizerError::Config(_))
        ));
    }

    #[test]
    fn env_temp_dir_overrides_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, format!(r#"{{ "tempDir": {:?} }}"#, dir.path())).unwrap();

        let settings = OptimizerSettings::from_vars(vars(&[(CONFIG_ENV, path.as_path()), (TEMP_DIR_ENV, scratch.as_path())])).unwrap();
        assert_eq!(settings.scratch_dir(), scratch);

        let settings = OptimizerSettings::from_vars(vars(&[(TEMP_DIR_ENV, scratch.as_path())])).unwrap();
        assert_eq!(settings.temp_dir, Some(scratch));
    }

    #[test]
    fn env_temp_dir_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        assert!(matches!(
            OptimizerSettings::from_vars(vars(&[(TEMP_DIR_ENV, gone.as_path())])),
            Err(OptimizerError::Validation(_))
        ));
    }

    #[test]
    fn scratch_dir_defaults_to_system_temp() {
        let settings = OptimizerSettings::default();
        assert_eq!(settings.scratch_dir(), std::env::temp_dir());
    }
}
