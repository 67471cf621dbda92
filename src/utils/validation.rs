use std::path::Path;
use crate::core::{OptimizeOptions, OptimizerSettings, RasterSettings, StandardSettings};
use crate::utils::{OptimizerResult, ValidationError};

/// Validates an upload's backing file before it is wrapped.
pub fn validate_input_path(path: &Path) -> OptimizerResult<()> {
    if !path.exists() {
        return Err(ValidationError::path_not_found(path).into());
    }

    if !path.is_file() {
        return Err(ValidationError::not_a_file(path).into());
    }

    Ok(())
}

/// Validates the full settings tree.
pub fn validate_settings(settings: &OptimizerSettings) -> OptimizerResult<()> {
    if let Some(dir) = &settings.temp_dir {
        if !dir.is_dir() {
            return Err(ValidationError::settings(format!(
                "Temp directory does not exist: {}", dir.display()
            )).into());
        }
    }

    validate_standard(&settings.standard)?;
    validate_raster(&settings.raster)?;
    Ok(())
}

/// Validates per-call overrides.
pub fn validate_options(options: &OptimizeOptions) -> OptimizerResult<()> {
    if let Some(width) = options.max_width {
        validate_width("maxWidth", width)?;
    }
    if let Some(quality) = options.quality {
        validate_quality("quality", quality)?;
    }
    Ok(())
}

fn validate_standard(settings: &StandardSettings) -> OptimizerResult<()> {
    validate_width("standard.maxWidth", settings.max_width)?;
    validate_quality("standard.quality", settings.quality)?;
    Ok(())
}

fn validate_raster(settings: &RasterSettings) -> OptimizerResult<()> {
    validate_width("raster.maxWidth", settings.max_width)?;
    validate_quality("raster.quality", settings.quality)?;
    validate_quality("raster.preShrinkQuality", settings.pre_shrink_quality)?;
    validate_quality("raster.correctiveQuality", settings.corrective_quality)?;
    validate_factor("raster.preShrinkFactor", settings.pre_shrink_factor)?;
    validate_factor("raster.correctiveFactor", settings.corrective_factor)?;
    Ok(())
}

fn validate_width(field: &str, width: u32) -> OptimizerResult<()> {
    if width == 0 {
        return Err(ValidationError::settings(format!("{field} cannot be 0")).into());
    }
    Ok(())
}

fn validate_quality(field: &str, quality: u8) -> OptimizerResult<()> {
    if quality > 100 {
        return Err(ValidationError::settings(format!(
            "Invalid {field}: {quality}. Must be between 0 and 100"
        )).into());
    }
    Ok(())
}

fn validate_factor(field: &str, factor: f64) -> OptimizerResult<()> {
    if !(factor > 0.0 && factor <= 1.0) {
        return Err(ValidationError::settings(format!(
            "Invalid {field}: {factor}. Must be in (0, 1]"
        )).into());
    }
    Ok(())
}
