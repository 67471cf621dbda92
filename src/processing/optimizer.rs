//! The upload optimization pipeline.
//!
//! Both entry points return a usable path no matter what: the original upload
//! when optimization is skipped or fails, otherwise a fresh temp file that the
//! caller takes ownership of. Failures are logged and reported through
//! [`Outcome::Fallback`], never returned as errors.

use std::path::Path;

use image::GenericImageView;
use tracing::{debug, warn};

use crate::core::{
    declared_extension, Dimensions, OptimizeOptions, OptimizedImage, OptimizerSettings, Outcome,
    ProcessingReport, SkipReason, UploadedFile,
};
use crate::utils::{
    create_temp_output, file_size, keep_temp, replace_with_temp, ImageFormat, OptimizerResult,
};
use super::dimensions::{exceeds_raw_estimate, fit_width, raw_estimate_bytes, scale};
use super::imaging::{Imaging, StandardImaging};
use super::raster;

/// Optimizes uploaded images before they are stored.
///
/// Stateless apart from its settings; share one instance across requests.
#[derive(Debug, Clone, Default)]
pub struct ImageOptimizer<B: Imaging = StandardImaging> {
    settings: OptimizerSettings,
    backend: B,
}

impl ImageOptimizer {
    pub fn new(settings: OptimizerSettings) -> Self {
        Self::with_backend(settings, StandardImaging)
    }
}

impl<B: Imaging> ImageOptimizer<B> {
    pub fn with_backend(settings: OptimizerSettings, backend: B) -> Self {
        Self { settings, backend }
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Standard path: caps the width and re-encodes in the source format.
    ///
    /// Uploads under `standard.min_bytes` and anything other than
    /// jpg/jpeg/png/webp come back untouched.
    pub fn optimize(&self, file: &impl UploadedFile, options: OptimizeOptions) -> OptimizedImage {
        let original = file.real_path();
        let threshold = self.settings.standard.min_bytes;

        if file.size() < threshold {
            debug!(
                "Skipping {}: {} bytes is below the {} byte threshold",
                file.client_original_name(), file.size(), threshold
            );
            return OptimizedImage::pass_through(original, SkipReason::BelowSizeThreshold {
                size: file.size(),
                threshold,
            });
        }

        let extension = declared_extension(file);
        let format = match extension.parse::<ImageFormat>() {
            Ok(format) if format.is_standard_input() => format,
            _ => {
                debug!("Skipping {}: unsupported extension '{}'", file.client_original_name(), extension);
                return OptimizedImage::pass_through(original, SkipReason::UnsupportedFormat { extension });
            }
        };

        match self.run_standard(original, format, options) {
            Ok(optimized) => optimized,
            Err(e) => {
                warn!(
                    "Image optimization failed for {} ({} bytes), keeping original: {}",
                    file.client_original_name(), file.size(), e
                );
                OptimizedImage::fallback(original, e.to_string())
            }
        }
    }

    /// Raster path: always emits a JPEG flattened onto white, with a
    /// pre-encode size heuristic and one corrective re-encode.
    ///
    /// Accepts jpg/jpeg/png/webp/gif/bmp; decoding goes strictly by the
    /// declared extension.
    pub fn optimize_with_raster(&self, file: &impl UploadedFile, options: OptimizeOptions) -> OptimizedImage {
        let original = file.real_path();

        let extension = declared_extension(file);
        let format = match extension.parse::<ImageFormat>() {
            Ok(format) if format.is_raster_input() => format,
            _ => {
                debug!("Skipping {}: unsupported extension '{}'", file.client_original_name(), extension);
                return OptimizedImage::pass_through(original, SkipReason::UnsupportedFormat { extension });
            }
        };

        match self.run_raster(original, format, options) {
            Ok(optimized) => optimized,
            Err(e) => {
                warn!(
                    "Raster optimization failed for {} ({} bytes), keeping original: {}",
                    file.client_original_name(), file.size(), e
                );
                OptimizedImage::fallback(original, e.to_string())
            }
        }
    }

    fn run_standard(&self, source: &Path, format: ImageFormat, options: OptimizeOptions) -> OptimizerResult<OptimizedImage> {
        let settings = &self.settings.standard;
        let max_width = options.max_width.unwrap_or(settings.max_width).max(1);
        let quality = options.quality.unwrap_or(settings.quality);

        let image = self.backend.open(source)?;
        let original = self.backend.dimensions(&image);
        let image = if original.width > max_width {
            self.backend.scale_down(image, max_width)?
        } else {
            image
        };
        let output = self.backend.dimensions(&image);

        // Deleted on drop if anything below fails.
        let temp = create_temp_output(&self.settings.scratch_dir(), format.primary_extension())?;
        self.backend.save(&image, temp.path(), format, quality)?;
        drop(image);

        let bytes = file_size(temp.path())?;
        let path = keep_temp(temp)?;
        debug!("Optimized {} → {} ({}, q{}, {} bytes)", original, output, path.display(), quality, bytes);

        Ok(OptimizedImage {
            path,
            outcome: Outcome::Optimized(ProcessingReport {
                original,
                output,
                output_format: format,
                quality,
                pre_shrunk: false,
                corrective_pass: false,
                first_pass_bytes: bytes,
                final_bytes: bytes,
            }),
        })
    }

    fn run_raster(&self, source_path: &Path, format: ImageFormat, options: OptimizeOptions) -> OptimizerResult<OptimizedImage> {
        let settings = &self.settings.raster;
        let max_width = options.max_width.unwrap_or(settings.max_width);
        let mut quality = options.quality.unwrap_or(settings.quality);

        let source = raster::decode_as(source_path, format)?;
        let (width, height) = source.dimensions();
        let original = Dimensions::new(width, height);

        let mut target = fit_width(original, max_width);
        let pre_shrunk = exceeds_raw_estimate(target, settings.raw_estimate_limit_kb);
        if pre_shrunk {
            let estimate_kb = raw_estimate_bytes(target) as f64 / 1024.0;
            target = scale(target, settings.pre_shrink_factor);
            quality = settings.pre_shrink_quality;
            debug!(
                "Raw estimate {:.2} KB over {} KB, pre-shrinking to {} at q{}",
                estimate_kb, settings.raw_estimate_limit_kb, target, quality
            );
        }

        let flattened = raster::render_on_white(&source, target)?;
        drop(source);

        let temp = create_temp_output(&self.settings.scratch_dir(), ImageFormat::JPEG.primary_extension())?;
        raster::write_jpeg(&flattened, temp.as_file(), quality)?;
        drop(flattened);

        let first_pass_bytes = file_size(temp.path())?;
        let path = keep_temp(temp)?;

        let mut output = target;
        let mut final_bytes = first_pass_bytes;
        let corrective_pass = first_pass_bytes > settings.corrective_threshold_bytes;
        if corrective_pass {
            match self.correct(&path, target) {
                Ok((dimensions, bytes)) => {
                    output = dimensions;
                    final_bytes = bytes;
                    quality = settings.corrective_quality;
                }
                Err(e) => {
                    let _ = std::fs::remove_file(&path);
                    return Err(e);
                }
            }
        }

        debug!(
            "Raster optimized {} → {} ({}, q{}, {} bytes)",
            original, output, path.display(), quality, final_bytes
        );

        Ok(OptimizedImage {
            path,
            outcome: Outcome::Optimized(ProcessingReport {
                original,
                output,
                output_format: ImageFormat::JPEG,
                quality,
                pre_shrunk,
                corrective_pass,
                first_pass_bytes,
                final_bytes,
            }),
        })
    }

    /// Re-encodes the written JPEG at `path` smaller, replacing it in place.
    ///
    /// Runs once; whatever size comes out is final.
    fn correct(&self, path: &Path, current: Dimensions) -> OptimizerResult<(Dimensions, u64)> {
        let settings = &self.settings.raster;
        let first_pass = raster::decode_as(path, ImageFormat::JPEG)?;
        let target = scale(current, settings.corrective_factor);
        debug!(
            "First pass over {} bytes, re-encoding at {} q{}",
            settings.corrective_threshold_bytes, target, settings.corrective_quality
        );

        let shrunk = raster::render_on_white(&first_pass, target)?;
        drop(first_pass);

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let replacement = create_temp_output(dir, ImageFormat::JPEG.primary_extension())?;
        raster::write_jpeg(&shrunk, replacement.as_file(), settings.corrective_quality)?;
        drop(shrunk);

        replace_with_temp(replacement, path)?;
        Ok((target, file_size(path)?))
    }
}
