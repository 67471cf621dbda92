//! Core types for optimization requests and outcomes.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::utils::ImageFormat;

/// Per-call overrides. `None` falls back to the path's configured default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeOptions {
    /// Widest allowed output, in pixels
    pub max_width: Option<u32>,
    /// Encoder quality (0-100)
    pub quality: Option<u8>,
}

impl OptimizeOptions {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self {
            max_width: Some(max_width),
            quality: Some(quality),
        }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Why an upload was returned untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum SkipReason {
    /// Too small to be worth a decode/encode cycle
    #[serde(rename_all = "camelCase")]
    BelowSizeThreshold { size: u64, threshold: u64 },
    /// Declared extension is outside the accepted set
    UnsupportedFormat { extension: String },
}

/// What the pipeline did to produce the returned file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingReport {
    pub original: Dimensions,
    pub output: Dimensions,
    pub output_format: ImageFormat,
    /// Quality used for the final encode
    pub quality: u8,
    /// Raw-size estimate forced an extra shrink before the first encode
    pub pre_shrunk: bool,
    /// Written file was over the byte threshold and got re-encoded
    pub corrective_pass: bool,
    pub first_pass_bytes: u64,
    pub final_bytes: u64,
}

/// Result classification; the path alone never tells which branch ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum Outcome {
    PassThrough(SkipReason),
    Optimized(ProcessingReport),
    /// Processing failed; the original path is returned.
    Fallback { error: String },
}

/// Path handed back to the caller plus how it was obtained.
///
/// For [`Outcome::Optimized`] the path is a temp file owned by the caller,
/// who must move or delete it. Otherwise it is the upload's own path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedImage {
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl OptimizedImage {
    pub(crate) fn pass_through(path: &Path, reason: SkipReason) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome: Outcome::PassThrough(reason),
        }
    }

    pub(crate) fn fallback(path: &Path, error: String) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome: Outcome::Fallback { error },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// True when `path` points at a newly written temp file.
    pub fn is_new_file(&self) -> bool {
        matches!(self.outcome, Outcome::Optimized(_))
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self.outcome, Outcome::Fallback { .. })
    }

    pub fn report(&self) -> Option<&ProcessingReport> {
        match &self.outcome {
            Outcome::Optimized(report) => Some(report),
            _ => None,
        }
    }
}

/// Per-upload result of a batch run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Path to the original upload
    pub original_path: String,
    /// Path the caller should store (temp file or original)
    pub optimized_path: String,
    /// Original file size in bytes
    pub original_size: u64,
    /// Size of `optimized_path` in bytes
    pub optimized_size: u64,
    /// Bytes saved (can be negative if file grew)
    pub saved_bytes: i64,
    /// Compression ratio as a percentage
    pub compression_ratio: f64,
    /// How the path was obtained; `None` if the worker itself died
    pub outcome: Option<Outcome>,
    /// Set when the upload could not be processed at all
    pub error: Option<String>,
}

impl OptimizationResult {
    pub fn new(original_path: &Path, original_size: u64, image: OptimizedImage, optimized_size: u64) -> Self {
        let saved_bytes = original_size as i64 - optimized_size as i64;
        let compression_ratio = if original_size > 0 {
            saved_bytes as f64 / original_size as f64 * 100.0
        } else {
            0.0
        };

        Self {
            original_path: original_path.to_string_lossy().to_string(),
            optimized_path: image.path.to_string_lossy().to_string(),
            original_size,
            optimized_size,
            saved_bytes,
            compression_ratio,
            outcome: Some(image.outcome),
            error: None,
        }
    }

    pub fn failed(original_path: &Path, original_size: u64, error: String) -> Self {
        let path = original_path.to_string_lossy().to_string();
        Self {
            original_path: path.clone(),
            optimized_path: path,
            original_size,
            optimized_size: original_size,
            saved_bytes: 0,
            compression_ratio: 0.0,
            outcome: None,
            error: Some(error),
        }
    }
}

/// Totals over a batch of [`OptimizationResult`]s.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub image_count: usize,
    pub optimized: usize,
    pub passed_through: usize,
    pub fallbacks: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
}

impl BatchSummary {
    pub fn from_results(results: &[OptimizationResult]) -> Self {
        let mut summary = Self {
            image_count: results.len(),
            ..Self::default()
        };

        for result in results {
            summary.total_input_bytes += result.original_size;
            summary.total_output_bytes += result.optimized_size;
            match &result.outcome {
                Some(Outcome::Optimized(_)) => summary.optimized += 1,
                Some(Outcome::PassThrough(_)) => summary.passed_through += 1,
                Some(Outcome::Fallback { .. }) | None => summary.fallbacks += 1,
            }
        }

        summary
    }

    pub fn saved_bytes(&self) -> i64 {
        self.total_input_bytes as i64 - self.total_output_bytes as i64
    }
}
