//! Core types shared by the pipeline and its callers.
//!
//! - [`UploadedFile`]: the upload handed over by the request layer
//! - [`OptimizerSettings`]: thresholds, defaults and scratch location
//! - [`OptimizeOptions`]: per-call width/quality overrides
//! - [`OptimizedImage`]: returned path plus the [`Outcome`] that produced it
//! - [`OptimizationResult`]: per-upload batch result

mod settings;
mod types;
mod upload;

pub use settings::{OptimizerSettings, RasterSettings, StandardSettings, CONFIG_ENV, TEMP_DIR_ENV};
pub use types::{
    BatchSummary, Dimensions, OptimizationResult, OptimizeOptions, OptimizedImage, Outcome,
    ProcessingReport, SkipReason,
};
pub use upload::{LocalUpload, UploadedFile};
pub(crate) use upload::declared_extension;
