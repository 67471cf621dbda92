// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{
    BatchSummary, Dimensions, LocalUpload, OptimizationResult, OptimizeOptions, OptimizedImage,
    OptimizerSettings, Outcome, ProcessingReport, SkipReason, UploadedFile,
};
pub use crate::processing::{ImageOptimizer, Imaging, StandardImaging};
#[cfg(feature = "vips")]
pub use crate::processing::VipsImaging;
pub use crate::utils::{ImageFormat, OptimizerError, OptimizerResult};
pub use crate::commands::{optimize_upload, optimize_uploads, OptimizeMode};
