//! Batch entry points for callers that hold a tokio runtime.
//!
//! - [`optimize_upload`]: optimize a single upload
//! - [`optimize_uploads`]: optimize a batch, one result per upload

mod image;

pub use image::*;
