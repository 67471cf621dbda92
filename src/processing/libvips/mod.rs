// src/processing/libvips/mod.rs

//! Standard-path backend on libvips (`vips` feature).
//!
//! libvips streams and shrinks on load, so large uploads never get fully
//! decoded into memory before the width cut.
//!
//! - [`resize`]: width cap via `ops::thumbnail_image_with_opts`.
//! - [`formats`]: quality → format-specific `ops::*save_with_opts` calls.

mod formats;
mod resize;

use std::path::Path;
use std::sync::Arc;

use libvips::VipsImage;
use tracing::debug;

use crate::core::Dimensions;
use crate::utils::{ImageFormat, OptimizerError, OptimizerResult};
use super::imaging::Imaging;

/// Thread-safe guard for the libvips `VipsApp` lifecycle.
///
/// `VipsApp` initializes the libvips thread pool and global state on creation
/// and shuts it down on drop. Wrapping in Arc ensures exactly one shutdown
/// call when the last reference is released.
struct VipsAppGuard(libvips::VipsApp);

// libvips is designed for concurrent use; individual VipsImage instances must
// not be shared between threads, but concurrent creation on separate threads is safe.
unsafe impl Send for VipsAppGuard {}
unsafe impl Sync for VipsAppGuard {}

/// libvips-backed [`Imaging`]. Keeps libvips initialized while any clone lives.
#[derive(Clone)]
pub struct VipsImaging {
    _vips: Arc<VipsAppGuard>,
}

impl VipsImaging {
    pub fn new() -> OptimizerResult<Self> {
        let vips = libvips::VipsApp::default("upload-image-optimizer")
            .map_err(|e| OptimizerError::config(format!("Failed to initialize libvips: {e}")))?;
        // 0 = let libvips decide based on available CPU cores
        vips.concurrency_set(0);
        debug!("libvips initialized (concurrency: {})", vips.concurency_get());

        Ok(Self {
            _vips: Arc::new(VipsAppGuard(vips)),
        })
    }
}

impl Imaging for VipsImaging {
    type Image = VipsImage;

    fn open(&self, path: &Path) -> OptimizerResult<VipsImage> {
        let path_str = path_to_str(path)?;
        VipsImage::new_from_file(path_str)
            .map_err(|e| OptimizerError::decode(format!("Failed to load '{path_str}': {e}")))
    }

    fn dimensions(&self, image: &VipsImage) -> Dimensions {
        Dimensions::new(image.get_width().max(0) as u32, image.get_height().max(0) as u32)
    }

    fn scale_down(&self, image: VipsImage, max_width: u32) -> OptimizerResult<VipsImage> {
        resize::shrink_to_width(image, max_width)
    }

    fn save(&self, image: &VipsImage, path: &Path, format: ImageFormat, quality: u8) -> OptimizerResult<()> {
        formats::save_image_as(image, path_to_str(path)?, format, quality)
    }
}

fn path_to_str(path: &Path) -> OptimizerResult<&str> {
    path.to_str()
        .ok_or_else(|| OptimizerError::format(format!("Non UTF-8 path: {}", path.display())))
}
