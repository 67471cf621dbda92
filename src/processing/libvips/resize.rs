// src/processing/libvips/resize.rs

//! Width cap on top of libvips' thumbnail operation.

use libvips::{ops, VipsImage};
use crate::utils::{OptimizerError, OptimizerResult};

/// libvips' coordinate limit; leaves the height unconstrained.
const VIPS_MAX_COORD: i32 = 10_000_000;

/// Resizes so the width is at most `max_width` (height scales proportionally).
/// Will not enlarge the image if it is already narrower.
pub fn shrink_to_width(image: VipsImage, max_width: u32) -> OptimizerResult<VipsImage> {
    use ops::{Size, ThumbnailImageOptions};

    if image.get_width() <= max_width as i32 {
        return Ok(image);
    }

    // Without an explicit height the target box would be max_width square.
    let opts = ThumbnailImageOptions {
        height: VIPS_MAX_COORD,
        size: Size::Down, // never upscale
        ..ThumbnailImageOptions::default()
    };

    ops::thumbnail_image_with_opts(&image, max_width.min(VIPS_MAX_COORD as u32) as i32, &opts)
        .map_err(|e| OptimizerError::resize(format!("Resize (width) failed: {e}")))
}
