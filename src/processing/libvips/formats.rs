// src/processing/libvips/formats.rs

//! Maps a quality value to libvips format-specific save options.

use libvips::ops::{self, ForeignKeep};
use libvips::VipsImage;
use crate::utils::{ImageFormat, OptimizerError, OptimizerResult, png_compression_level};

const PNG_EFFORT: i32 = 4;
const WEBP_EFFORT: i32 = 4;

/// Saves `image` as optimised baseline JPEG, metadata stripped.
pub fn save_jpeg(image: &VipsImage, output_path: &str, quality: u8) -> OptimizerResult<()> {
    let opts = ops::JpegsaveOptions {
        q: i32::from(quality),
        optimize_coding: true,
        keep: ForeignKeep::None, // strip metadata
        ..ops::JpegsaveOptions::default()
    };

    ops::jpegsave_with_opts(image, output_path, &opts)
        .map_err(|e| OptimizerError::encode(format!("JPEG save failed: {e}")))
}

/// Saves `image` as lossless PNG with a zlib level derived from `quality`.
pub fn save_png(image: &VipsImage, output_path: &str, quality: u8) -> OptimizerResult<()> {
    let opts = ops::PngsaveOptions {
        compression: i32::from(png_compression_level(quality)),
        palette: false,
        effort: PNG_EFFORT,
        keep: ForeignKeep::None,
        ..ops::PngsaveOptions::default()
    };

    ops::pngsave_with_opts(image, output_path, &opts)
        .map_err(|e| OptimizerError::encode(format!("PNG save failed: {e}")))
}

/// Saves `image` as lossy WebP.
pub fn save_webp(image: &VipsImage, output_path: &str, quality: u8) -> OptimizerResult<()> {
    let q = i32::from(quality);
    let opts = ops::WebpsaveOptions {
        q,
        lossless: false,
        alpha_q: q, // alpha quality matches overall quality
        effort: WEBP_EFFORT,
        keep: ForeignKeep::None,
        ..ops::WebpsaveOptions::default()
    };

    ops::webpsave_with_opts(image, output_path, &opts)
        .map_err(|e| OptimizerError::encode(format!("WebP save failed: {e}")))
}

/// Dispatches to the correct format save function based on `format`.
pub fn save_image_as(
    image: &VipsImage,
    output_path: &str,
    format: ImageFormat,
    quality: u8,
) -> OptimizerResult<()> {
    let quality = quality.clamp(1, 100);
    match format {
        ImageFormat::JPEG => save_jpeg(image, output_path, quality),
        ImageFormat::PNG => save_png(image, output_path, quality),
        ImageFormat::WebP => save_webp(image, output_path, quality),
        other => Err(OptimizerError::format(format!("Unsupported output format: {other:?}"))),
    }
}
