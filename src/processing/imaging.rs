//! Backends for the standard (format-preserving) path.
//!
//! A backend opens a file with format auto-detection, shrinks to a width
//! without upscaling, and saves in a chosen format and quality.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, GenericImageView, ImageReader};

use crate::core::Dimensions;
use crate::utils::{ImageFormat, OptimizerError, OptimizerResult, png_compression_level};
use super::dimensions::fit_width;
use super::resample::resize_exact;

/// A decode/resize/encode abstraction for the standard path.
pub trait Imaging: Send + Sync {
    type Image;

    /// Decodes `path`, detecting the format from its contents.
    fn open(&self, path: &Path) -> OptimizerResult<Self::Image>;

    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Shrinks to `max_width` keeping the aspect ratio. Never enlarges.
    fn scale_down(&self, image: Self::Image, max_width: u32) -> OptimizerResult<Self::Image>;

    /// Encodes `image` as `format` into `path`, replacing its contents.
    fn save(&self, image: &Self::Image, path: &Path, format: ImageFormat, quality: u8) -> OptimizerResult<()>;
}

/// Pure-Rust backend on `image`, `fast_image_resize` and `webp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardImaging;

impl Imaging for StandardImaging {
    type Image = DynamicImage;

    fn open(&self, path: &Path) -> OptimizerResult<DynamicImage> {
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| OptimizerError::decode(format!("Failed to load '{}': {}", path.display(), e)))?;
        Ok(image)
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        let (width, height) = image.dimensions();
        Dimensions::new(width, height)
    }

    fn scale_down(&self, image: DynamicImage, max_width: u32) -> OptimizerResult<DynamicImage> {
        let source = self.dimensions(&image);
        let target = fit_width(source, max_width);
        if target == source {
            return Ok(image);
        }
        resize_exact(&image, target, fr::FilterType::Lanczos3)
    }

    fn save(&self, image: &DynamicImage, path: &Path, format: ImageFormat, quality: u8) -> OptimizerResult<()> {
        let quality = quality.clamp(1, 100);
        let mut writer = BufWriter::new(File::create(path)?);

        match format {
            ImageFormat::JPEG => {
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut writer, quality)
                    .encode_image(&rgb)
                    .map_err(|e| OptimizerError::encode(format!("JPEG save failed: {e}")))?;
            }
            ImageFormat::PNG => {
                let encoder = PngEncoder::new_with_quality(
                    &mut writer,
                    png_compression(png_compression_level(quality)),
                    PngFilter::Adaptive,
                );
                image
                    .write_with_encoder(encoder)
                    .map_err(|e| OptimizerError::encode(format!("PNG save failed: {e}")))?;
            }
            ImageFormat::WebP => {
                let bytes = encode_webp(image, quality)?;
                writer.write_all(&bytes)?;
            }
            other => {
                return Err(OptimizerError::format(format!("Unsupported output format: {other:?}")));
            }
        }

        writer.flush()?;
        Ok(())
    }
}

/// Buckets a zlib level onto the encoder's presets.
fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Lossy WebP; `image`'s own encoder is lossless-only.
fn encode_webp(image: &DynamicImage, quality: u8) -> OptimizerResult<Vec<u8>> {
    let image = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    };

    let encoder = webp::Encoder::from_image(&image)
        .map_err(|e| OptimizerError::encode(format!("WebP save failed: {e}")))?;
    Ok(encoder.encode(f32::from(quality)).to_vec())
}
