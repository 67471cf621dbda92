//! Raw raster stages of the always-JPEG path: decode by declared format,
//! flatten onto a white canvas, encode JPEG.
//!
//! Every raster here is an owned buffer, so early returns and errors release
//! it the same way the happy path does.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, RgbImage, Rgba, RgbaImage};

use crate::core::Dimensions;
use crate::utils::{ImageFormat, OptimizerError, OptimizerResult};
use super::resample::resize_exact;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Area-weighted when shrinking.
pub const RASTER_FILTER: fr::FilterType = fr::FilterType::Box;

/// Decodes `path` strictly as `format`; no content sniffing.
pub fn decode_as(path: &Path, format: ImageFormat) -> OptimizerResult<DynamicImage> {
    let file = File::open(path)?;
    image::load(BufReader::new(file), format.to_image_format()).map_err(|e| {
        OptimizerError::decode(format!("Cannot decode {} as {:?}: {}", path.display(), format, e))
    })
}

/// Resamples `source` to `target` and composites it over opaque white.
pub fn render_on_white(source: &DynamicImage, target: Dimensions) -> OptimizerResult<RgbImage> {
    if !source.color().has_alpha() {
        // Fully covers the canvas; nothing to composite.
        return Ok(resize_exact(source, target, RASTER_FILTER)?.into_rgb8());
    }

    let mut canvas = RgbaImage::from_pixel(target.width, target.height, WHITE);
    let resampled = resize_exact(source, target, RASTER_FILTER)?.into_rgba8();
    imageops::overlay(&mut canvas, &resampled, 0, 0);
    drop(resampled);
    Ok(DynamicImage::ImageRgba8(canvas).into_rgb8())
}

/// Encodes `image` as baseline JPEG at `quality` (clamped to 1-100).
pub fn write_jpeg(image: &RgbImage, writer: impl Write, quality: u8) -> OptimizerResult<()> {
    let mut writer = BufWriter::new(writer);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
        encoder
            .encode_image(image)
            .map_err(|e| OptimizerError::encode(format!("JPEG encode failed: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| OptimizerError::encode(format!("JPEG flush failed: {e}")))
}
