//! Convolution resampling via `fast_image_resize`.

use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, Rgba};
use crate::core::Dimensions;
use crate::utils::{OptimizerError, OptimizerResult};

/// Resizes to exactly `target`, keeping an alpha channel only if the source has one.
///
/// Alpha is premultiplied during filtering so transparent edges do not bleed.
pub fn resize_exact(image: &DynamicImage, target: Dimensions, filter: fr::FilterType) -> OptimizerResult<DynamicImage> {
    let (width, height) = image.dimensions();
    let source = Dimensions::new(width, height);

    if image.color().has_alpha() {
        let pixels = resize_raw(image.to_rgba8().into_raw(), source, target, fr::PixelType::U8x4, filter)?;
        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target.width, target.height, pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| OptimizerError::resize("Resampled RGBA buffer has the wrong length"))
    } else {
        let pixels = resize_raw(image.to_rgb8().into_raw(), source, target, fr::PixelType::U8x3, filter)?;
        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(target.width, target.height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| OptimizerError::resize("Resampled RGB buffer has the wrong length"))
    }
}

fn resize_raw(
    pixels: Vec<u8>,
    source: Dimensions,
    target: Dimensions,
    pixel_type: fr::PixelType,
    filter: fr::FilterType,
) -> OptimizerResult<Vec<u8>> {
    let src_image = fr::images::Image::from_vec_u8(source.width, source.height, pixels, pixel_type)
        .map_err(|e| OptimizerError::resize(format!("Cannot wrap {source} source buffer: {e}")))?;

    let mut dst_image = fr::images::Image::new(target.width, target.height, pixel_type);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(filter));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| OptimizerError::resize(format!("Resampling {source} → {target} failed: {e}")))?;

    Ok(dst_image.into_vec())
}
