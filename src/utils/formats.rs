use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::OptimizerError;

/// Image formats the pipeline knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    WebP,
    GIF,
    BMP,
}

impl ImageFormat {
    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::JPEG => &["jpg", "jpeg"],
            Self::PNG => &["png"],
            Self::WebP => &["webp"],
            Self::GIF => &["gif"],
            Self::BMP => &["bmp"],
        }
    }

    /// Get the primary extension for this format
    pub fn primary_extension(&self) -> &str {
        self.extensions()[0]
    }

    /// Formats the standard path re-encodes in place.
    pub fn is_standard_input(&self) -> bool {
        matches!(self, Self::JPEG | Self::PNG | Self::WebP)
    }

    /// Formats the raster path can decode. Output is always JPEG.
    pub fn is_raster_input(&self) -> bool {
        matches!(self, Self::JPEG | Self::PNG | Self::WebP | Self::GIF | Self::BMP)
    }

    /// The matching decoder in the `image` crate.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::JPEG => image::ImageFormat::Jpeg,
            Self::PNG => image::ImageFormat::Png,
            Self::WebP => image::ImageFormat::WebP,
            Self::GIF => image::ImageFormat::Gif,
            Self::BMP => image::ImageFormat::Bmp,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = OptimizerError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            "webp" => Ok(Self::WebP),
            "gif" => Ok(Self::GIF),
            "bmp" => Ok(Self::BMP),
            _ => Err(OptimizerError::format(format!(
                "Unsupported image format: {}", ext
            ))),
        }
    }
}

/// Maps a PNG "quality" onto a zlib compression level (0-9).
///
/// Higher quality means less compression effort: 100 → 0, 0 → 9.
pub fn png_compression_level(quality: u8) -> u8 {
    let quality = u32::from(quality.min(100));
    (((100 - quality) * 9 + 50) / 100) as u8
}
