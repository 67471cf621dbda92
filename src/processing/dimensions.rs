//! Target-size arithmetic shared by both paths.

use crate::core::Dimensions;

/// Fits `original` into `max_width` without upscaling.
///
/// Height follows proportionally, rounded to the nearest pixel.
pub fn fit_width(original: Dimensions, max_width: u32) -> Dimensions {
    let max_width = max_width.max(1);
    if original.width <= max_width {
        return original;
    }

    let height = (f64::from(original.height) * f64::from(max_width) / f64::from(original.width)).round();
    Dimensions::new(max_width, (height as u32).max(1))
}

/// Scales both sides by `factor`, rounding and never collapsing below 1px.
pub fn scale(dimensions: Dimensions, factor: f64) -> Dimensions {
    let side = |v: u32| ((f64::from(v) * factor).round() as u32).max(1);
    Dimensions::new(side(dimensions.width), side(dimensions.height))
}

/// Uncompressed RGB size in bytes (3 bytes per pixel).
pub fn raw_estimate_bytes(dimensions: Dimensions) -> u64 {
    dimensions.pixels() * 3
}

/// True when the raw estimate is strictly above `limit_kb` kilobytes.
///
/// Compared in bytes so a fractional estimate such as 1500.47 KB still counts.
pub fn exceeds_raw_estimate(dimensions: Dimensions, limit_kb: u64) -> bool {
    raw_estimate_bytes(dimensions) > limit_kb.saturating_mul(1024)
}
