//! Image processing: the optimizer and the stages it is built from.

mod optimizer;
mod raster;
mod resample;
pub mod dimensions;
pub mod imaging;
#[cfg(feature = "vips")]
pub mod libvips;

pub use optimizer::ImageOptimizer;
pub use imaging::{Imaging, StandardImaging};
#[cfg(feature = "vips")]
pub use self::libvips::VipsImaging;
