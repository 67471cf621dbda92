// Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;
use upload_image_optimizer::{LocalUpload, OptimizerSettings};

/// Input and scratch directories kept apart so leftover temp files are countable.
pub struct Workspace {
    pub inputs: TempDir,
    pub scratch: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            inputs: tempfile::tempdir().unwrap(),
            scratch: tempfile::tempdir().unwrap(),
        }
    }

    /// Default settings writing into this workspace's scratch dir.
    pub fn settings(&self) -> OptimizerSettings {
        OptimizerSettings {
            temp_dir: Some(self.scratch.path().to_path_buf()),
            ..OptimizerSettings::default()
        }
    }

    pub fn scratch_files(&self) -> usize {
        std::fs::read_dir(self.scratch.path()).unwrap().count()
    }

    pub fn write_image(&self, name: &str, image: &DynamicImage, format: ImageFormat) -> PathBuf {
        let path = self.inputs.path().join(name);
        image.save_with_format(&path, format).unwrap();
        path
    }

    pub fn write_bytes(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.inputs.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn upload(&self, path: &Path) -> LocalUpload {
        LocalUpload::from_path(path).unwrap()
    }
}

/// High-entropy RGB noise; compresses badly on purpose.
pub fn noise(width: u32, height: u32, seed: u64) -> DynamicImage {
    let mut state = seed | 1;
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let v = state.to_le_bytes();
        Rgb([v[0], v[3], v[6]])
    }))
}

/// Smooth gradient; compresses well.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    }))
}

/// Fully transparent except an opaque red top-left quadrant.
pub fn transparent_with_patch(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        if x < width / 2 && y < height / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    }))
}

pub fn sniff(path: &Path) -> ImageFormat {
    image::guess_format(&std::fs::read(path).unwrap()).unwrap()
}

pub fn dimensions_of(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}
