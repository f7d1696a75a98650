pub mod edge;
pub mod motion;
pub mod roi;

use image::{DynamicImage, GrayImage, RgbImage};

/// A transform rejected its input; the tick is skipped and the loop
/// continues.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("empty input ({width}x{height})")]
    EmptyInput { width: u32, height: u32 },
}

/// Expand a binary map to RGB so it can share the display path with
/// unprocessed frames.
pub fn mask_to_rgb(mask: &GrayImage) -> RgbImage {
    DynamicImage::ImageLuma8(mask.clone()).to_rgb8()
}
