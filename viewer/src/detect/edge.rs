use frame_scope_common::frame::Frame;
use image::{GrayImage, RgbImage};
use imageproc::edges::canny;

use super::TransformError;

/// Canny boundary extraction over a full frame or an ROI window.
///
/// Stateless: the output is purely a function of the input. Thresholds are
/// fixed at construction; the configured defaults (50/150) suit typical
/// indoor lighting.
#[derive(Debug, Clone, Copy)]
pub struct EdgeDetector {
    low: f32,
    high: f32,
}

impl EdgeDetector {
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// Binary edge map of the whole frame.
    pub fn detect(&self, frame: &Frame) -> Result<GrayImage, TransformError> {
        self.detect_region(&frame.pixels)
    }

    /// Binary edge map of a standalone region (used by ROI mode).
    pub fn detect_region(&self, region: &RgbImage) -> Result<GrayImage, TransformError> {
        if region.width() == 0 || region.height() == 0 {
            return Err(TransformError::EmptyInput {
                width: region.width(),
                height: region.height(),
            });
        }
        let gray = image::imageops::grayscale(region);
        Ok(canny(&gray, self.low, self.high))
    }
}
