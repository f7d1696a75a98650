use frame_scope_common::frame::Frame;
use image::{GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::map::map_colors2;
use tracing::debug;

use super::TransformError;

/// Result of one motion comparison: the binary change mask and the share of
/// pixels that moved.
#[derive(Debug)]
pub struct MotionMap {
    pub mask: GrayImage,
    /// Fraction of pixels over the diff threshold, 0.0..=1.0.
    pub changed_ratio: f64,
}

impl MotionMap {
    fn none(width: u32, height: u32) -> Self {
        Self {
            mask: GrayImage::new(width, height),
            changed_ratio: 0.0,
        }
    }
}

/// Frame-differencing motion detector.
///
/// Keeps exactly one previous grayscale frame; all mutation of that slot
/// happens here. The first frame after construction, a reset, or a
/// resolution change establishes the baseline and reports no motion.
#[derive(Debug)]
pub struct MotionDetector {
    threshold: u8,
    previous: Option<GrayImage>,
}

impl MotionDetector {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            previous: None,
        }
    }

    /// Absolute per-pixel difference against the stored previous frame,
    /// thresholded to a binary map. The current frame replaces the slot
    /// afterwards, so there is never more than one frame of history.
    pub fn detect(&mut self, frame: &Frame) -> Result<MotionMap, TransformError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(TransformError::EmptyInput {
                width: frame.width(),
                height: frame.height(),
            });
        }
        let current = frame.to_luma();

        let prev = match self.previous.take() {
            Some(p) if p.dimensions() == current.dimensions() => p,
            Some(p) => {
                debug!(
                    prev_w = p.width(),
                    prev_h = p.height(),
                    w = current.width(),
                    h = current.height(),
                    "frame size changed, restarting motion baseline"
                );
                self.previous = Some(current);
                return Ok(MotionMap::none(frame.width(), frame.height()));
            }
            None => {
                debug!(seq = frame.seq, "no previous frame, storing baseline");
                self.previous = Some(current);
                return Ok(MotionMap::none(frame.width(), frame.height()));
            }
        };

        let diff = map_colors2(&prev, &current, |p, c| Luma([p.0[0].abs_diff(c.0[0])]));
        let mask = threshold(&diff, self.threshold, ThresholdType::Binary);
        let moved = mask.pixels().filter(|p| p.0[0] > 0).count();
        let changed_ratio = moved as f64 / f64::from(mask.width() * mask.height());

        self.previous = Some(current);
        Ok(MotionMap {
            mask,
            changed_ratio,
        })
    }

    /// Drop the stored baseline; the next frame starts cold.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
