use std::io::Cursor;

use image::{GrayImage, ImageReader, RgbImage};

/// A decoded camera frame with capture metadata.
///
/// Pixels are an owned RGB buffer. A frame is valid only within the pipeline
/// tick that produced it; the motion detector keeps its own grayscale copy
/// of the last frame it processed.
#[derive(Debug, Clone)]
pub struct Frame {
    pub pixels: RgbImage,
    /// Monotonic sequence number assigned by the source.
    pub seq: u64,
    /// Capture timestamp, Unix millis.
    pub captured_at_ms: i64,
}

impl Frame {
    pub fn new(pixels: RgbImage, seq: u64, captured_at_ms: i64) -> Self {
        Self {
            pixels,
            seq,
            captured_at_ms,
        }
    }

    /// Decode a JPEG payload into a frame.
    pub fn from_jpeg(jpeg_data: &[u8], seq: u64, captured_at_ms: i64) -> Result<Self, FrameError> {
        let img = ImageReader::new(Cursor::new(jpeg_data))
            .with_guessed_format()
            .map_err(|e| FrameError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| FrameError::Decode(e.to_string()))?;
        let pixels = img.to_rgb8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(FrameError::Empty {
                width: pixels.width(),
                height: pixels.height(),
            });
        }
        Ok(Self {
            pixels,
            seq,
            captured_at_ms,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Grayscale copy of the pixels, converted on demand.
    pub fn to_luma(&self) -> GrayImage {
        image::imageops::grayscale(&self.pixels)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("failed to decode frame: {0}")]
    Decode(String),
    #[error("empty frame ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn encode_jpeg(img: &RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decode_jpeg_roundtrip() {
        let img = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        let frame = Frame::from_jpeg(&encode_jpeg(&img), 3, 1_700_000_000_000).unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert_eq!(frame.seq, 3);
        assert_eq!(frame.captured_at_ms, 1_700_000_000_000);
    }

    #[test]
    fn decode_garbage_fails() {
        let result = Frame::from_jpeg(b"not a jpeg at all", 0, 0);
        assert!(matches!(result, Err(FrameError::Decode(_))));
    }

    #[test]
    fn luma_matches_dimensions() {
        let img = RgbImage::from_pixel(16, 9, Rgb([200, 100, 50]));
        let frame = Frame::new(img, 0, 0);
        let gray = frame.to_luma();
        assert_eq!(gray.dimensions(), (16, 9));
    }
}
