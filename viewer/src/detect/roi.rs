use frame_scope_common::frame::Frame;
use image::RgbImage;

/// Smallest frame worth windowing.
const MIN_DIM: u32 = 2;

/// The centered half-size window of a frame, with its top-left offset in
/// frame coordinates so processed output can be composited back in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiRegion {
    pub pixels: RgbImage,
    pub offset: (u32, u32),
}

/// Extract the centered window spanning `w/4..3w/4` by `h/4..3h/4`.
///
/// Returns `None` when the frame is below 2x2, signaling the caller to skip
/// the tick. Bounds are recomputed from the live frame every call, so a
/// mid-stream resolution change cannot produce an out-of-range crop.
pub fn extract(frame: &Frame) -> Option<RoiRegion> {
    let (w, h) = (frame.width(), frame.height());
    if w < MIN_DIM || h < MIN_DIM {
        return None;
    }
    let x0 = w / 4;
    let y0 = h / 4;
    let rw = 3 * w / 4 - x0;
    let rh = 3 * h / 4 - y0;
    let pixels = image::imageops::crop_imm(&frame.pixels, x0, y0, rw, rh).to_image();
    Some(RoiRegion {
        pixels,
        offset: (x0, y0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn frame(w: u32, h: u32) -> Frame {
        Frame::new(RgbImage::new(w, h), 0, 0)
    }

    #[test]
    fn even_dimensions_halve_exactly() {
        let region = extract(&frame(640, 480)).unwrap();
        assert_eq!(region.pixels.dimensions(), (320, 240));
        assert_eq!(region.offset, (160, 120));
    }

    #[test]
    fn odd_dimensions_follow_the_quarter_bounds() {
        for w in 2..40u32 {
            for h in 2..40u32 {
                let region = extract(&frame(w, h)).unwrap();
                assert_eq!(
                    region.pixels.dimensions(),
                    (3 * w / 4 - w / 4, 3 * h / 4 - h / 4),
                    "{w}x{h}"
                );
                assert_eq!(region.offset, (w / 4, h / 4));
            }
        }
    }

    #[test]
    fn tiny_frames_are_rejected() {
        assert!(extract(&frame(1, 1)).is_none());
        assert!(extract(&frame(1, 100)).is_none());
        assert!(extract(&frame(100, 1)).is_none());
        assert!(extract(&frame(2, 2)).is_some());
    }

    #[test]
    fn window_content_matches_the_source() {
        let pixels = RgbImage::from_fn(8, 8, |x, y| Rgb([x as u8, y as u8, 0]));
        let region = extract(&Frame::new(pixels, 0, 0)).unwrap();
        assert_eq!(region.offset, (2, 2));
        assert_eq!(region.pixels.dimensions(), (4, 4));
        // Top-left of the window is source pixel (2, 2).
        assert_eq!(region.pixels.get_pixel(0, 0).0, [2, 2, 0]);
        assert_eq!(region.pixels.get_pixel(3, 3).0, [5, 5, 0]);
    }
}
