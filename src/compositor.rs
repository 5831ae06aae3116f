// Canvas-over-camera compositing.
//
// Hard threshold instead of alpha: any canvas pixel brighter than the cutoff
// replaces the camera pixel; everything else lets the camera through. Black is
// both "never drawn" and "erased", so erasing reads as transparent.

use crate::error::Error;
use crate::types::FrameBuffer;

/// BT.601 luma with the same 14-bit fixed-point weights OpenCV uses.
#[inline]
pub fn luma(px: u32) -> u8 {
    let r = (px >> 16) & 0xFF;
    let g = (px >> 8) & 0xFF;
    let b = px & 0xFF;
    ((r * 4899 + g * 9617 + b * 1868 + (1 << 13)) >> 14) as u8
}

/// White where the canvas has no content, black where it does.
#[inline]
fn inverse_mask(canvas_px: u32, threshold: u8) -> u32 {
    if luma(canvas_px) > threshold { 0x0000_0000 } else { 0x00FF_FFFF }
}

/// Composite `canvas` over `frame` in place: `(frame & !content) | canvas`.
pub fn composite_in_place(frame: &mut FrameBuffer, canvas: &FrameBuffer, threshold: u8) -> Result<(), Error> {
    if !frame.same_size(canvas) {
        return Err(Error::FrameSize {
            expected: (canvas.width, canvas.height),
            actual: (frame.width, frame.height),
        });
    }
    for (out, &c) in frame.pixels.iter_mut().zip(&canvas.pixels) {
        *out = (*out & inverse_mask(c, threshold)) | c;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn noise(width: usize, height: usize) -> FrameBuffer {
        let pixels = (0..width * height).map(|i| (i as u32).wrapping_mul(2_654_435_761) & 0x00FF_FFFF).collect();
        FrameBuffer { width, height, pixels }
    }

    #[test]
    fn empty_canvas_leaves_frame_unchanged() {
        let original = noise(32, 24);
        let mut frame = original.clone();
        composite_in_place(&mut frame, &FrameBuffer::blank(32, 24), 50).unwrap();
        assert_eq!(frame, original);
    }

    #[test]
    fn bright_canvas_pixels_replace_camera() {
        let mut frame = FrameBuffer::filled(2, 1, Color::new(10, 200, 30));
        let mut canvas = FrameBuffer::blank(2, 1);
        canvas.pixels[0] = Color::new(245, 225, 47).packed();
        composite_in_place(&mut frame, &canvas, 50).unwrap();
        assert_eq!(frame.pixels[0], Color::new(245, 225, 47).packed());
        assert_eq!(frame.pixels[1], Color::new(10, 200, 30).packed());
    }

    #[test]
    fn dark_canvas_pixels_are_ored_not_replaced() {
        // luma(0,0,100) is 11, under the cutoff: camera is kept and bits are merged
        let mut frame = FrameBuffer::filled(1, 1, Color::new(0x80, 0x80, 0x01));
        let canvas = FrameBuffer::filled(1, 1, Color::new(0, 0, 100));
        composite_in_place(&mut frame, &canvas, 50).unwrap();
        assert_eq!(frame.pixels[0], Color::new(0x80, 0x80, 0x01 | 100).packed());
    }

    #[test]
    fn luma_matches_reference_weights() {
        assert_eq!(luma(Color::WHITE.packed()), 255);
        assert_eq!(luma(0), 0);
        assert_eq!(luma(Color::new(255, 0, 0).packed()), 76);
        assert_eq!(luma(Color::new(0, 255, 0).packed()), 150);
        assert_eq!(luma(Color::new(0, 0, 255).packed()), 29);
    }

    #[test]
    fn threshold_is_exclusive() {
        // grey 50 sits exactly on the cutoff and does not count as content
        let mut frame = FrameBuffer::filled(1, 1, Color::new(200, 0, 0));
        let canvas = FrameBuffer::filled(1, 1, Color::new(50, 50, 50));
        composite_in_place(&mut frame, &canvas, 50).unwrap();
        assert_eq!(frame.pixels[0], Color::new(200 | 50, 50, 50).packed());

        let mut frame = FrameBuffer::filled(1, 1, Color::new(200, 0, 0));
        let canvas = FrameBuffer::filled(1, 1, Color::new(51, 51, 51));
        composite_in_place(&mut frame, &canvas, 50).unwrap();
        assert_eq!(frame.pixels[0], Color::new(51, 51, 51).packed());
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut frame = FrameBuffer::blank(4, 4);
        let err = composite_in_place(&mut frame, &FrameBuffer::blank(2, 2), 50).unwrap_err();
        assert!(matches!(err, Error::FrameSize { expected: (2, 2), actual: (4, 4) }));
    }
}
