// On-screen text: mode label bottom-right, FPS bottom-left.
// Purely advisory; nothing here feeds back into drawing.
use std::time::{Duration, Instant};

use crate::draw::{draw_text_5x7, text_width_5x7};
use crate::gesture::DrawingMode;
use crate::types::{Color, FrameBuffer};

const PADDING_LEFT: i32 = 15;
const PADDING_RIGHT: i32 = 15;
const PADDING_BOTTOM: i32 = 30;
pub(crate) const MODE_COLOR: Color = Color::new(255, 255, 0);
const FPS_COLOR: Color = Color::new(255, 0, 0);

/// Text scale relative to a 640x480 base, using the smaller dimension.
pub fn text_scale(width: usize, height: usize) -> i32 {
    let factor = if height < width { height as f32 / 480.0 } else { width as f32 / 640.0 };
    ((2.0 * factor).round() as i32).max(1)
}

pub fn draw_mode(fb: &mut FrameBuffer, mode: DrawingMode) {
    let scale = text_scale(fb.width, fb.height);
    let label = mode.label();
    let width = text_width_5x7(label, scale);
    let x = fb.width as i32 - (width + 20).max(PADDING_RIGHT);
    let y = fb.height as i32 - PADDING_BOTTOM - 7 * scale;
    draw_text_5x7(fb, x, y, label, scale, MODE_COLOR);
}

pub fn draw_fps(fb: &mut FrameBuffer, fps: f32) {
    let scale = text_scale(fb.width, fb.height);
    let y = fb.height as i32 - PADDING_BOTTOM - 7 * scale;
    draw_text_5x7(fb, PADDING_LEFT, y, &format!("RENDER FPS: {fps:.1}"), scale, FPS_COLOR);
}

/// Frames-per-second averaged over roughly one second windows.
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self { window_start: now, frames: 0, fps: 0.0 }
    }

    /// Count one frame. Returns the new reading when a window closes.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_reports_once_per_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for i in 1..30 {
            assert_eq!(counter.tick(start + Duration::from_millis(i * 33)), None);
        }
        let reading = counter.tick(start + Duration::from_millis(1000)).unwrap();
        assert!((reading - 30.0).abs() < 0.01);
        assert_eq!(counter.fps(), reading);
        assert_eq!(counter.tick(start + Duration::from_millis(1010)), None);
    }

    #[test]
    fn text_scale_tracks_the_smaller_dimension() {
        assert_eq!(text_scale(640, 480), 2);
        assert_eq!(text_scale(1280, 720), 3);
        assert_eq!(text_scale(100, 100), 1);
    }

    #[test]
    fn mode_label_is_drawn_near_bottom_right() {
        let mut fb = FrameBuffer::blank(640, 480);
        draw_mode(&mut fb, DrawingMode::Paint);
        let lit = fb.pixels.iter().enumerate().filter(|&(_, &p)| p == MODE_COLOR.packed());
        for (i, _) in lit {
            assert!(i % 640 >= 320, "label should sit on the right half");
            assert!(i / 640 >= 400, "label should sit near the bottom");
        }
    }
}
