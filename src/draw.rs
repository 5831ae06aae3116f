// Window + software drawing utilities.
// Provided here:
// 1) A window that shows the composited frame.
// 2) Raster primitives used by strokes, cursors and the landmark skeleton.
// 3) A tiny 5x7 bitmap font for the HUD.

use crate::error::Error;
use crate::types::{Color, FrameBuffer, Point};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

/// Where finished frames go.
pub trait FrameSink {
    /// False once the viewer is gone or asked to quit.
    fn is_open(&self) -> bool;
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error>;
}

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Create a resizable window sized to the display frame.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Esc or `q`.
    fn quit_requested(&self) -> bool {
        self.window.is_key_down(Key::Escape) || self.window.is_key_pressed(Key::Q, KeyRepeat::No)
    }
}

impl FrameSink for Drawer {
    /// False when the user closes the window or presses a quit key.
    fn is_open(&self) -> bool {
        self.window.is_open() && !self.quit_requested()
    }

    /// Push the pixels for this frame to the screen.
    fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }
}

/* ---------- Software drawing: pixels, lines, discs ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Thin 1-pixel line between two points using Bresenham.
pub fn draw_line(fb: &mut FrameBuffer, from: Point, to: Point, color: Color) {
    let color = color.packed();
    let (mut x0, mut y0, x1, y1) = (from.x, from.y, to.x, to.y);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Line of the given total width with round caps: every pixel whose centre lies
/// within `thickness / 2` of the segment is set. A zero-length segment is a disc.
pub fn draw_thick_line(fb: &mut FrameBuffer, from: Point, to: Point, thickness: u32, color: Color) {
    if thickness <= 1 {
        draw_line(fb, from, to, color);
        return;
    }
    let packed = color.packed();
    let half = thickness as f32 / 2.0;
    let half_sq = half * half;
    let reach = half.ceil() as i32;

    let min_x = (from.x.min(to.x) - reach).max(0);
    let max_x = (from.x.max(to.x) + reach).min(fb.width as i32 - 1);
    let min_y = (from.y.min(to.y) - reach).max(0);
    let max_y = (from.y.max(to.y) + reach).min(fb.height as i32 - 1);
    if min_x > max_x || min_y > max_y {
        return;
    }

    let (ax, ay) = (from.x as f32, from.y as f32);
    let (dx, dy) = ((to.x - from.x) as f32, (to.y - from.y) as f32);
    let len_sq = dx * dx + dy * dy;

    for y in min_y..=max_y {
        let row = y as usize * fb.width;
        for x in min_x..=max_x {
            let (px, py) = (x as f32 - ax, y as f32 - ay);
            // Project onto the segment, then measure to the closest point.
            let t = if len_sq > 0.0 { ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
            let (ex, ey) = (px - t * dx, py - t * dy);
            if ex * ex + ey * ey <= half_sq {
                fb.pixels[row + x as usize] = packed;
            }
        }
    }
}

/// Solid disc centred on `center`.
pub fn fill_circle(fb: &mut FrameBuffer, center: Point, radius: u32, color: Color) {
    let packed = color.packed();
    let r = radius as i32;
    let r_sq = r * r;
    for y in (center.y - r)..=(center.y + r) {
        for x in (center.x - r)..=(center.x + r) {
            let (dx, dy) = (x - center.x, y - center.y);
            if dx * dx + dy * dy <= r_sq {
                put_pixel(fb, x, y, packed);
            }
        }
    }
}

/* ---------- 5x7 bitmap font (ASCII subset the HUD needs) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),

        _ => None,
    }
}

/// Draw a single glyph with its top-left at (x,y), each font pixel `scale` wide.
/// A 1-unit black shadow is drawn first for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, scale: i32, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (offset, c) in [(scale, 0x0000_0000), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) == 0 {
                    continue;
                }
                let px = x + rx * scale + offset;
                let py = y + ry as i32 * scale + offset;
                for sy in 0..scale {
                    for sx in 0..scale {
                        put_pixel(fb, px + sx, py + sy, c);
                    }
                }
            }
        }
    }
}

/// Width in pixels `text` occupies at `scale`.
pub fn text_width_5x7(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * 6 * scale
}

/// Draw a text string using 5x7 glyphs; each glyph advances 6 font pixels.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, scale: i32, color: Color) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, scale, color.packed());
        x += 6 * scale;
    }
}
