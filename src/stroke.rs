// Pen memory and incremental stroke rendering.
//
// Each PAINT tick commits one straight segment from the previous fingertip to
// the current one, on the live frame and on the persistent canvas alike.

use crate::config::PainterConfig;
use crate::draw::{draw_thick_line, fill_circle};
use crate::gesture::ToolState;
use crate::types::{FrameBuffer, Point};

/// Last fingertip position, or unset when the next stroke must start fresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PenMemory(Option<Point>);

impl PenMemory {
    pub fn unset() -> Self {
        Self(None)
    }

    #[cfg(test)]
    pub fn last(self) -> Option<Point> {
        self.0
    }

    #[cfg(test)]
    pub fn is_unset(self) -> bool {
        self.0.is_none()
    }

    pub fn set(&mut self, p: Point) {
        self.0 = Some(p);
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }

    /// Segment start for a stroke ending at `current`; an unset pen starts in place.
    pub fn segment_start(self, current: Point) -> Point {
        self.0.unwrap_or(current)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrokeStyle {
    pub brush_thickness: u32,
    pub eraser_thickness: u32,
    pub cursor_radius: u32,
}

impl StrokeStyle {
    pub fn from_config(config: &PainterConfig) -> Self {
        Self {
            brush_thickness: config.brush_thickness,
            eraser_thickness: config.eraser_thickness,
            cursor_radius: config.cursor_radius,
        }
    }

    pub fn thickness_for(&self, tool: &ToolState) -> u32 {
        if tool.is_eraser() { self.eraser_thickness } else { self.brush_thickness }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::from_config(&PainterConfig::default())
    }
}

/// Draw the cursor and one stroke segment, then advance the pen to `current`.
pub fn paint(
    frame: &mut FrameBuffer,
    canvas: &mut FrameBuffer,
    pen: &mut PenMemory,
    current: Point,
    tool: &ToolState,
    style: &StrokeStyle,
) {
    fill_circle(frame, current, style.cursor_radius, tool.color);

    let start = pen.segment_start(current);
    let thickness = style.thickness_for(tool);
    draw_thick_line(frame, start, current, thickness, tool.color);
    draw_thick_line(canvas, start, current, thickness, tool.color);

    pen.set(current);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    const PINK: Color = Color::new(245, 47, 197);

    fn pink() -> ToolState {
        ToolState::new(PINK, 2)
    }

    fn eraser() -> ToolState {
        ToolState::new(Color::BLACK, 4)
    }

    #[test]
    fn segment_spans_previous_to_current_at_brush_thickness() {
        let mut frame = FrameBuffer::blank(400, 400);
        let mut canvas = FrameBuffer::blank(400, 400);
        let mut pen = PenMemory::unset();
        pen.set(Point::new(100, 300));

        paint(&mut frame, &mut canvas, &mut pen, Point::new(150, 300), &pink(), &StrokeStyle::default());

        for x in 100..=150 {
            assert_eq!(canvas.get(x, 300), Some(PINK.packed()), "x={x}");
        }
        assert_eq!(canvas.get(125, 307), Some(PINK.packed()));
        assert_eq!(canvas.get(125, 308), Some(0));
        assert_eq!(pen.last(), Some(Point::new(150, 300)));
    }

    #[test]
    fn eraser_uses_eraser_thickness() {
        let mut frame = FrameBuffer::blank(400, 400);
        let mut canvas = FrameBuffer::filled(400, 400, PINK);
        let mut pen = PenMemory::unset();
        pen.set(Point::new(100, 300));

        paint(&mut frame, &mut canvas, &mut pen, Point::new(150, 300), &eraser(), &StrokeStyle::default());

        assert_eq!(canvas.get(125, 349), Some(0));
        assert_eq!(canvas.get(125, 351), Some(PINK.packed()));
    }

    #[test]
    fn unset_pen_starts_in_place_instead_of_from_origin() {
        let mut frame = FrameBuffer::blank(400, 400);
        let mut canvas = FrameBuffer::blank(400, 400);
        let mut pen = PenMemory::unset();

        paint(&mut frame, &mut canvas, &mut pen, Point::new(200, 200), &pink(), &StrokeStyle::default());

        assert_eq!(canvas.get(200, 200), Some(PINK.packed()));
        assert_eq!(canvas.get(100, 100), Some(0));
        assert_eq!(canvas.get(0, 0), Some(0));
    }

    #[test]
    fn cursor_lands_on_frame_only() {
        let mut frame = FrameBuffer::blank(400, 400);
        let mut canvas = FrameBuffer::blank(400, 400);
        let mut pen = PenMemory::unset();

        paint(&mut frame, &mut canvas, &mut pen, Point::new(200, 200), &pink(), &StrokeStyle::default());

        // within cursor radius 15 but outside the 15px dot of a zero-length stroke
        assert_eq!(frame.get(212, 200), Some(PINK.packed()));
        assert_eq!(canvas.get(212, 200), Some(0));
    }

    #[test]
    fn pen_memory_reset_and_start() {
        let mut pen = PenMemory::default();
        assert!(pen.is_unset());
        pen.set(Point::new(3, 4));
        assert_eq!(pen.segment_start(Point::new(9, 9)), Point::new(3, 4));
        pen.reset();
        assert_eq!(pen.segment_start(Point::new(9, 9)), Point::new(9, 9));
    }
}
