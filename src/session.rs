// One painting session: canvas, tool and pen memory, advanced one tick at a time.
//
// Nothing here is global. Every viewer that needs its own drawing gets its own
// `Session`; they never share state.

use log::debug;

use crate::compositor::composite_in_place;
use crate::config::PainterConfig;
use crate::draw::draw_thick_line;
use crate::error::Error;
use crate::fingers::classify;
use crate::gesture::{DrawingMode, ToolState, resolve};
use crate::hud::draw_mode;
use crate::landmarks::{HandLandmarks, LandmarkSource};
use crate::palette::Palette;
use crate::stroke::{PenMemory, StrokeStyle, paint};
use crate::types::FrameBuffer;
use crate::vision::{blit_top, mirror_in_place, resize_nearest};

/// What happened during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// `None` when no hand was detected.
    pub mode: Option<DrawingMode>,
}

pub struct Session {
    width: usize,
    height: usize,
    mirror: bool,
    palette: Palette,
    style: StrokeStyle,
    select_line_thickness: u32,
    canvas_threshold: u8,
    tool: ToolState,
    pen: PenMemory,
    canvas: FrameBuffer,
}

impl Session {
    /// Fresh session at `width` x `height` with an empty canvas.
    pub fn new(config: &PainterConfig, palette: Palette, width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            mirror: config.mirror,
            palette,
            style: StrokeStyle::from_config(config),
            select_line_thickness: config.select_line_thickness,
            canvas_threshold: config.canvas_threshold,
            tool: ToolState::new(config.default_color(), 0),
            pen: PenMemory::unset(),
            canvas: FrameBuffer::blank(width, height),
        }
    }

    #[cfg(test)]
    pub fn canvas(&self) -> &FrameBuffer {
        &self.canvas
    }

    #[cfg(test)]
    pub fn tool(&self) -> ToolState {
        self.tool
    }

    #[cfg(test)]
    pub fn pen(&self) -> PenMemory {
        self.pen
    }

    /// Camera frame in, composited frame out: mirror, fit to the session size,
    /// lay the header, detect, optionally draw the skeleton, then [`Session::tick`].
    pub fn process_frame(
        &mut self,
        raw: FrameBuffer,
        detector: &mut dyn LandmarkSource,
        show_landmarks: bool,
    ) -> Result<(FrameBuffer, TickReport), Error> {
        let mut frame = raw;
        if self.mirror {
            mirror_in_place(&mut frame);
        }
        let mut frame = resize_nearest(frame, self.width, self.height);
        self.apply_header(&mut frame);

        let hands = detector.detect(&frame)?;
        if show_landmarks {
            detector.draw_debug(&mut frame, &hands);
        }

        let report = self.tick(&mut frame, &hands)?;
        Ok((frame, report))
    }

    /// Show the selected swatch's overlay in the header band.
    pub fn apply_header(&self, frame: &mut FrameBuffer) {
        blit_top(frame, self.palette.overlay(self.tool.swatch));
    }

    /// Advance one tick. Only the first hand is used.
    ///
    /// Pen memory: PAINT moves it to the fingertip after drawing, SELECT and
    /// "no hand" unset it, and any other hand pose still records the fingertip.
    /// The mode label goes on before compositing, so strokes cover it.
    pub fn tick(&mut self, frame: &mut FrameBuffer, hands: &[HandLandmarks]) -> Result<TickReport, Error> {
        if frame.width != self.width || frame.height != self.height {
            return Err(Error::FrameSize {
                expected: (self.width, self.height),
                actual: (frame.width, frame.height),
            });
        }

        let mode = match hands.first() {
            None => {
                self.pen.reset();
                None
            }
            Some(hand) => {
                let mode = self.apply_hand(frame, &hand.clamped(self.width, self.height));
                draw_mode(frame, mode);
                Some(mode)
            }
        };

        composite_in_place(frame, &self.canvas, self.canvas_threshold)?;
        Ok(TickReport { mode })
    }

    fn apply_hand(&mut self, frame: &mut FrameBuffer, hand: &HandLandmarks) -> DrawingMode {
        let fingers = classify(hand);
        let index_tip = hand.index_tip();
        let resolution = resolve(fingers, index_tip, &self.palette.layout, self.tool);

        if resolution.tool != self.tool {
            debug!("tool -> swatch {} {:?}", resolution.tool.swatch, resolution.tool.color);
            self.tool = resolution.tool;
        }

        match resolution.mode {
            DrawingMode::Select => {
                draw_thick_line(frame, index_tip, hand.middle_tip(), self.select_line_thickness, self.tool.color);
                self.pen.reset();
            }
            DrawingMode::Paint => {
                paint(frame, &mut self.canvas, &mut self.pen, index_tip, &self.tool, &self.style);
            }
            DrawingMode::Idle => self.pen.set(index_tip),
        }
        resolution.mode
    }
}
