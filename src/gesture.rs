// Gesture mode resolution.
//
// Index + middle up selects, index alone paints, anything else idles. Mode is
// recomputed every frame with no debounce, so a single misclassified frame
// shows up as a single-frame mode change.

use std::fmt;

use crate::fingers::FingerStates;
use crate::palette::PaletteLayout;
use crate::types::{Color, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawingMode {
    Idle,
    Select,
    Paint,
}

impl DrawingMode {
    pub fn label(self) -> &'static str {
        match self {
            DrawingMode::Idle => "IDLE MODE",
            DrawingMode::Select => "SELECT MODE",
            DrawingMode::Paint => "PAINT MODE",
        }
    }
}

impl fmt::Display for DrawingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current colour and which swatch's overlay the header shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolState {
    pub color: Color,
    pub swatch: usize,
}

impl ToolState {
    pub fn new(color: Color, swatch: usize) -> Self {
        Self { color, swatch }
    }

    /// Eraser is not a separate tool: it is painting with the sentinel colour.
    pub fn is_eraser(&self) -> bool {
        self.color == Color::BLACK
    }
}

/// Outcome of one resolution: the mode and the tool state to carry forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub mode: DrawingMode,
    pub tool: ToolState,
}

/// Pure: same inputs, same mode and tool transition.
///
/// In SELECT mode a hit on a palette region switches to that swatch; outside
/// the header band, or between regions, the tool is left alone.
pub fn resolve(fingers: FingerStates, index_tip: Point, layout: &PaletteLayout, tool: ToolState) -> Resolution {
    if fingers.index() && fingers.middle() {
        let tool = match layout.hit(index_tip) {
            Some(swatch) => ToolState::new(layout.colors[swatch], swatch),
            None => tool,
        };
        return Resolution { mode: DrawingMode::Select, tool };
    }
    if fingers.index() {
        return Resolution { mode: DrawingMode::Paint, tool };
    }
    Resolution { mode: DrawingMode::Idle, tool }
}
