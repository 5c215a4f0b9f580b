//! Popup placement relative to the hovered citation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// On-screen rectangle of the hover target, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Below,
    Above,
}

/// Top-left corner of the popup and the side of the target it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub placement: Placement,
}

/// Place a popup of size `popup` next to `target` inside `viewport`.
///
/// The popup goes below the target, centred horizontally and kept `margin`
/// away from the viewport edges. When it does not fit below it flips above,
/// provided there is more room there; otherwise it stays below and is pushed
/// up to remain on screen.
pub fn compute_position(
    target: Rect,
    popup: Size,
    viewport: Size,
    gap: f64,
    margin: f64,
) -> Position {
    let left = clamp_start(
        target.center_x() - popup.width / 2.0,
        popup.width,
        viewport.width,
        margin,
    );

    let below_top = target.bottom() + gap;
    let space_below = viewport.height - margin - below_top;
    let space_above = target.y - gap - margin;

    if popup.height <= space_below || space_above <= space_below {
        let top = clamp_start(below_top, popup.height, viewport.height, margin);
        return Position {
            left,
            top,
            placement: Placement::Below,
        };
    }

    let above_top = target.y - gap - popup.height;
    Position {
        left,
        top: above_top.max(margin),
        placement: Placement::Above,
    }
}

/// Clamp a start coordinate so `[start, start + len]` stays inside `[margin, limit - margin]`.
///
/// When the popup is larger than the available space the leading margin wins.
fn clamp_start(start: f64, len: f64, limit: f64, margin: f64) -> f64 {
    let max = limit - margin - len;
    start.min(max).max(margin)
}
