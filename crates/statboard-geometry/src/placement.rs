//! Overlay placement.
//!
//! Two modes: click overlays are centered under a fixed anchor and clamped to
//! their container; hover tooltips follow the pointer and flip away from the
//! viewport edges once their rendered size is known.

use crate::rect::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Where an anchored overlay goes, relative to its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPosition {
    pub top: f32,
    pub left: f32,
    /// Distance from the overlay's left edge to the anchor's horizontal center.
    pub connector_offset: f32,
}

/// Place an overlay of `overlay_width` (plus `side_padding` on each side)
/// below `anchor`.
///
/// The overlay is centered on the anchor unless that would overflow the
/// container's right edge, in which case it is right-aligned to the container.
/// A negative result is clamped to 0; when the container is narrower than the
/// overlay the overflow is accepted. The overlay never flips above the anchor.
pub fn compute_position(
    anchor: Rect,
    container: Rect,
    overlay_width: f32,
    side_padding: f32,
    vertical_offset: f32,
) -> OverlayPosition {
    let total_width = overlay_width + 2.0 * side_padding;
    let center = anchor.center_x();

    let mut left = if center + total_width / 2.0 > container.right() {
        container.width - total_width
    } else {
        center - total_width / 2.0
    };
    if left < 0.0 {
        left = 0.0;
    }

    OverlayPosition {
        top: anchor.bottom() + vertical_offset,
        left,
        connector_offset: center - left,
    }
}

/// Place a tooltip plate of measured size `plate` next to the pointer.
///
/// Below the pointer by `cursor_gap` unless it would reach the bottom of the
/// viewport, then above it. At the pointer's x unless it would reach the right
/// edge, then to its left.
pub fn place_near_pointer(pointer: Point, plate: Size, viewport: Size, cursor_gap: f32) -> Point {
    let y = if pointer.y + plate.height + cursor_gap >= viewport.height {
        pointer.y - plate.height - cursor_gap
    } else {
        pointer.y + cursor_gap
    };

    let x = if pointer.x + plate.width >= viewport.width {
        pointer.x - plate.width
    } else {
        pointer.x
    };

    Point::new(x, y)
}
