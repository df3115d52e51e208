//! Context menu: per-node action list and its on-screen placement.

#[cfg(test)]
#[path = "menu_test.rs"]
mod menu_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Point, Size};
use crate::consts::MENU_ANCHOR_OFFSET_PX;
use crate::registry::NodeId;

/// The single open context menu.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextMenuState {
    pub node_id: NodeId,
    /// Long-press location in screen space.
    pub anchor: Point,
    /// Rendered menu size, reported by the host after first layout.
    pub measured_size: Option<Size>,
}

impl ContextMenuState {
    #[must_use]
    pub fn open(node_id: NodeId, anchor: Point) -> Self {
        Self { node_id, anchor, measured_size: None }
    }

    /// Top-left placement once the menu has been measured.
    #[must_use]
    pub fn placement(&self, viewport: Size, margin: f64) -> Option<Point> {
        self.measured_size.map(|size| compute_position(self.anchor, size, viewport, margin))
    }
}

/// Actions offered by the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    LayerUp,
    LayerDown,
    TogglePin,
    Remove,
}

/// One renderable menu row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub action: MenuAction,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Menu rows for a node; the pin row flips with `pinned`.
#[must_use]
pub fn menu_items(pinned: bool) -> [MenuItem; 4] {
    let (pin_label, pin_icon) = if pinned { ("Unpin", "pin-off") } else { ("Pin", "pin") };
    [
        MenuItem { action: MenuAction::LayerUp, label: "Bring forward", icon: "layer-up" },
        MenuItem { action: MenuAction::LayerDown, label: "Send backward", icon: "layer-down" },
        MenuItem { action: MenuAction::TogglePin, label: pin_label, icon: pin_icon },
        MenuItem { action: MenuAction::Remove, label: "Remove from canvas", icon: "remove" },
    ]
}

/// Top-left corner for a menu of `size` opened at `anchor`.
///
/// Vertically: just below the anchor, else flipped above it, else clamped
/// into `[margin, viewport.height - margin - size.height]`. Horizontally:
/// centered on the anchor and clamped into `[margin, viewport.width -
/// margin - size.width]`. When the menu is larger than the viewport the
/// lower bound wins.
#[must_use]
pub fn compute_position(anchor: Point, size: Size, viewport: Size, margin: f64) -> Point {
    let max_y = viewport.height - margin - size.height;
    let below = anchor.y + MENU_ANCHOR_OFFSET_PX;
    let y = if below + size.height <= viewport.height - margin {
        below
    } else {
        let above = anchor.y - MENU_ANCHOR_OFFSET_PX - size.height;
        if above >= margin { above } else { clamp_low_wins(above, margin, max_y) }
    };

    let max_x = viewport.width - margin - size.width;
    let x = clamp_low_wins(anchor.x - size.width * 0.5, margin, max_x);

    Point::new(x, y)
}

// `f64::clamp` panics when `lo > hi`; an oversized menu hits that case.
fn clamp_low_wins(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}
