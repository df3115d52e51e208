//! Input model: pointer events, wheel deltas, and the gesture state machine.
//!
//! `GestureState` is the arbitration state tracked between pointer-down and
//! the last pointer-up. Each armed variant carries the context needed to
//! compute deltas and emit the final mutation. Only one variant exists at a
//! time, which is what makes canvas panning, node dragging, and the open
//! context menu mutually exclusive.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::drag::DragSession;
use crate::menu::ContextMenuState;
use crate::registry::NodeId;

/// Host-assigned identifier for one finger, pen, or mouse.
pub type PointerId = u64;

/// Wheel / trackpad input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
    /// Zoom factor (1.0 = no change; >1 = zoom in).
    pub zoom: f64,
}

impl WheelDelta {
    #[must_use]
    pub fn scroll(dx: f64, dy: f64) -> Self {
        Self { dx, dy, zoom: 1.0 }
    }

    #[must_use]
    pub fn zoom(zoom: f64) -> Self {
        Self { dx: 0.0, dy: 0.0, zoom }
    }
}

/// Externally visible arbitration phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    #[default]
    Idle,
    CanvasPanning,
    NodeDragging,
    MenuOpen,
}

/// Internal state for the gesture arbiter.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// Nothing armed. Moves from stray pointers are ignored.
    #[default]
    Idle,
    /// A single finger is down on a node; the long-press timer and the drag
    /// recognizer race until one of them fires.
    Pressing {
        pointer: PointerId,
        node_id: NodeId,
        /// Screen-space press location.
        start_screen: Point,
        /// Host timestamp of the press.
        started_ms: f64,
    },
    /// The canvas follows one or two fingers.
    CanvasPanning {
        /// Screen-space centroid of the tracked pointers at the previous event.
        last_centroid: Point,
        /// Finger spread at the previous event; `None` with a single pointer.
        last_spread: Option<f64>,
        /// Whether any pinch scaling happened during this gesture.
        pinched: bool,
    },
    /// A node follows the finger.
    NodeDragging {
        pointer: PointerId,
        /// Screen-space press location; deltas are measured from here.
        start_screen: Point,
        session: DragSession,
    },
    /// The context menu is up and owns all input until dismissed.
    MenuOpen(ContextMenuState),
}

impl GestureState {
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        match self {
            Self::Idle | Self::Pressing { .. } => GesturePhase::Idle,
            Self::CanvasPanning { .. } => GesturePhase::CanvasPanning,
            Self::NodeDragging { .. } => GesturePhase::NodeDragging,
            Self::MenuOpen(_) => GesturePhase::MenuOpen,
        }
    }

    /// Whether canvas-level pan/pinch/wheel input may move the viewport.
    #[must_use]
    pub fn canvas_input_allowed(&self) -> bool {
        !matches!(self, Self::NodeDragging { .. } | Self::MenuOpen(_))
    }

    /// The node this state is bound to, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Pressing { node_id, .. } => Some(*node_id),
            Self::NodeDragging { session, .. } => Some(session.node_id),
            Self::MenuOpen(menu) => Some(menu.node_id),
            Self::Idle | Self::CanvasPanning { .. } => None,
        }
    }
}

/// Pointers currently touching the surface, in the order they went down.
#[derive(Debug, Clone, Default)]
pub struct PointerSet {
    pointers: Vec<(PointerId, Point)>,
}

impl PointerSet {
    /// Track `id` at `pos`, replacing any stale entry for the same id.
    pub fn press(&mut self, id: PointerId, pos: Point) {
        self.release(id);
        self.pointers.push((id, pos));
    }

    /// Update a tracked pointer. Returns false if `id` is not tracked.
    pub fn update(&mut self, id: PointerId, pos: Point) -> bool {
        match self.pointers.iter_mut().find(|(p, _)| *p == id) {
            Some(entry) => {
                entry.1 = pos;
                true
            }
            None => false,
        }
    }

    /// Last known position of `id`.
    #[must_use]
    pub fn position(&self, id: PointerId) -> Option<Point> {
        self.pointers.iter().find(|(p, _)| *p == id).map(|(_, pos)| *pos)
    }

    /// Stop tracking `id`. Returns false if it was not tracked.
    pub fn release(&mut self, id: PointerId) -> bool {
        let before = self.pointers.len();
        self.pointers.retain(|(p, _)| *p != id);
        self.pointers.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Centroid and spread of the first two pointers. Spread is `None` with
    /// fewer than two; the centroid is `None` with none.
    #[must_use]
    pub fn centroid_and_spread(&self) -> Option<(Point, Option<f64>)> {
        match self.pointers.as_slice() {
            [] => None,
            [(_, a)] => Some((*a, None)),
            [(_, a), (_, b), ..] => Some((a.midpoint(*b), Some(a.distance(*b)))),
        }
    }
}
