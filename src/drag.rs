//! Drag session: transient per-node state while a note follows the finger.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use tracing::debug;

use crate::camera::{Point, ViewportTransform};
use crate::registry::{NodeId, NodeRegistry};

/// The single live drag. Positions are written to the registry on every
/// update so the note moves immediately; persistence happens on `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub node_id: NodeId,
    /// Node position when the drag began, in canvas space.
    pub origin_position: Point,
    /// Total screen-space movement since the press.
    pub accumulated_delta: Point,
}

impl DragSession {
    /// Start dragging `id`. Returns `None` for pinned or unknown nodes.
    #[must_use]
    pub fn begin(registry: &NodeRegistry, id: NodeId) -> Option<Self> {
        let node = registry.get(&id)?;
        if node.pinned {
            return None;
        }
        Some(Self { node_id: id, origin_position: node.position, accumulated_delta: Point::default() })
    }

    /// Canvas position for a total screen delta at the live scale.
    #[must_use]
    pub fn position_for(&self, delta_screen: Point, transform: &ViewportTransform) -> Point {
        self.origin_position + transform.screen_delta_to_canvas(delta_screen)
    }

    /// Move the node to `origin + delta / scale` using the current scale.
    pub fn update(&mut self, delta_screen: Point, transform: &ViewportTransform, registry: &mut NodeRegistry) {
        self.accumulated_delta = delta_screen;
        registry.set_position(&self.node_id, self.position_for(delta_screen, transform));
    }

    /// Apply the final delta and return the committed position, or `None`
    /// if the node disappeared in the meantime.
    pub fn end(mut self, delta_screen: Point, transform: &ViewportTransform, registry: &mut NodeRegistry) -> Option<Point> {
        self.update(delta_screen, transform, registry);
        registry.get(&self.node_id).map(|n| n.position)
    }

    /// Abandon the drag without persisting or reverting the node.
    pub fn cancel(self) {
        debug!(node_id = %self.node_id, "drag cancelled");
    }
}
