//! Node registry: the placed notes, their stacking order, and pin flags.
//!
//! `order` is the single source of paint and hit-test priority; the last id is
//! frontmost. Every node in `nodes` appears exactly once in `order`, and no id
//! in `order` lacks a node. All operations on unknown ids are silent no-ops.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

use crate::camera::{Point, Rect, Size};
use crate::store::PlacedItem;

/// Unique identifier for a canvas node. Shared with the item store.
pub type NodeId = Uuid;

/// One placed note on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: NodeId,
    /// Top-left corner in canvas space.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Pinned nodes refuse to start a drag.
    pub pinned: bool,
}

impl CanvasNode {
    #[must_use]
    pub fn new(id: NodeId, position: Point, size: Size) -> Self {
        Self { id, position, width: size.width, height: size.height, pinned: false }
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounding rect in canvas space.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }
}

impl From<PlacedItem> for CanvasNode {
    fn from(item: PlacedItem) -> Self {
        CanvasNode::new(item.id, item.position, item.size)
    }
}

/// In-memory store of canvas nodes plus their z-order.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<NodeId, CanvasNode>,
    order: Vec<NodeId>,
}

impl NodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node as frontmost. An existing node with the same id is
    /// replaced and brought to the front.
    pub fn add(&mut self, node: CanvasNode) {
        let id = node.id;
        if self.nodes.insert(id, node).is_some() {
            self.order.retain(|other| *other != id);
        }
        self.order.push(id);
    }

    /// Remove a node, returning it if it was present.
    pub fn remove(&mut self, id: &NodeId) -> Option<CanvasNode> {
        let node = self.nodes.remove(id)?;
        self.order.retain(|other| other != id);
        Some(node)
    }

    /// Replace every node with `items`, in store order (first is backmost).
    pub fn load_snapshot(&mut self, items: Vec<PlacedItem>) {
        self.nodes.clear();
        self.order.clear();
        for item in items {
            self.add(CanvasNode::from(item));
        }
    }

    /// Move `id` to the front. No-op if it is already frontmost or unknown.
    pub fn layer_up(&mut self, id: &NodeId) {
        let Some(idx) = self.index_of(id) else {
            trace!(node_id = %id, "layer_up on unknown node");
            return;
        };
        if idx + 1 == self.order.len() {
            return;
        }
        let id = self.order.remove(idx);
        self.order.push(id);
    }

    /// Move `id` to the back. No-op if it is already backmost or unknown.
    pub fn layer_down(&mut self, id: &NodeId) {
        let Some(idx) = self.index_of(id) else {
            trace!(node_id = %id, "layer_down on unknown node");
            return;
        };
        if idx == 0 {
            return;
        }
        let id = self.order.remove(idx);
        self.order.insert(0, id);
    }

    pub fn set_pinned(&mut self, id: &NodeId, pinned: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.pinned = pinned;
        }
    }

    pub fn set_position(&mut self, id: &NodeId, position: Point) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.position = position;
        }
    }

    /// Topmost node whose rect contains `canvas_pt`.
    #[must_use]
    pub fn hit_test(&self, canvas_pt: Point) -> Option<NodeId> {
        self.order
            .iter()
            .rev()
            .find(|id| self.nodes.get(*id).is_some_and(|n| n.rect().contains(canvas_pt)))
            .copied()
    }

    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&CanvasNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node ids in paint order, backmost first.
    #[must_use]
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes in paint order, backmost first.
    pub fn ordered(&self) -> impl Iterator<Item = &CanvasNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.order.iter().position(|other| other == id)
    }
}
