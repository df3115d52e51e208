//! Item store boundary.
//!
//! DESIGN
//! ======
//! The canvas engine never reads persisted positions back into live state
//! except at initial load, so the store contract is tiny: load what is
//! placed, save a position, clear a position. `MemoryStore` is an in-process
//! implementation for hosts without a durable backend and for tests.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::camera::{Point, Size};
use crate::registry::NodeId;

// =============================================================================
// TYPES
// =============================================================================

/// An item the store reports as placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: NodeId,
    pub position: Point,
    pub size: Size,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("item not found: {0}")]
    NotFound(NodeId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Durable home of item positions. Implemented by the host.
#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    /// Every item that currently has a stored position.
    async fn load_placed_items(&self) -> Result<Vec<PlacedItem>, StoreError>;

    /// Record `position` as the item's placement.
    async fn save_position(&self, id: NodeId, position: Point) -> Result<(), StoreError>;

    /// Forget the item's placement so it reverts to unplaced.
    async fn clear_position(&self, id: NodeId) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Clone)]
struct StoredItem {
    size: Size,
    position: Option<Point>,
}

/// `ItemStore` backed by a map behind a tokio `RwLock`.
///
/// Clone is cheap; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<RwLock<HashMap<NodeId, StoredItem>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item of `size`, placed at `position` or unplaced when `None`.
    pub async fn insert(&self, id: NodeId, size: Size, position: Option<Point>) {
        self.items.write().await.insert(id, StoredItem { size, position });
    }

    /// Stored position of `id`, `None` if unknown or unplaced.
    pub async fn position(&self, id: &NodeId) -> Option<Point> {
        self.items.read().await.get(id).and_then(|item| item.position)
    }
}

#[async_trait::async_trait]
impl ItemStore for MemoryStore {
    async fn load_placed_items(&self) -> Result<Vec<PlacedItem>, StoreError> {
        let items = self.items.read().await;
        let mut placed = items
            .iter()
            .filter_map(|(id, item)| item.position.map(|position| PlacedItem { id: *id, position, size: item.size }))
            .collect::<Vec<_>>();
        placed.sort_by_key(|item| item.id);
        Ok(placed)
    }

    async fn save_position(&self, id: NodeId, position: Point) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        item.position = Some(position);
        Ok(())
    }

    async fn clear_position(&self, id: NodeId) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        item.position = None;
        Ok(())
    }
}
