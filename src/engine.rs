//! Canvas engine: owns every piece of canvas state and is the single entry
//! point for host input.
//!
//! DESIGN
//! ======
//! The engine is synchronous and render-agnostic. Handlers mutate in-memory
//! state immediately and return a list of [`Action`]s describing what the
//! host should react to. Store calls are never awaited here: committed
//! positions and removals are pushed onto the bounded [`PersistQueue`] and
//! drained by the persistence worker.
//!
//! Pointer handlers live in `gesture.rs`; this file holds data inputs, menu
//! actions, viewport commands, and queries.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns an error. Operations on unknown ids are no-ops, and a
//! full or closed persistence queue is logged and the command dropped. The
//! in-memory state stays authoritative either way.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::camera::{Point, Size, ViewportTransform};
use crate::config::CanvasConfig;
use crate::input::{GesturePhase, GestureState, PointerSet};
use crate::layout;
use crate::menu::{ContextMenuState, MenuAction, MenuItem, menu_items};
use crate::persistence::{PersistCommand, PersistQueue, spawn_persistence_worker};
use crate::registry::{CanvasNode, NodeId, NodeRegistry};
use crate::store::{ItemStore, PlacedItem};
use crate::viewport::Viewport;

// =============================================================================
// TYPES
// =============================================================================

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Canvas state changed; repaint from [`CanvasEngine::frame_state`].
    RenderNeeded,
    /// A press on a node was released before any recognizer fired.
    NodeTapped { id: NodeId },
    DragStarted { id: NodeId },
    /// A drag finished; `position` is already applied in memory.
    PositionCommitted { id: NodeId, position: Point },
    MenuOpened { id: NodeId },
    MenuClosed,
    NodeRemoved { id: NodeId },
}

/// Everything the host needs to paint one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameState {
    pub transform: ViewportTransform,
    pub phase: GesturePhase,
    /// Nodes in paint order, back to front.
    pub nodes: Vec<CanvasNode>,
    pub menu: Option<MenuFrame>,
}

impl FrameState {
    /// Serialize for a JS / native host bridge.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Render data for the open context menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuFrame {
    pub node_id: NodeId,
    pub anchor: Point,
    /// Top-left placement; `None` until the host reports the menu size.
    pub position: Option<Point>,
    pub items: [MenuItem; 4],
}

// =============================================================================
// ENGINE
// =============================================================================

pub struct CanvasEngine {
    pub(crate) config: CanvasConfig,
    pub(crate) viewport: Viewport,
    pub(crate) registry: NodeRegistry,
    pub(crate) gesture: GestureState,
    pub(crate) pointers: PointerSet,
    persist: Option<PersistQueue>,
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasEngine {
    /// Engine without persistence. Committed positions stay in memory only.
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            viewport: Viewport::new(config.animation_ms),
            registry: NodeRegistry::new(),
            gesture: GestureState::Idle,
            pointers: PointerSet::default(),
            persist: None,
        }
    }

    /// Engine that forwards store calls to `queue`.
    #[must_use]
    pub fn with_persistence(config: CanvasConfig, queue: PersistQueue) -> Self {
        let mut engine = Self::new(config);
        engine.persist = Some(queue);
        engine
    }

    /// Engine plus a persistence worker draining into `store`, sized by
    /// `config.persist_queue_capacity`. Must be called within a tokio runtime.
    #[must_use]
    pub fn with_store(config: CanvasConfig, store: Arc<dyn ItemStore>) -> (Self, JoinHandle<()>) {
        let (queue, worker) = spawn_persistence_worker(store, config.persist_queue_capacity);
        (Self::with_persistence(config, queue), worker)
    }

    // --- Data inputs ---

    /// Set the viewport size in screen pixels.
    pub fn set_viewport_size(&mut self, size: Size) -> Vec<Action> {
        self.viewport.set_size(size);
        vec![Action::RenderNeeded]
    }

    /// Replace every node with the store's placed items.
    pub fn load_snapshot(&mut self, items: Vec<PlacedItem>) -> Vec<Action> {
        let mut actions = self.abort_item_gesture();
        self.registry.load_snapshot(items);
        info!(nodes = self.registry.len(), "canvas snapshot loaded");
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Add a node whose position the store already knows.
    pub fn add_node(&mut self, node: CanvasNode) -> Vec<Action> {
        self.registry.add(node);
        vec![Action::RenderNeeded]
    }

    /// Place an unplaced item centered where the user is looking and save
    /// the position.
    pub fn place_node(&mut self, id: NodeId, size: Size) -> Vec<Action> {
        let center = layout::insertion_point(&self.viewport.transform(), self.viewport.size());
        let position = layout::centered_at(center, size);
        self.registry.add(CanvasNode::new(id, position, size));
        debug!(node_id = %id, x = position.x, y = position.y, "node placed");
        self.persist(PersistCommand::SavePosition { id, position });
        vec![Action::RenderNeeded]
    }

    /// Take a node off the canvas. Any drag or menu bound to it is dropped
    /// without saving, and the store is told to forget its position.
    pub fn remove_node(&mut self, id: &NodeId) -> Vec<Action> {
        if !self.registry.contains(id) {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.gesture.node_id() == Some(*id) {
            match std::mem::take(&mut self.gesture) {
                GestureState::NodeDragging { session, .. } => session.cancel(),
                GestureState::MenuOpen(_) => actions.push(Action::MenuClosed),
                _ => {}
            }
        }

        self.registry.remove(id);
        self.persist(PersistCommand::ClearPosition { id: *id });
        actions.push(Action::NodeRemoved { id: *id });
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport commands ---

    /// Animate back to the identity transform.
    pub fn reset_view(&mut self, now_ms: f64) -> Vec<Action> {
        self.viewport.reset(now_ms);
        vec![Action::RenderNeeded]
    }

    /// Animate to frame every node. No-op on an empty canvas.
    pub fn fit_to_content(&mut self, now_ms: f64) -> Vec<Action> {
        if self.registry.is_empty() {
            return Vec::new();
        }
        let rects: Vec<_> = self.registry.ordered().map(CanvasNode::rect).collect();
        self.viewport.fit_to_content(rects, self.viewport.size(), self.config.fit_padding_px, now_ms);
        vec![Action::RenderNeeded]
    }

    // --- Context menu ---

    /// Open the menu for `id` at `anchor` without a long-press, e.g. from a
    /// secondary click. Ignored unless the arbiter is idle.
    pub fn open_menu(&mut self, id: NodeId, anchor: Point) -> Vec<Action> {
        if !matches!(self.gesture, GestureState::Idle | GestureState::Pressing { .. }) {
            return Vec::new();
        }
        if !self.registry.contains(&id) {
            return Vec::new();
        }
        self.gesture = GestureState::MenuOpen(ContextMenuState::open(id, anchor));
        debug!(node_id = %id, "context menu opened");
        vec![Action::MenuOpened { id }, Action::RenderNeeded]
    }

    /// Record the rendered menu size so placement can be computed.
    pub fn set_menu_size(&mut self, size: Size) -> Vec<Action> {
        let GestureState::MenuOpen(menu) = &mut self.gesture else {
            return Vec::new();
        };
        menu.measured_size = Some(size);
        vec![Action::RenderNeeded]
    }

    /// Action rows for the open menu.
    #[must_use]
    pub fn menu_items(&self) -> Option<[MenuItem; 4]> {
        let menu = self.menu()?;
        let node = self.registry.get(&menu.node_id)?;
        Some(menu_items(node.pinned))
    }

    /// Close the menu without applying anything.
    pub fn dismiss_menu(&mut self) -> Vec<Action> {
        if !matches!(self.gesture, GestureState::MenuOpen(_)) {
            return Vec::new();
        }
        self.gesture = GestureState::Idle;
        vec![Action::MenuClosed, Action::RenderNeeded]
    }

    /// Apply `action` to the menu's node and close the menu.
    pub fn select_menu_action(&mut self, action: MenuAction) -> Vec<Action> {
        let GestureState::MenuOpen(menu) = &self.gesture else {
            return Vec::new();
        };
        let id = menu.node_id;
        self.gesture = GestureState::Idle;
        debug!(node_id = %id, ?action, "menu action selected");

        let mut actions = vec![Action::MenuClosed];
        match action {
            MenuAction::LayerUp => self.registry.layer_up(&id),
            MenuAction::LayerDown => self.registry.layer_down(&id),
            MenuAction::TogglePin => {
                let pinned = self.registry.get(&id).is_some_and(|n| n.pinned);
                self.registry.set_pinned(&id, !pinned);
            }
            MenuAction::Remove => {
                let removed = self.remove_node(&id);
                actions.extend(removed.into_iter().filter(|a| *a != Action::RenderNeeded));
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Queries ---

    /// Externally visible arbitration phase.
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    #[must_use]
    pub fn transform(&self) -> ViewportTransform {
        self.viewport.transform()
    }

    #[must_use]
    pub fn viewport_size(&self) -> Size {
        self.viewport.size()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.viewport.is_animating()
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&CanvasNode> {
        self.registry.get(id)
    }

    /// Node ids in paint order, back to front.
    #[must_use]
    pub fn order(&self) -> &[NodeId] {
        self.registry.order()
    }

    /// The open context menu, if any.
    #[must_use]
    pub fn menu(&self) -> Option<&ContextMenuState> {
        match &self.gesture {
            GestureState::MenuOpen(menu) => Some(menu),
            _ => None,
        }
    }

    /// The node being dragged, if any.
    #[must_use]
    pub fn dragging(&self) -> Option<NodeId> {
        match &self.gesture {
            GestureState::NodeDragging { session, .. } => Some(session.node_id),
            _ => None,
        }
    }

    /// Canvas-space point at the center of the viewport.
    #[must_use]
    pub fn insertion_point(&self) -> Point {
        layout::insertion_point(&self.viewport.transform(), self.viewport.size())
    }

    /// Snapshot for the host renderer.
    #[must_use]
    pub fn frame_state(&self) -> FrameState {
        let menu = self.menu().map(|menu| MenuFrame {
            node_id: menu.node_id,
            anchor: menu.anchor,
            position: menu.placement(self.viewport.size(), self.config.menu_margin_px),
            items: menu_items(self.registry.get(&menu.node_id).is_some_and(|n| n.pinned)),
        });
        FrameState {
            transform: self.viewport.transform(),
            phase: self.gesture.phase(),
            nodes: self.registry.ordered().cloned().collect(),
            menu,
        }
    }

    // --- Internals ---

    /// Drop any press, drag, or menu without persisting. Canvas panning
    /// survives since it does not reference a node.
    pub(crate) fn abort_item_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.gesture) {
            GestureState::NodeDragging { session, .. } => session.cancel(),
            GestureState::MenuOpen(_) => return vec![Action::MenuClosed],
            panning @ GestureState::CanvasPanning { .. } => self.gesture = panning,
            GestureState::Idle | GestureState::Pressing { .. } => {}
        }
        Vec::new()
    }

    pub(crate) fn persist(&self, command: PersistCommand) {
        let Some(queue) = &self.persist else {
            debug!(node_id = %command.id(), "no persistence queue; command dropped");
            return;
        };
        if let Err(e) = queue.enqueue(command) {
            warn!(error = %e, "failed to enqueue store call");
        }
    }
}
