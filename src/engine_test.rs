#![allow(clippy::float_cmp)]

use tokio::sync::mpsc;
use uuid::Uuid;

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn engine() -> (CanvasEngine, mpsc::Receiver<PersistCommand>) {
    let (tx, rx) = mpsc::channel(16);
    let mut engine = CanvasEngine::with_persistence(CanvasConfig::default(), PersistQueue::new(tx));
    engine.set_viewport_size(Size::new(800.0, 600.0));
    (engine, rx)
}

fn node_at(x: f64, y: f64) -> CanvasNode {
    CanvasNode::new(Uuid::new_v4(), Point::new(x, y), Size::new(100.0, 80.0))
}

fn drain(rx: &mut mpsc::Receiver<PersistCommand>) -> Vec<PersistCommand> {
    let mut out = Vec::new();
    while let Ok(cmd) = rx.try_recv() {
        out.push(cmd);
    }
    out
}

/// Open the menu on `id` through a long press at its top-left corner + 10px.
fn long_press(engine: &mut CanvasEngine, id: &NodeId) {
    let node = engine.node(id).unwrap().clone();
    let screen = engine.transform().canvas_to_screen(node.position + Point::new(10.0, 10.0));
    engine.on_pointer_down(1, screen, 0.0);
    engine.tick(1000.0);
    engine.on_pointer_up(1, screen, 1001.0);
    assert_eq!(engine.phase(), GesturePhase::MenuOpen);
}

// =============================================================
// Construction
// =============================================================

#[test]
fn default_engine_is_empty_and_idle() {
    let engine = CanvasEngine::default();
    assert!(engine.order().is_empty());
    assert_eq!(engine.phase(), GesturePhase::Idle);
    assert_eq!(engine.transform(), ViewportTransform::default());
    assert!(engine.menu().is_none());
}

#[test]
fn without_queue_commands_are_dropped_quietly() {
    let mut engine = CanvasEngine::default();
    engine.set_viewport_size(Size::new(800.0, 600.0));
    let actions = engine.place_node(Uuid::new_v4(), Size::new(10.0, 10.0));
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(engine.order().len(), 1);
}

#[test]
fn full_queue_does_not_block_or_lose_memory_state() {
    let (tx, _rx) = mpsc::channel(1);
    let mut engine = CanvasEngine::with_persistence(CanvasConfig::default(), PersistQueue::new(tx));
    engine.place_node(Uuid::new_v4(), Size::new(10.0, 10.0));
    engine.place_node(Uuid::new_v4(), Size::new(10.0, 10.0));
    assert_eq!(engine.order().len(), 2);
}

// =============================================================
// Data inputs
// =============================================================

#[test]
fn load_snapshot_replaces_nodes() {
    let (mut engine, _rx) = engine();
    engine.add_node(node_at(0.0, 0.0));
    let id = Uuid::new_v4();
    let actions = engine.load_snapshot(vec![PlacedItem {
        id,
        position: Point::new(5.0, 6.0),
        size: Size::new(10.0, 10.0),
    }]);
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(engine.order(), &[id]);
    assert!(!engine.node(&id).unwrap().pinned);
}

#[test]
fn load_snapshot_closes_open_menu() {
    let (mut engine, _rx) = engine();
    let node = node_at(100.0, 100.0);
    let id = node.id;
    engine.add_node(node);
    long_press(&mut engine, &id);
    let actions = engine.load_snapshot(Vec::new());
    assert_eq!(actions, vec![Action::MenuClosed, Action::RenderNeeded]);
    assert_eq!(engine.phase(), GesturePhase::Idle);
}

#[test]
fn place_node_centers_on_viewport_and_persists() {
    let (mut engine, mut rx) = engine();
    engine.viewport.pan(Point::new(-200.0, -100.0));
    let id = Uuid::new_v4();
    engine.place_node(id, Size::new(100.0, 50.0));

    // Viewport center (400, 300) maps to canvas (600, 400).
    let position = Point::new(550.0, 375.0);
    assert_eq!(engine.node(&id).unwrap().position, position);
    assert_eq!(engine.order().last(), Some(&id));
    assert_eq!(drain(&mut rx), vec![PersistCommand::SavePosition { id, position }]);
}

#[test]
fn insertion_point_tracks_scale() {
    let (mut engine, _rx) = engine();
    engine.viewport.zoom_at(2.0, Point::default());
    let p = engine.insertion_point();
    assert!(approx_eq(p.x, 200.0));
    assert!(approx_eq(p.y, 150.0));
}

// =============================================================
// Removal
// =============================================================

#[test]
fn remove_node_clears_position() {
    let (mut engine, mut rx) = engine();
    let node = node_at(0.0, 0.0);
    let id = node.id;
    engine.add_node(node);
    let actions = engine.remove_node(&id);
    assert_eq!(actions, vec![Action::NodeRemoved { id }, Action::RenderNeeded]);
    assert!(engine.node(&id).is_none());
    assert_eq!(drain(&mut rx), vec![PersistCommand::ClearPosition { id }]);
}

#[test]
fn remove_unknown_node_is_noop() {
    let (mut engine, mut rx) = engine();
    assert!(engine.remove_node(&Uuid::new_v4()).is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn remove_mid_drag_cancels_without_save() {
    let (mut engine, mut rx) = engine();
    let node = node_at(100.0, 100.0);
    let id = node.id;
    engine.add_node(node);
    engine.on_pointer_down(1, Point::new(120.0, 120.0), 0.0);
    engine.on_pointer_move(1, Point::new(160.0, 120.0), 10.0);
    assert_eq!(engine.dragging(), Some(id));

    engine.remove_node(&id);
    assert_eq!(engine.phase(), GesturePhase::Idle);
    assert!(engine.dragging().is_none());

    // The finger keeps moving and lifts; nothing else happens.
    assert!(engine.on_pointer_move(1, Point::new(200.0, 120.0), 20.0).is_empty());
    assert!(engine.on_pointer_up(1, Point::new(200.0, 120.0), 30.0).is_empty());

    let saves: Vec<_> =
        drain(&mut rx).into_iter().filter(|c| matches!(c, PersistCommand::SavePosition { .. })).collect();
    assert!(saves.is_empty());
}

#[test]
fn remove_other_node_keeps_drag() {
    let (mut engine, _rx) = engine();
    let dragged = node_at(100.0, 100.0);
    let other = node_at(400.0, 400.0);
    let (dragged_id, other_id) = (dragged.id, other.id);
    engine.add_node(dragged);
    engine.add_node(other);
    engine.on_pointer_down(1, Point::new(120.0, 120.0), 0.0);
    engine.on_pointer_move(1, Point::new(160.0, 120.0), 10.0);
    engine.remove_node(&other_id);
    assert_eq!(engine.dragging(), Some(dragged_id));
}

// =============================================================
// Context menu
// =============================================================

#[test]
fn open_menu_requires_idle_and_known_node() {
    let (mut engine, _rx) = engine();
    assert!(engine.open_menu(Uuid::new_v4(), Point::default()).is_empty());

    let node = node_at(0.0, 0.0);
    let id = node.id;
    engine.add_node(node);
    let actions = engine.open_menu(id, Point::new(10.0, 10.0));
    assert_eq!(actions, vec![Action::MenuOpened { id }, Action::RenderNeeded]);
    assert!(engine.open_menu(id, Point::new(20.0, 20.0)).is_empty());
    assert_eq!(engine.menu().unwrap().anchor, Point::new(10.0, 10.0));
}

#[test]
fn set_menu_size_enables_placement() {
    let (mut engine, _rx) = engine();
    let node = node_at(0.0, 0.0);
    let id = node.id;
    engine.add_node(node);
    engine.open_menu(id, Point::new(400.0, 100.0));
    assert!(engine.frame_state().menu.unwrap().position.is_none());

    engine.set_menu_size(Size::new(200.0, 160.0));
    let menu = engine.frame_state().menu.unwrap();
    assert_eq!(menu.position, Some(Point::new(300.0, 112.0)));
}

#[test]
fn set_menu_size_without_menu_is_noop() {
    let (mut engine, _rx) = engine();
    assert!(engine.set_menu_size(Size::new(10.0, 10.0)).is_empty());
}

#[test]
fn dismiss_menu_returns_to_idle() {
    let (mut engine, _rx) = engine();
    let node = node_at(100.0, 100.0);
    let id = node.id;
    engine.add_node(node);
    long_press(&mut engine, &id);
    assert_eq!(engine.dismiss_menu(), vec![Action::MenuClosed, Action::RenderNeeded]);
    assert_eq!(engine.phase(), GesturePhase::Idle);
    assert!(engine.dismiss_menu().is_empty());
}

#[test]
fn menu_items_follow_pin_state() {
    let (mut engine, _rx) = engine();
    let node = node_at(100.0, 100.0);
    let id = node.id;
    engine.add_node(node);
    assert!(engine.menu_items().is_none());

    long_press(&mut engine, &id);
    assert_eq!(engine.menu_items().unwrap()[2].label, "Pin");
    engine.select_menu_action(MenuAction::TogglePin);
    assert!(engine.node(&id).unwrap().pinned);

    long_press(&mut engine, &id);
    assert_eq!(engine.menu_items().unwrap()[2].label, "Unpin");
    engine.select_menu_action(MenuAction::TogglePin);
    assert!(!engine.node(&id).unwrap().pinned);
}

#[test]
fn layer_actions_reorder_and_close_menu() {
    let (mut engine, mut rx) = engine();
    let a = node_at(100.0, 100.0);
    let b = node_at(400.0, 400.0);
    let (a_id, b_id) = (a.id, b.id);
    engine.add_node(a);
    engine.add_node(b);

    long_press(&mut engine, &a_id);
    let actions = engine.select_menu_action(MenuAction::LayerUp);
    assert_eq!(actions, vec![Action::MenuClosed, Action::RenderNeeded]);
    assert_eq!(engine.order(), &[b_id, a_id]);
    assert_eq!(engine.phase(), GesturePhase::Idle);

    long_press(&mut engine, &a_id);
    engine.select_menu_action(MenuAction::LayerDown);
    assert_eq!(engine.order(), &[a_id, b_id]);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn remove_action_clears_position() {
    let (mut engine, mut rx) = engine();
    let node = node_at(100.0, 100.0);
    let id = node.id;
    engine.add_node(node);
    long_press(&mut engine, &id);

    let actions = engine.select_menu_action(MenuAction::Remove);
    assert_eq!(actions, vec![Action::MenuClosed, Action::NodeRemoved { id }, Action::RenderNeeded]);
    assert!(engine.order().is_empty());
    assert!(engine.menu().is_none());
    assert_eq!(drain(&mut rx), vec![PersistCommand::ClearPosition { id }]);
}

#[test]
fn select_without_menu_is_noop() {
    let (mut engine, _rx) = engine();
    assert!(engine.select_menu_action(MenuAction::Remove).is_empty());
}

// =============================================================
// Viewport commands
// =============================================================

#[test]
fn fit_to_content_animates_to_solved_transform() {
    let (mut engine, _rx) = engine();
    engine.viewport.set_size(Size::new(500.0, 500.0));
    engine.config.fit_padding_px = 50.0;
    engine.add_node(CanvasNode::new(Uuid::new_v4(), Point::new(0.0, 0.0), Size::new(100.0, 100.0)));
    engine.add_node(CanvasNode::new(Uuid::new_v4(), Point::new(1000.0, 1400.0), Size::new(500.0, 100.0)));

    assert_eq!(engine.fit_to_content(0.0), vec![Action::RenderNeeded]);
    engine.tick(10_000.0);
    assert!(approx_eq(engine.transform().scale, 400.0 / 1500.0));
}

#[test]
fn fit_to_content_on_empty_canvas_is_noop() {
    let (mut engine, _rx) = engine();
    assert!(engine.fit_to_content(0.0).is_empty());
    assert!(!engine.is_animating());
}

#[test]
fn reset_view_returns_to_identity() {
    let (mut engine, _rx) = engine();
    engine.viewport.pan(Point::new(120.0, -40.0));
    engine.viewport.zoom_at(2.0, Point::default());
    engine.reset_view(0.0);
    assert!(engine.tick(100.0).contains(&Action::RenderNeeded));
    engine.tick(10_000.0);
    assert_eq!(engine.transform(), ViewportTransform::default());
    assert!(!engine.is_animating());
}

// =============================================================
// Frame state
// =============================================================

#[test]
fn frame_state_lists_nodes_in_paint_order() {
    let (mut engine, _rx) = engine();
    let a = node_at(0.0, 0.0);
    let b = node_at(10.0, 10.0);
    let (a_id, b_id) = (a.id, b.id);
    engine.add_node(a);
    engine.add_node(b);
    let frame = engine.frame_state();
    let ids: Vec<_> = frame.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![a_id, b_id]);
    assert_eq!(frame.phase, GesturePhase::Idle);
    assert!(frame.menu.is_none());
}

#[test]
fn frame_state_serializes_to_json() {
    let (mut engine, _rx) = engine();
    let node = node_at(0.0, 0.0);
    let id = node.id;
    engine.add_node(node);
    engine.open_menu(id, Point::new(10.0, 10.0));

    let json: serde_json::Value = serde_json::from_str(&engine.frame_state().to_json().unwrap()).unwrap();
    assert_eq!(json["phase"], "menu_open");
    assert_eq!(json["transform"]["scale"], 1.0);
    assert_eq!(json["nodes"][0]["id"], id.to_string());
    assert_eq!(json["menu"]["items"][0]["action"], "layer_up");
    assert!(json["menu"]["position"].is_null());
}
