//! Gesture arbiter: routes raw pointer and wheel input to exactly one of
//! canvas panning, node dragging, or the context menu.
//!
//! A single finger on a node enters the pressing window, where the long-press
//! timer and the drag slop race. Whichever crosses its threshold first wins;
//! the other is simply never consulted again. A second finger during the
//! window cancels both and starts a canvas pan/pinch. While a drag or menu is
//! armed, every other pointer is tracked but otherwise ignored.
//!
//! Time is supplied by the host (`at_ms` on each event, `now_ms` on `tick`),
//! so the state machine is fully deterministic under test.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use tracing::{debug, trace};

use crate::camera::Point;
use crate::consts::MIN_PINCH_DISTANCE_PX;
use crate::drag::DragSession;
use crate::engine::{Action, CanvasEngine};
use crate::input::{GestureState, PointerId, WheelDelta};
use crate::menu::ContextMenuState;
use crate::persistence::PersistCommand;

impl CanvasEngine {
    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, pointer: PointerId, screen_pt: Point, at_ms: f64) -> Vec<Action> {
        self.pointers.press(pointer, screen_pt);

        match self.gesture {
            GestureState::NodeDragging { .. } | GestureState::MenuOpen(_) => {
                trace!(pointer, "pointer down suppressed");
                Vec::new()
            }
            GestureState::Pressing { node_id, .. } => {
                debug!(node_id = %node_id, "second pointer; press becomes canvas pan");
                self.start_panning();
                vec![Action::RenderNeeded]
            }
            GestureState::CanvasPanning { .. } => {
                self.rebase_panning();
                Vec::new()
            }
            GestureState::Idle => {
                if self.pointers.len() >= 2 {
                    self.start_panning();
                    return vec![Action::RenderNeeded];
                }
                let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
                match self.registry.hit_test(canvas_pt) {
                    Some(node_id) => {
                        self.gesture =
                            GestureState::Pressing { pointer, node_id, start_screen: screen_pt, started_ms: at_ms };
                        Vec::new()
                    }
                    None => {
                        self.start_panning();
                        Vec::new()
                    }
                }
            }
        }
    }

    pub fn on_pointer_move(&mut self, pointer: PointerId, screen_pt: Point, at_ms: f64) -> Vec<Action> {
        if !self.pointers.update(pointer, screen_pt) {
            return Vec::new();
        }
        let mut actions = self.fire_long_press_if_due(at_ms);

        match self.gesture {
            GestureState::Pressing { pointer: p, node_id, start_screen, .. } if p == pointer => {
                if screen_pt.distance(start_screen) < self.config.drag_slop_px {
                    return actions;
                }
                match DragSession::begin(&self.registry, node_id) {
                    Some(mut session) => {
                        session.update(screen_pt - start_screen, &self.viewport.transform(), &mut self.registry);
                        self.gesture = GestureState::NodeDragging { pointer, start_screen, session };
                        debug!(node_id = %node_id, "drag started");
                        actions.push(Action::DragStarted { id: node_id });
                        actions.push(Action::RenderNeeded);
                    }
                    None => {
                        trace!(node_id = %node_id, "node pinned or gone; press falls through to canvas pan");
                        self.viewport.cancel_animation();
                        self.gesture =
                            GestureState::CanvasPanning { last_centroid: start_screen, last_spread: None, pinched: false };
                        actions.extend(self.pan_step());
                    }
                }
            }
            GestureState::NodeDragging { pointer: p, start_screen, mut session } if p == pointer => {
                session.update(screen_pt - start_screen, &self.viewport.transform(), &mut self.registry);
                self.gesture = GestureState::NodeDragging { pointer, start_screen, session };
                actions.push(Action::RenderNeeded);
            }
            GestureState::CanvasPanning { .. } => actions.extend(self.pan_step()),
            _ => {}
        }
        actions
    }

    pub fn on_pointer_up(&mut self, pointer: PointerId, screen_pt: Point, at_ms: f64) -> Vec<Action> {
        if !self.pointers.update(pointer, screen_pt) {
            return Vec::new();
        }
        self.finish_pointer(pointer, screen_pt, at_ms, false)
    }

    /// The platform took the pointer away. A live drag commits at the last
    /// known position; a pending press is dropped without a tap.
    pub fn on_pointer_cancel(&mut self, pointer: PointerId, at_ms: f64) -> Vec<Action> {
        let Some(last) = self.pointers.position(pointer) else {
            return Vec::new();
        };
        self.finish_pointer(pointer, last, at_ms, true)
    }

    // --- Wheel / trackpad ---

    /// Scroll pans; a zoom factor zooms around `screen_pt` within the soft
    /// bounds. Suppressed while a drag or menu is armed.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        if !self.gesture.canvas_input_allowed() {
            trace!("wheel suppressed");
            return Vec::new();
        }
        self.viewport.pan(Point::new(-delta.dx, -delta.dy));
        if (delta.zoom - 1.0).abs() > f64::EPSILON {
            self.viewport.zoom_at(delta.zoom, screen_pt);
        }
        vec![Action::RenderNeeded]
    }

    // --- Clock ---

    /// Fire the long-press timer if due and advance any viewport animation.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        let mut actions = self.fire_long_press_if_due(now_ms);
        if self.viewport.tick(now_ms) && !actions.contains(&Action::RenderNeeded) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Internals ---

    fn finish_pointer(&mut self, pointer: PointerId, screen_pt: Point, at_ms: f64, cancelled: bool) -> Vec<Action> {
        let mut actions = self.fire_long_press_if_due(at_ms);
        if matches!(self.gesture, GestureState::CanvasPanning { .. }) {
            actions.extend(self.pan_step());
        }
        self.pointers.release(pointer);

        match self.gesture {
            GestureState::Pressing { pointer: p, node_id, .. } if p == pointer => {
                self.gesture = GestureState::Idle;
                if !cancelled {
                    actions.push(Action::NodeTapped { id: node_id });
                }
            }
            GestureState::NodeDragging { pointer: p, start_screen, session } if p == pointer => {
                self.gesture = GestureState::Idle;
                actions.extend(self.commit_drag(session, screen_pt - start_screen));
            }
            GestureState::CanvasPanning { pinched, .. } => {
                if self.pointers.is_empty() {
                    self.gesture = GestureState::Idle;
                    debug!(pinched, "canvas pan ended");
                    if pinched && self.viewport.end_pinch(at_ms) && !actions.contains(&Action::RenderNeeded) {
                        actions.push(Action::RenderNeeded);
                    }
                } else {
                    self.rebase_panning();
                }
            }
            _ => {}
        }
        actions
    }

    fn commit_drag(&mut self, session: DragSession, delta_screen: Point) -> Vec<Action> {
        let id = session.node_id;
        let Some(position) = session.end(delta_screen, &self.viewport.transform(), &mut self.registry) else {
            return Vec::new();
        };
        debug!(node_id = %id, x = position.x, y = position.y, "drag committed");
        self.persist(PersistCommand::SavePosition { id, position });
        vec![Action::PositionCommitted { id, position }, Action::RenderNeeded]
    }

    fn fire_long_press_if_due(&mut self, now_ms: f64) -> Vec<Action> {
        let GestureState::Pressing { node_id, start_screen, started_ms, .. } = self.gesture else {
            return Vec::new();
        };
        if now_ms - started_ms < self.config.long_press_ms {
            return Vec::new();
        }
        self.gesture = GestureState::MenuOpen(ContextMenuState::open(node_id, start_screen));
        debug!(node_id = %node_id, "long press; context menu opened");
        vec![Action::MenuOpened { id: node_id }, Action::RenderNeeded]
    }

    /// Enter `CanvasPanning` from the currently tracked pointers.
    fn start_panning(&mut self) {
        self.viewport.cancel_animation();
        self.gesture = match self.pointers.centroid_and_spread() {
            Some((last_centroid, last_spread)) => {
                GestureState::CanvasPanning { last_centroid, last_spread, pinched: false }
            }
            None => GestureState::Idle,
        };
    }

    /// The pointer set changed mid-pan; measure future deltas from the new
    /// centroid so the canvas does not jump.
    fn rebase_panning(&mut self) {
        let Some((centroid, spread)) = self.pointers.centroid_and_spread() else {
            return;
        };
        if let GestureState::CanvasPanning { last_centroid, last_spread, .. } = &mut self.gesture {
            *last_centroid = centroid;
            *last_spread = spread;
        }
    }

    /// Apply pointer motion since the last event as a pan plus, with two
    /// fingers, a pinch around their centroid.
    fn pan_step(&mut self) -> Vec<Action> {
        let Some((centroid, spread)) = self.pointers.centroid_and_spread() else {
            return Vec::new();
        };
        let GestureState::CanvasPanning { last_centroid, last_spread, pinched } = &mut self.gesture else {
            return Vec::new();
        };

        self.viewport.pan(centroid - *last_centroid);
        if let (Some(prev), Some(cur)) = (*last_spread, spread) {
            if prev >= MIN_PINCH_DISTANCE_PX && cur >= MIN_PINCH_DISTANCE_PX {
                self.viewport.pinch(cur / prev, centroid);
                *pinched = true;
            }
        }
        *last_centroid = centroid;
        *last_spread = spread;
        vec![Action::RenderNeeded]
    }
}
