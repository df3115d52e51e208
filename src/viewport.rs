//! Viewport controller: owns the live transform, the pinch lifecycle, and the
//! running animation.
//!
//! Direct manipulation (`pan`, `pinch`) cancels any running animation so the
//! finger always wins. Animated operations (`end_pinch` snap, `reset`,
//! `fit_to_content`) retarget from whatever the transform currently is.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use tracing::debug;

use crate::anim::TransformAnimation;
use crate::camera::{Point, Rect, Size, ViewportTransform};
use crate::consts::{MAX_SCALE, MIN_SCALE, SNAP_MAX_SCALE, SNAP_MIN_SCALE};
use crate::layout;

#[derive(Debug, Clone)]
pub struct Viewport {
    transform: ViewportTransform,
    size: Size,
    animation: Option<TransformAnimation>,
    /// Last anchor seen during the current pinch; `None` outside a pinch.
    pinch_anchor: Option<Point>,
    /// The running animation is a pinch-end snap back into the soft bounds.
    snapping: bool,
    animation_ms: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(animation_ms: f64) -> Self {
        Self {
            transform: ViewportTransform::default(),
            size: Size::default(),
            animation: None,
            pinch_anchor: None,
            snapping: false,
            animation_ms,
        }
    }

    #[must_use]
    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        self.transform.screen_to_canvas(screen)
    }

    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.transform.canvas_to_screen(canvas)
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.pinch_anchor.is_some()
    }

    /// Drop any running animation. Reset and fit tweens stop where they are;
    /// an interrupted zoom snap lands on its target so the resting scale
    /// never stays outside the soft bounds.
    pub fn cancel_animation(&mut self) {
        if let Some(anim) = self.animation.take() {
            if self.snapping {
                debug!(scale = anim.target().scale, "zoom snap interrupted; landing");
                self.transform = anim.target();
            }
        }
        self.snapping = false;
    }

    /// Translate by a screen-space delta. The canvas is unbounded.
    pub fn pan(&mut self, delta: Point) {
        self.cancel_animation();
        self.transform.pan_by(delta);
    }

    /// Multiply the scale by `factor` around `anchor`, clamped to the hard bounds.
    ///
    /// Non-finite or non-positive factors are ignored.
    pub fn pinch(&mut self, factor: f64, anchor: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.cancel_animation();
        self.pinch_anchor = Some(anchor);
        let scale = (self.transform.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.transform = self.transform.zoomed_about(scale, anchor);
    }

    /// Discrete zoom by `factor` around `anchor` (wheel, keyboard). Unlike a
    /// pinch there is no gesture end, so the result is held to the soft
    /// bounds. A scale already outside them (after a fit) may only move back
    /// toward the range, never further out.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.cancel_animation();
        let current = self.transform.scale;
        let lo = SNAP_MIN_SCALE.min(current);
        let hi = SNAP_MAX_SCALE.max(current);
        let scale = (current * factor).clamp(lo, hi);
        self.transform = self.transform.zoomed_about(scale, anchor);
    }

    /// Finish a pinch. Scales outside the soft bounds animate back to the
    /// nearest soft bound around the last pinch anchor. Returns whether a
    /// snap animation started.
    pub fn end_pinch(&mut self, now_ms: f64) -> bool {
        let Some(anchor) = self.pinch_anchor.take() else {
            return false;
        };
        let scale = self.transform.scale;
        let target_scale = if scale < SNAP_MIN_SCALE {
            SNAP_MIN_SCALE
        } else if scale > SNAP_MAX_SCALE {
            SNAP_MAX_SCALE
        } else {
            return false;
        };
        debug!(from = scale, to = target_scale, "zoom snap");
        let target = self.transform.zoomed_about(target_scale, anchor);
        self.animate_to(target, now_ms);
        self.snapping = true;
        true
    }

    /// Animate back to the identity transform.
    pub fn reset(&mut self, now_ms: f64) {
        self.animate_to(ViewportTransform::default(), now_ms);
    }

    /// Animate to the transform that frames every rect in `nodes`.
    /// No-op when `nodes` is empty.
    pub fn fit_to_content<I>(&mut self, nodes: I, viewport: Size, padding: f64, now_ms: f64)
    where
        I: IntoIterator<Item = Rect>,
    {
        let Some(bounds) = layout::bounding_box(nodes) else {
            return;
        };
        let target = layout::fit_transform(bounds, viewport, padding);
        debug!(scale = target.scale, "fit to content");
        self.animate_to(target, now_ms);
    }

    /// Start (or retarget) an animation from the current transform.
    pub fn animate_to(&mut self, target: ViewportTransform, now_ms: f64) {
        self.snapping = false;
        self.animation = Some(TransformAnimation::new(self.transform, target, now_ms, self.animation_ms));
    }

    /// Advance the running animation. Returns whether the transform changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(anim) = self.animation else {
            return false;
        };
        let next = anim.sample(now_ms);
        if anim.is_complete(now_ms) {
            self.animation = None;
            self.snapping = false;
        }
        let changed = next != self.transform;
        self.transform = next;
        changed
    }
}
