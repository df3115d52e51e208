//! Viewport animations: a target transform approached along an easing curve.
//!
//! Animations are driven by host timestamps (milliseconds on any monotonic
//! clock). Starting a new animation while one is running retargets from the
//! current sampled value; nothing is queued.

#[cfg(test)]
#[path = "anim_test.rs"]
mod anim_test;

use crate::camera::ViewportTransform;

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[must_use]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Cubic ease-out (fast start, slow end).
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// An in-flight transition between two viewport transforms.
#[derive(Debug, Clone, Copy)]
pub struct TransformAnimation {
    from: ViewportTransform,
    to: ViewportTransform,
    start_ms: f64,
    duration_ms: f64,
    easing: EasingFn,
}

impl TransformAnimation {
    /// Create an animation from `from` to `to` starting at `start_ms`.
    ///
    /// A non-positive duration completes on the first sample.
    #[must_use]
    pub fn new(from: ViewportTransform, to: ViewportTransform, start_ms: f64, duration_ms: f64) -> Self {
        Self { from, to, start_ms, duration_ms: duration_ms.max(0.0), easing: ease_out_cubic }
    }

    /// Set the easing function (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// The transform this animation settles on.
    #[must_use]
    pub fn target(&self) -> ViewportTransform {
        self.to
    }

    /// Raw linear progress at `now_ms`, in [0, 1].
    #[must_use]
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_complete(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Eased transform at `now_ms`. Exactly `target()` once complete.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> ViewportTransform {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(&self.to, (self.easing)(t))
    }
}
