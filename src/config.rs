//! Engine tunables loaded from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_LONG_PRESS_MS: f64 = 450.0;
pub const DEFAULT_DRAG_SLOP_PX: f64 = 10.0;
pub const DEFAULT_ANIMATION_MS: f64 = 250.0;
pub const DEFAULT_MENU_MARGIN_PX: f64 = 8.0;
pub const DEFAULT_FIT_PADDING_PX: f64 = 48.0;
pub const DEFAULT_PERSIST_QUEUE_CAPACITY: usize = 256;

/// Tuning knobs for gesture recognition, animation, layout, and persistence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    /// Hold time before a stationary press on a node opens its menu.
    pub long_press_ms: f64,
    /// Screen-space movement that turns a press into a drag (or pan).
    pub drag_slop_px: f64,
    /// Duration of reset, fit, and zoom-snap animations.
    pub animation_ms: f64,
    /// Minimum distance between the context menu and the viewport edge.
    pub menu_margin_px: f64,
    /// Padding around content for fit-to-content.
    pub fit_padding_px: f64,
    /// Bounded channel capacity for queued persistence calls.
    pub persist_queue_capacity: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            drag_slop_px: DEFAULT_DRAG_SLOP_PX,
            animation_ms: DEFAULT_ANIMATION_MS,
            menu_margin_px: DEFAULT_MENU_MARGIN_PX,
            fit_padding_px: DEFAULT_FIT_PADDING_PX,
            persist_queue_capacity: DEFAULT_PERSIST_QUEUE_CAPACITY,
        }
    }
}

impl CanvasConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// - `CANVAS_LONG_PRESS_MS`: default 450
    /// - `CANVAS_DRAG_SLOP_PX`: default 10
    /// - `CANVAS_ANIMATION_MS`: default 250
    /// - `CANVAS_MENU_MARGIN_PX`: default 8
    /// - `CANVAS_FIT_PADDING_PX`: default 48
    /// - `CANVAS_PERSIST_QUEUE_CAPACITY`: default 256
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            long_press_ms: env_parse("CANVAS_LONG_PRESS_MS", DEFAULT_LONG_PRESS_MS),
            drag_slop_px: env_parse("CANVAS_DRAG_SLOP_PX", DEFAULT_DRAG_SLOP_PX),
            animation_ms: env_parse("CANVAS_ANIMATION_MS", DEFAULT_ANIMATION_MS),
            menu_margin_px: env_parse("CANVAS_MENU_MARGIN_PX", DEFAULT_MENU_MARGIN_PX),
            fit_padding_px: env_parse("CANVAS_FIT_PADDING_PX", DEFAULT_FIT_PADDING_PX),
            persist_queue_capacity: env_parse("CANVAS_PERSIST_QUEUE_CAPACITY", DEFAULT_PERSIST_QUEUE_CAPACITY).max(1),
        }
    }
}

/// Parse `key` from the environment, returning `default` when unset or invalid.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
