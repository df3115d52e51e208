//! Shared numeric constants for the canvas engine.

// ── Zoom ────────────────────────────────────────────────────────

/// Hard lower zoom bound; scale never drops below this, even mid-pinch.
pub const MIN_SCALE: f64 = 0.1;

/// Hard upper zoom bound; scale never exceeds this, even mid-pinch.
pub const MAX_SCALE: f64 = 5.0;

/// Pinches that end below this scale animate back up to it.
pub const SNAP_MIN_SCALE: f64 = 0.5;

/// Pinches that end above this scale animate back down to it.
pub const SNAP_MAX_SCALE: f64 = 3.0;

// ── Geometry ────────────────────────────────────────────────────

/// Minimum bounding-box extent used by fit-to-content, in canvas units.
pub const MIN_FIT_EXTENT: f64 = 1.0;

/// Vertical gap between the long-press anchor and the context menu, in screen pixels.
pub const MENU_ANCHOR_OFFSET_PX: f64 = 12.0;

// ── Input ───────────────────────────────────────────────────────

/// Pointer distance in screen pixels below which two pinch fingers are
/// treated as coincident and scale updates are skipped.
pub const MIN_PINCH_DISTANCE_PX: f64 = 1.0;
