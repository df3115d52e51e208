//! Spatial canvas engine for a notes app.
//!
//! Notes live on an unbounded 2D surface that the user pans and zooms. This
//! crate owns everything between raw pointer input and the per-frame state a
//! host renders: the viewport transform, gesture arbitration, node dragging,
//! z-order and pinning, the per-node context menu, and the layout math for
//! placing and framing nodes. It never draws and never talks to storage
//! directly; committed positions are handed to a background persistence
//! worker through a bounded queue.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::CanvasEngine`], data inputs, menu actions, frame snapshots |
//! | [`gesture`] | Pointer, wheel, and clock handlers (the gesture arbiter) |
//! | [`input`] | Pointer types and the gesture state machine |
//! | [`camera`] | Geometry primitives and the viewport transform math |
//! | [`viewport`] | Live transform, pinch lifecycle, zoom snapping, animations |
//! | [`anim`] | Easing curves and transform tweens |
//! | [`registry`] | Placed nodes, stacking order, pin flags, hit-testing |
//! | [`drag`] | The single live drag session |
//! | [`menu`] | Context menu rows and on-screen placement |
//! | [`layout`] | Insertion point, bounding box, fit-to-content solve |
//! | [`store`] | Item store boundary and an in-memory implementation |
//! | [`persistence`] | Bounded queue and worker that drain into the store |
//! | [`config`] | Environment-driven tunables |
//! | [`consts`] | Fixed numeric limits (zoom bounds, menu offset) |

pub mod anim;
pub mod camera;
pub mod config;
pub mod consts;
pub mod drag;
pub mod engine;
pub mod gesture;
pub mod input;
pub mod layout;
pub mod menu;
pub mod persistence;
pub mod registry;
pub mod store;
pub mod viewport;

pub use camera::{Point, Rect, Size, ViewportTransform};
pub use config::CanvasConfig;
pub use engine::{Action, CanvasEngine, FrameState, MenuFrame};
pub use input::{GesturePhase, PointerId, WheelDelta};
pub use menu::{MenuAction, MenuItem};
pub use persistence::{PersistCommand, PersistError, PersistQueue, spawn_persistence_worker};
pub use registry::{CanvasNode, NodeId};
pub use store::{ItemStore, MemoryStore, PlacedItem, StoreError};
