//! Persistence worker: fire-and-forget position sync from canvas to store.
//!
//! DESIGN
//! ======
//! The engine never awaits the store. It pushes commands onto a bounded
//! queue with `try_send` and moves on; a background task drains the queue in
//! order and calls the store. Completions never touch canvas state.
//!
//! ERROR HANDLING
//! ==============
//! Store failures are logged and dropped. There is no retry: the next
//! successful save for the same item reconciles it. A full or closed queue
//! is reported to the caller, which logs it.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::camera::Point;
use crate::registry::NodeId;
use crate::store::ItemStore;

/// A queued call to the item store.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistCommand {
    SavePosition { id: NodeId, position: Point },
    ClearPosition { id: NodeId },
}

impl PersistCommand {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::SavePosition { id, .. } | Self::ClearPosition { id } => *id,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PersistError {
    #[error("persist queue full; dropping command for {0}")]
    QueueFull(NodeId),
    #[error("persist queue closed; dropping command for {0}")]
    QueueClosed(NodeId),
}

/// Sending half of the persistence queue, held by the engine.
#[derive(Debug, Clone)]
pub struct PersistQueue {
    tx: mpsc::Sender<PersistCommand>,
}

impl PersistQueue {
    #[must_use]
    pub fn new(tx: mpsc::Sender<PersistCommand>) -> Self {
        Self { tx }
    }

    /// Best-effort, non-blocking enqueue.
    ///
    /// # Errors
    ///
    /// Returns `QueueFull` or `QueueClosed` when the command was dropped.
    pub fn enqueue(&self, command: PersistCommand) -> Result<(), PersistError> {
        let id = command.id();
        match self.tx.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(PersistError::QueueFull(id)),
            Err(TrySendError::Closed(_)) => Err(PersistError::QueueClosed(id)),
        }
    }
}

/// Spawn the worker that drains the queue into `store`.
///
/// Must be called from within a tokio runtime. The task exits once every
/// `PersistQueue` clone has been dropped and the queue is empty.
#[must_use]
pub fn spawn_persistence_worker(store: Arc<dyn ItemStore>, capacity: usize) -> (PersistQueue, JoinHandle<()>) {
    let capacity = capacity.max(1);
    let (tx, mut rx) = mpsc::channel::<PersistCommand>(capacity);
    info!(queue_capacity = capacity, "canvas persistence worker configured");

    let handle = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            apply_command(store.as_ref(), command).await;
        }
        debug!("canvas persistence worker stopped");
    });

    (PersistQueue::new(tx), handle)
}

async fn apply_command(store: &dyn ItemStore, command: PersistCommand) {
    match command {
        PersistCommand::SavePosition { id, position } => {
            if let Err(e) = store.save_position(id, position).await {
                warn!(error = %e, node_id = %id, x = position.x, y = position.y, "save position failed");
            }
        }
        PersistCommand::ClearPosition { id } => {
            if let Err(e) = store.clear_position(id).await {
                warn!(error = %e, node_id = %id, "clear position failed");
            }
        }
    }
}
