use std::sync::Mutex;

use uuid::Uuid;

use super::*;
use crate::store::{MemoryStore, PlacedItem, StoreError};

// =============================================================================
// Helpers
// =============================================================================

/// Records every call and fails the ones whose id is in `failing`.
#[derive(Default)]
struct RecordingStore {
    calls: Mutex<Vec<PersistCommand>>,
    failing: Vec<NodeId>,
}

impl RecordingStore {
    fn calls(&self) -> Vec<PersistCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ItemStore for RecordingStore {
    async fn load_placed_items(&self) -> Result<Vec<PlacedItem>, StoreError> {
        Ok(Vec::new())
    }

    async fn save_position(&self, id: NodeId, position: Point) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(PersistCommand::SavePosition { id, position });
        if self.failing.contains(&id) {
            return Err(StoreError::Unavailable("offline".into()));
        }
        Ok(())
    }

    async fn clear_position(&self, id: NodeId) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(PersistCommand::ClearPosition { id });
        if self.failing.contains(&id) {
            return Err(StoreError::Backend("boom".into()));
        }
        Ok(())
    }
}

// =============================================================================
// PersistQueue
// =============================================================================

#[test]
fn enqueue_sends_to_channel() {
    let (tx, mut rx) = mpsc::channel::<PersistCommand>(4);
    let queue = PersistQueue::new(tx);
    let id = Uuid::new_v4();
    queue.enqueue(PersistCommand::ClearPosition { id }).unwrap();
    assert_eq!(rx.try_recv().unwrap(), PersistCommand::ClearPosition { id });
}

#[test]
fn enqueue_full_channel_reports_queue_full() {
    let (tx, _rx) = mpsc::channel::<PersistCommand>(1);
    let queue = PersistQueue::new(tx);
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    queue.enqueue(PersistCommand::ClearPosition { id: first }).unwrap();
    let err = queue.enqueue(PersistCommand::ClearPosition { id: second }).unwrap_err();
    assert_eq!(err, PersistError::QueueFull(second));
}

#[test]
fn enqueue_closed_channel_reports_queue_closed() {
    let (tx, rx) = mpsc::channel::<PersistCommand>(1);
    drop(rx);
    let queue = PersistQueue::new(tx);
    let id = Uuid::new_v4();
    let err = queue.enqueue(PersistCommand::SavePosition { id, position: Point::default() }).unwrap_err();
    assert_eq!(err, PersistError::QueueClosed(id));
}

#[test]
fn command_id_covers_both_variants() {
    let id = Uuid::new_v4();
    assert_eq!(PersistCommand::ClearPosition { id }.id(), id);
    assert_eq!(PersistCommand::SavePosition { id, position: Point::default() }.id(), id);
}

// =============================================================================
// Worker
// =============================================================================

#[tokio::test]
async fn worker_applies_commands_in_order() {
    let store = Arc::new(RecordingStore::default());
    let (queue, handle) = spawn_persistence_worker(store.clone(), 16);
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let expected = vec![
        PersistCommand::SavePosition { id: a, position: Point::new(1.0, 2.0) },
        PersistCommand::SavePosition { id: b, position: Point::new(3.0, 4.0) },
        PersistCommand::ClearPosition { id: a },
    ];
    for cmd in &expected {
        queue.enqueue(cmd.clone()).unwrap();
    }
    drop(queue);
    handle.await.unwrap();
    assert_eq!(store.calls(), expected);
}

#[tokio::test]
async fn worker_survives_store_failures() {
    let bad = Uuid::new_v4();
    let good = Uuid::new_v4();
    let store = Arc::new(RecordingStore { failing: vec![bad], ..Default::default() });
    let (queue, handle) = spawn_persistence_worker(store.clone(), 16);
    queue.enqueue(PersistCommand::SavePosition { id: bad, position: Point::default() }).unwrap();
    queue.enqueue(PersistCommand::ClearPosition { id: bad }).unwrap();
    queue.enqueue(PersistCommand::SavePosition { id: good, position: Point::new(9.0, 9.0) }).unwrap();
    drop(queue);
    handle.await.unwrap();
    assert_eq!(store.calls().len(), 3);
}

#[tokio::test]
async fn worker_writes_through_to_memory_store() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    store.insert(id, crate::camera::Size::new(10.0, 10.0), None).await;
    let (queue, handle) = spawn_persistence_worker(Arc::new(store.clone()), 0);
    queue.enqueue(PersistCommand::SavePosition { id, position: Point::new(7.0, 8.0) }).unwrap();
    drop(queue);
    handle.await.unwrap();
    assert_eq!(store.position(&id).await, Some(Point::new(7.0, 8.0)));
}
