use std::sync::Arc;

use crate::marker::MarkerRecord;
use crate::storage::{MarkerStore, StorageResult};
use crate::worker::{spawn_worker_action, PendingAction};

/// Runs every `MarkerStore` call on a background worker.
///
/// Adds nothing but dispatch: results (including failures) come back
/// unchanged through the returned `PendingAction`.
#[derive(Clone)]
pub struct MarkerRepository {
    store: Arc<dyn MarkerStore>,
}

impl MarkerRepository {
    pub fn new(store: Arc<dyn MarkerStore>) -> Self {
        Self { store }
    }

    pub fn load_all(&self) -> PendingAction<StorageResult<Vec<MarkerRecord>>> {
        let store = Arc::clone(&self.store);
        spawn_worker_action(move || store.load_all())
    }

    pub fn insert(&self, record: MarkerRecord) -> PendingAction<StorageResult<()>> {
        let store = Arc::clone(&self.store);
        spawn_worker_action(move || store.insert(&record))
    }

    pub fn clear(&self) -> PendingAction<StorageResult<()>> {
        let store = Arc::clone(&self.store);
        spawn_worker_action(move || store.clear())
    }
}

impl std::fmt::Debug for MarkerRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerRepository").finish_non_exhaustive()
    }
}
