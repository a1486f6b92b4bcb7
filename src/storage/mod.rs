use std::io;

use thiserror::Error;

use crate::marker::MarkerRecord;

mod memory;
mod sqlite;

pub use memory::InMemoryMarkerStore;
pub use sqlite::SqliteMarkerStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("marker store lock poisoned")]
    Poisoned,
    #[error("marker store unavailable: {message}")]
    Unavailable { message: String },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Durable table of marker records keyed by coordinate pair.
///
/// Implementations are shared with background workers, hence `Send + Sync`.
/// No coordinate validation is performed; any `f64` pair is accepted.
pub trait MarkerStore: Send + Sync {
    /// Every persisted record, in no particular order.
    fn load_all(&self) -> StorageResult<Vec<MarkerRecord>>;
    /// Insert-or-replace by coordinate key.
    fn insert(&self, record: &MarkerRecord) -> StorageResult<()>;
    /// Delete all records unconditionally.
    fn clear(&self) -> StorageResult<()>;
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every `MarkerStore` implementation must share.

    use super::*;

    pub(crate) fn starts_empty(store: &dyn MarkerStore) {
        assert!(store.load_all().expect("load should work").is_empty());
    }

    pub(crate) fn insert_then_load_returns_record(store: &dyn MarkerStore) {
        let record = MarkerRecord::new(10.0, 20.0, 1234.5);
        store.insert(&record).expect("insert should work");

        let loaded = store.load_all().expect("load should work");
        assert_eq!(loaded, vec![record]);
    }

    pub(crate) fn insert_replaces_same_coordinates(store: &dyn MarkerStore) {
        store
            .insert(&MarkerRecord::new(10.0, 20.0, 1.0))
            .expect("first insert should work");
        store
            .insert(&MarkerRecord::new(10.0, 20.0, 2.0))
            .expect("second insert should work");
        store
            .insert(&MarkerRecord::new(10.0, 20.5, 3.0))
            .expect("third insert should work");

        let mut loaded = store.load_all().expect("load should work");
        loaded.sort_by(|a, b| a.longitude.total_cmp(&b.longitude));
        assert_eq!(
            loaded,
            vec![
                MarkerRecord::new(10.0, 20.0, 2.0),
                MarkerRecord::new(10.0, 20.5, 3.0)
            ]
        );
    }

    pub(crate) fn clear_removes_everything(store: &dyn MarkerStore) {
        store
            .insert(&MarkerRecord::new(1.0, 2.0, 0.0))
            .expect("insert should work");
        store
            .insert(&MarkerRecord::new(3.0, 4.0, 0.0))
            .expect("insert should work");
        store.clear().expect("clear should work");
        assert!(store.load_all().expect("load should work").is_empty());

        store.clear().expect("clearing an empty store should work");
    }

    pub(crate) fn accepts_out_of_range_coordinates(store: &dyn MarkerStore) {
        let record = MarkerRecord::new(512.0, -9000.25, 0.0);
        store.insert(&record).expect("insert should work");
        assert_eq!(store.load_all().expect("load should work"), vec![record]);
    }
}
