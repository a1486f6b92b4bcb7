use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{MarkerStore, StorageError, StorageResult};
use crate::marker::{MarkerKey, MarkerRecord};

/// Non-durable store, used for `--in-memory` sessions and tests.
#[derive(Debug, Default)]
pub struct InMemoryMarkerStore {
    records: Mutex<BTreeMap<MarkerKey, MarkerRecord>>,
}

impl InMemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for InMemoryMarkerStore {
    fn load_all(&self) -> StorageResult<Vec<MarkerRecord>> {
        let records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(records.values().copied().collect())
    }

    fn insert(&self, record: &MarkerRecord) -> StorageResult<()> {
        let mut records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        records.insert(record.key(), *record);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.records
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .clear();
        Ok(())
    }
}
