//! Marker lifecycle: the observable marker list, distance bookkeeping and the
//! long-press / clear / recenter operations.
//!
//! All mutation happens on the thread that owns the workflow. Persistence is
//! dispatched through [`MarkerRepository`]; finished background results are
//! applied by [`MarkerWorkflow::poll`].

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::geometry::{CameraTarget, LatLng};
use crate::marker::{MarkerKey, MarkerRecord};
use crate::repository::MarkerRepository;
use crate::storage::{StorageError, StorageResult};
use crate::worker::{ActionPoll, PendingAction, ACTION_RESULT_POLL_INTERVAL};

mod observable;
mod units;

pub use crate::geodesy::geodesic_distance;
pub use observable::{Observable, SubscriptionId};
pub use units::format_kilometers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOperation {
    Load,
    Insert,
    Clear,
}

impl fmt::Display for PersistenceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Insert => "insert",
            Self::Clear => "clear",
        })
    }
}

/// A background persistence call that did not succeed.
///
/// The workflow keeps running after these; they are logged and handed back
/// from [`MarkerWorkflow::poll`] for callers that want to surface them.
#[derive(Debug, Error)]
pub enum PersistenceFailure {
    #[error("failed to {operation} markers: {source}")]
    Storage {
        operation: PersistenceOperation,
        #[source]
        source: StorageError,
    },
    #[error("marker worker for {operation} exited without a result")]
    WorkerLost { operation: PersistenceOperation },
}

impl PersistenceFailure {
    pub fn operation(&self) -> PersistenceOperation {
        match self {
            Self::Storage { operation, .. } | Self::WorkerLost { operation } => *operation,
        }
    }
}

struct PendingLoad {
    sequence: u64,
    generation: u64,
    action: PendingAction<StorageResult<Vec<MarkerRecord>>>,
}

struct PendingInsert {
    sequence: u64,
    generation: u64,
    record: MarkerRecord,
    action: PendingAction<StorageResult<()>>,
}

pub struct MarkerWorkflow {
    repository: MarkerRepository,
    markers: Observable<Vec<MarkerRecord>>,
    // Bumped by every clear; loads and inserts from older generations no
    // longer describe what the list should show.
    generation: u64,
    next_sequence: u64,
    last_applied_load: Option<u64>,
    // Records created since the last clear whose insert has not failed, by
    // insert sequence.
    session_records: Vec<(u64, MarkerRecord)>,
    pending_loads: Vec<PendingLoad>,
    pending_inserts: Vec<PendingInsert>,
    pending_clears: Vec<PendingAction<StorageResult<()>>>,
}

impl MarkerWorkflow {
    pub fn new(repository: MarkerRepository) -> Self {
        Self {
            repository,
            markers: Observable::default(),
            generation: 0,
            next_sequence: 0,
            last_applied_load: None,
            session_records: Vec::new(),
            pending_loads: Vec::new(),
            pending_inserts: Vec::new(),
            pending_clears: Vec::new(),
        }
    }

    pub fn markers(&self) -> &[MarkerRecord] {
        self.markers.get()
    }

    /// Observes the marker list. The observer receives the current list right
    /// away and the full list again after every change.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&Vec<MarkerRecord>) + 'static,
    ) -> SubscriptionId {
        self.markers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.markers.unsubscribe(id)
    }

    /// Requests every persisted record; the list is replaced once the load
    /// completes and is applied by [`poll`](Self::poll).
    pub fn load_markers(&mut self) {
        let sequence = self.take_sequence();
        tracing::debug!(sequence, generation = self.generation, "requesting marker load");
        self.pending_loads.push(PendingLoad {
            sequence,
            generation: self.generation,
            action: self.repository.load_all(),
        });
    }

    /// Creates a marker at `point`, shows it immediately and persists it in
    /// the background.
    pub fn record_marker_at(
        &mut self,
        point: LatLng,
        user_location: Option<LatLng>,
    ) -> MarkerRecord {
        let distance = user_location.map_or(0.0, |location| geodesic_distance(point, location));
        let record = MarkerRecord::at(point, distance);
        let sequence = self.take_sequence();

        let mut next = self.markers.get().clone();
        next.push(record);
        self.markers.replace(next);
        self.session_records.push((sequence, record));

        tracing::debug!(
            latitude = record.latitude,
            longitude = record.longitude,
            distance_meters = record.distance_meters,
            "recorded marker"
        );
        self.pending_inserts.push(PendingInsert {
            sequence,
            generation: self.generation,
            record,
            action: self.repository.insert(record),
        });
        record
    }

    pub fn clear_all_markers(&mut self) {
        self.generation += 1;
        self.session_records.clear();
        self.markers.replace(Vec::new());
        tracing::debug!(generation = self.generation, "clearing markers");
        self.pending_clears.push(self.repository.clear());
    }

    pub fn recenter_on(&self, user_location: Option<LatLng>) -> Option<CameraTarget> {
        user_location.map(CameraTarget::at_default_zoom)
    }

    pub fn is_idle(&self) -> bool {
        self.pending_loads.is_empty()
            && self.pending_inserts.is_empty()
            && self.pending_clears.is_empty()
    }

    /// Applies every background result that has finished since the last call.
    pub fn poll(&mut self) -> Vec<PersistenceFailure> {
        let mut failures = Vec::new();
        self.poll_inserts(&mut failures);
        self.poll_clears(&mut failures);
        self.poll_loads(&mut failures);
        failures
    }

    /// Waits for everything in flight, applying results as they arrive.
    pub fn settle(&mut self) -> Vec<PersistenceFailure> {
        let mut failures = self.poll();
        while !self.is_idle() {
            std::thread::sleep(ACTION_RESULT_POLL_INTERVAL);
            failures.extend(self.poll());
        }
        failures
    }

    fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn poll_inserts(&mut self, failures: &mut Vec<PersistenceFailure>) {
        let mut still_pending = Vec::with_capacity(self.pending_inserts.len());
        for insert in std::mem::take(&mut self.pending_inserts) {
            let failure = match insert.action.try_take() {
                ActionPoll::Pending => {
                    still_pending.push(insert);
                    continue;
                }
                ActionPoll::Ready(Ok(())) => {
                    tracing::trace!(sequence = insert.sequence, "marker insert committed");
                    continue;
                }
                ActionPoll::Ready(Err(source)) => PersistenceFailure::Storage {
                    operation: PersistenceOperation::Insert,
                    source,
                },
                ActionPoll::Lost => PersistenceFailure::WorkerLost {
                    operation: PersistenceOperation::Insert,
                },
            };
            tracing::warn!(
                latitude = insert.record.latitude,
                longitude = insert.record.longitude,
                error = %failure,
                "marker insert failed"
            );
            if insert.generation == self.generation {
                self.session_records
                    .retain(|(sequence, _)| *sequence != insert.sequence);
            }
            failures.push(failure);
        }
        self.pending_inserts = still_pending;
    }

    fn poll_clears(&mut self, failures: &mut Vec<PersistenceFailure>) {
        let mut still_pending = Vec::with_capacity(self.pending_clears.len());
        for clear in std::mem::take(&mut self.pending_clears) {
            let failure = match clear.try_take() {
                ActionPoll::Pending => {
                    still_pending.push(clear);
                    continue;
                }
                ActionPoll::Ready(Ok(())) => continue,
                ActionPoll::Ready(Err(source)) => PersistenceFailure::Storage {
                    operation: PersistenceOperation::Clear,
                    source,
                },
                ActionPoll::Lost => PersistenceFailure::WorkerLost {
                    operation: PersistenceOperation::Clear,
                },
            };
            tracing::warn!(error = %failure, "marker clear failed");
            failures.push(failure);
        }
        self.pending_clears = still_pending;
    }

    fn poll_loads(&mut self, failures: &mut Vec<PersistenceFailure>) {
        let mut still_pending = Vec::with_capacity(self.pending_loads.len());
        for load in std::mem::take(&mut self.pending_loads) {
            let failure = match load.action.try_take() {
                ActionPoll::Pending => {
                    still_pending.push(load);
                    continue;
                }
                ActionPoll::Ready(Ok(records)) => {
                    self.apply_load(load.sequence, load.generation, records);
                    continue;
                }
                ActionPoll::Ready(Err(source)) => PersistenceFailure::Storage {
                    operation: PersistenceOperation::Load,
                    source,
                },
                ActionPoll::Lost => PersistenceFailure::WorkerLost {
                    operation: PersistenceOperation::Load,
                },
            };
            tracing::warn!(error = %failure, "marker load failed; keeping current list");
            failures.push(failure);
        }
        self.pending_loads = still_pending;
    }

    fn apply_load(&mut self, sequence: u64, generation: u64, loaded: Vec<MarkerRecord>) {
        if generation != self.generation {
            tracing::debug!(sequence, generation, "discarding load issued before a clear");
            return;
        }
        if self.last_applied_load.is_some_and(|last| last > sequence) {
            tracing::debug!(sequence, "discarding load older than the applied one");
            return;
        }
        self.last_applied_load = Some(sequence);

        let mut merged = loaded;
        let mut index: HashMap<MarkerKey, usize> = merged
            .iter()
            .enumerate()
            .map(|(position, record)| (record.key(), position))
            .collect();
        for (_, record) in &self.session_records {
            match index.get(&record.key()) {
                Some(&position) => merged[position] = *record,
                None => {
                    index.insert(record.key(), merged.len());
                    merged.push(*record);
                }
            }
        }

        tracing::debug!(count = merged.len(), "marker list replaced from store");
        self.markers.replace(merged);
    }
}

impl fmt::Debug for MarkerWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerWorkflow")
            .field("markers", self.markers.get())
            .field("generation", &self.generation)
            .field("pending_loads", &self.pending_loads.len())
            .field("pending_inserts", &self.pending_inserts.len())
            .field("pending_clears", &self.pending_clears.len())
            .finish()
    }
}
