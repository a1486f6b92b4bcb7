//! Background dispatch for blocking work.
//!
//! Each action runs on its own thread and hands its result back over a
//! channel. The owning (interactive) thread collects results by polling, so
//! nothing produced by a worker is applied anywhere but on that thread.

use std::sync::mpsc;
use std::time::Duration;

/// Interval the console loop waits between polls while idle.
pub const ACTION_RESULT_POLL_INTERVAL: Duration = Duration::from_millis(24);

#[derive(Debug, PartialEq)]
pub enum ActionPoll<T> {
    Ready(T),
    Pending,
    /// The worker went away without producing a result (it panicked).
    Lost,
}

/// Result slot of an action running on a worker thread.
///
/// Dropping it detaches the action (fire-and-forget); the work still runs to
/// completion.
#[derive(Debug)]
pub struct PendingAction<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> PendingAction<T> {
    pub fn try_take(&self) -> ActionPoll<T> {
        match self.rx.try_recv() {
            Ok(result) => ActionPoll::Ready(result),
            Err(mpsc::TryRecvError::Empty) => ActionPoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => ActionPoll::Lost,
        }
    }

    /// Blocks until the worker finishes. `None` when it panicked.
    pub fn wait(self) -> Option<T> {
        self.rx.recv().ok()
    }
}

pub fn spawn_worker_action<T, W>(work: W) -> PendingAction<T>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();
    std::thread::spawn(move || {
        let result = work();
        let _ = tx.send(result);
    });
    PendingAction { rx }
}
