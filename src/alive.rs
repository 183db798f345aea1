//! # Tracks currently alive (running) dispatcher workers.
//!
//! [`AliveTracker`] maintains the set of worker names the dispatcher has
//! spawned and not yet seen exit: the registration and distribution loops,
//! one entry per conductor adapter, and one per atom adapter.
//!
//! Workers are marked alive when they are spawned and removed when their
//! future completes, so the set is exact on every exit path — including
//! cancellation, where no event is published.
//!
//! # High-level architecture
//!
//! ```text
//!            ┌───────────────────────────┐
//!  spawn ──► │ insert(name) before spawn │
//!            └─────────────┬─────────────┘
//!                    worker future
//!                          ▼
//!            ┌───────────────────────────┐
//!            │   remove(name) on exit    │
//!            └─────────────┬─────────────┘
//!                     snapshot()
//!                          ▼
//!   ┌──────────────────────────────────────────┐
//!   │ Dispatcher::wait (stuck-worker reporting)│
//!   └──────────────────────────────────────────┘
//! ```
//!
//! The [`Dispatcher`](crate::Dispatcher) queries `snapshot()` when the
//! shutdown grace period expires to report which workers were stuck.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Tracks which dispatcher workers are currently alive (running).
///
/// Insertions happen synchronously at spawn time, so a worker is visible in
/// the snapshot as soon as its registration has been applied. Names are
/// reference-counted: re-registering an atom kind briefly runs two adapters
/// under the same name, and the old one's exit must not erase the new one.
#[derive(Clone, Default)]
pub(crate) struct AliveTracker {
    inner: Arc<Mutex<HashMap<String, usize>>>,
}

impl AliveTracker {
    /// Creates a new, empty tracker.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks a worker alive.
    pub(crate) fn insert(&self, name: impl Into<String>) {
        *self
            .inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(name.into())
            .or_insert(0) += 1;
    }

    /// Marks one worker under `name` as exited.
    pub(crate) fn remove(&self, name: &str) {
        let mut workers = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(count) = workers.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                workers.remove(name);
            }
        }
    }

    /// Returns a sorted snapshot of currently alive worker names.
    pub(crate) fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_inserts_and_removes() {
        let alive = AliveTracker::new();
        alive.insert("atom:echo");
        alive.insert("conductor:mem");
        assert_eq!(alive.snapshot(), vec!["atom:echo", "conductor:mem"]);

        alive.remove("atom:echo");
        assert_eq!(alive.snapshot(), vec!["conductor:mem"]);
    }

    #[test]
    fn same_name_is_reference_counted() {
        let alive = AliveTracker::new();
        alive.insert("atom:versioned");
        alive.insert("atom:versioned");

        alive.remove("atom:versioned");
        assert_eq!(alive.snapshot(), vec!["atom:versioned"]);

        alive.remove("atom:versioned");
        assert!(alive.snapshot().is_empty());
    }
}
