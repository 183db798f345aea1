//! Event bus for broadcasting runtime events.
//!
//! [`Bus`] carries advisory [`Event`]s from the dispatcher loops and
//! adapters to whatever consumer is attached. Emission never blocks: with
//! no subscriber the event is dropped and counted, so electron processing
//! can never stall on telemetry.
//!
//! - [`Bus::publish`] sends to all subscribers, or counts the event as
//!   dropped when none are attached.
//! - [`Bus::subscribe`] creates a new receiver for consuming events.
//! - [`Bus::dropped`] reports how many events were discarded unobserved,
//!   which distinguishes "nothing happened" from "nobody was listening".
//!
//! A subscriber that falls behind the channel capacity loses its oldest
//! events (`broadcast` lag semantics); those are not counted here, the
//! lagging receiver observes the loss itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::events::Event;

/// Broadcast channel for runtime events with a drop counter.
///
/// Cheap to clone; clones share the same channel and counter.
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    dropped: Arc<AtomicU64>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publishes an event to all subscribers.
    ///
    /// With no subscriber attached the event is dropped and counted;
    /// correctness never depends on delivery.
    pub fn publish(&self, ev: Event) {
        if self.tx.send(ev).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Subscribes to the bus and returns a new receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of currently attached subscribers.
    pub fn subscribers(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Number of events published while no subscriber was attached.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
