//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the dispatcher loops, conductor
//! adapters, atom adapters, and the executor.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Dispatcher` (registration + distribution loops),
//!   conductor adapters, atom adapters, `Instance::execute`.
//! - **Consumers**: external only, via `Dispatcher::subscribe()`. Events are
//!   advisory; no component's correctness depends on observing them.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
