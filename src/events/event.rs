//! # Runtime events emitted by the dispatcher and its adapters.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registration events**: conductors and atoms entering the routing table
//! - **Electron lifecycle events**: receive, reject, queue, route
//! - **Execution events**: failures surfaced while an instance ran
//! - **Shutdown events**: stream closures and dispatcher cancellation
//!
//! The [`Event`] struct carries the ids involved — electron, atom kind,
//! conductor — plus an optional error message and a timestamp.
//!
//! ## Event flow examples
//!
//! ### Happy path
//! ```text
//! ElectronReceived → ElectronQueued → ElectronRouted → [complete]
//! ```
//!
//! ### Unknown atom kind
//! ```text
//! ElectronReceived → ElectronQueued → AtomMissing   (no complete; the
//! conductor redelivers or times out on its own)
//! ```
//!
//! ## Example
//! ```rust
//! use covalent::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::ElectronRejected)
//!     .with_electron("e-17")
//!     .with_conductor("amqp")
//!     .with_error("invalid electron");
//!
//! assert_eq!(ev.kind, EventKind::ElectronRejected);
//! assert_eq!(ev.electron.as_deref(), Some("e-17"));
//! ```

use std::fmt;
use std::time::SystemTime;

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration events ===
    /// A conductor was registered and its adapter started.
    ConductorRegistered,
    /// An atom kind was registered and inserted into the routing table.
    AtomRegistered,
    /// A registration failed validation and was skipped.
    RegistrationRejected,

    // === Electron lifecycle events ===
    /// A valid electron was pulled from a conductor.
    ElectronReceived,
    /// An inbound electron failed validation; a failure record was returned
    /// through its conductor.
    ElectronRejected,
    /// An electron was forwarded onto the dispatcher intake channel.
    ElectronQueued,
    /// An electron was pushed onto its atom kind's channel.
    ElectronRouted,
    /// An electron named an atom kind with no route; it was dropped for
    /// another dispatcher to serve.
    AtomMissing,

    // === Execution events ===
    /// An instance finished with an error (atom failure, timeout, or panic).
    ExecutionFailed,
    /// The conductor rejected the completion record.
    CompleteFailed,

    // === Shutdown events ===
    /// A conductor's receive stream closed; its adapter exited.
    ReceiverClosed,
    /// An atom kind's channel closed; its adapter exited. Happens when the
    /// kind is re-registered and the old adapter drains out.
    AtomChannelClosed,
    /// Dispatcher cancellation was triggered.
    ShutdownRequested,
}

impl EventKind {
    /// Returns a short human-readable description of the event kind.
    pub fn message(&self) -> &'static str {
        match self {
            EventKind::ConductorRegistered => "conductor registered",
            EventKind::AtomRegistered => "atom registered",
            EventKind::RegistrationRejected => "invalid registration",
            EventKind::ElectronReceived => "electron received",
            EventKind::ElectronRejected => "invalid electron",
            EventKind::ElectronQueued => "electron queued",
            EventKind::ElectronRouted => "pushed electron to atom",
            EventKind::AtomMissing => "not registered",
            EventKind::ExecutionFailed => "error executing atom",
            EventKind::CompleteFailed => "error completing electron",
            EventKind::ReceiverClosed => "receiver closed",
            EventKind::AtomChannelClosed => "atom receiver closed",
            EventKind::ShutdownRequested => "shutdown requested",
        }
    }
}

/// Runtime event with optional metadata.
///
/// Carries the identities involved in a lifecycle transition plus an error
/// message when the transition is a failure.
#[derive(Debug, Clone)]
pub struct Event {
    /// Wall-clock timestamp (use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Electron id, if applicable.
    pub electron: Option<String>,
    /// Atom kind, if applicable.
    pub atom: Option<String>,
    /// Conductor id, if applicable.
    pub conductor: Option<String>,
    /// Error message, if the event represents a failure.
    pub error: Option<String>,
}

impl Event {
    /// Creates a new event of the given kind stamped with the current time.
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            electron: None,
            atom: None,
            conductor: None,
            error: None,
        }
    }

    /// Attaches an electron id.
    pub fn with_electron(mut self, id: impl Into<String>) -> Self {
        self.electron = Some(id.into());
        self
    }

    /// Attaches an atom kind.
    pub fn with_atom(mut self, id: impl Into<String>) -> Self {
        self.atom = Some(id.into());
        self
    }

    /// Attaches a conductor id.
    pub fn with_conductor(mut self, id: impl Into<String>) -> Self {
        self.conductor = Some(id.into());
        self
    }

    /// Attaches an error message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.message())?;
        if let Some(electron) = &self.electron {
            write!(f, " electron={electron}")?;
        }
        if let Some(atom) = &self.atom {
            write!(f, " atom={atom}")?;
        }
        if let Some(conductor) = &self.conductor {
            write!(f, " conductor={conductor}")?;
        }
        if let Some(error) = &self.error {
            write!(f, " error={error:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_fill_metadata() {
        let ev = Event::now(EventKind::ElectronRouted)
            .with_electron("e1")
            .with_atom("echo")
            .with_conductor("mem");

        assert_eq!(ev.kind, EventKind::ElectronRouted);
        assert_eq!(ev.electron.as_deref(), Some("e1"));
        assert_eq!(ev.atom.as_deref(), Some("echo"));
        assert_eq!(ev.conductor.as_deref(), Some("mem"));
        assert!(ev.error.is_none());
    }

    #[test]
    fn display_includes_message_and_ids() {
        let ev = Event::now(EventKind::AtomMissing)
            .with_electron("e1")
            .with_atom("echo");
        assert_eq!(ev.to_string(), "not registered electron=e1 atom=echo");
    }
}
