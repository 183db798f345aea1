//! # Error types used by the covalent runtime.
//!
//! This module defines three error enums, one per failure domain:
//!
//! - [`ElectronError`] failures while processing a single electron.
//! - [`ConductorError`] transport failures raised by conductors.
//! - [`DispatchError`] errors raised by the dispatcher runtime itself.
//!
//! All types provide `as_label` helpers for metrics.
//! [`ElectronError`] additionally distinguishes retryable failures.

use std::time::Duration;

use thiserror::Error;

/// # Errors produced while processing one electron.
///
/// These travel back to the original requester inside
/// [`Properties`](crate::Properties) via `Conductor::complete`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElectronError {
    /// The electron failed validation before execution.
    #[error("invalid electron: {reason}")]
    Rejected {
        /// What was malformed.
        reason: String,
    },

    /// The atom's process method returned an error.
    #[error("execution failed: {reason}")]
    Fail {
        /// Error reported by the atom.
        reason: String,
    },

    /// Execution exceeded the electron's timeout.
    #[error("deadline exceeded after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The atom panicked; the panic was trapped and converted.
    #[error("atom panicked: {reason}")]
    Panic {
        /// Panic payload, when it carried a message.
        reason: String,
    },

    /// Execution was cut short by dispatcher cancellation.
    ///
    /// This is **not an error** in the traditional sense, but signals
    /// intentional termination.
    #[error("dispatcher canceled")]
    Canceled,
}

impl ElectronError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ElectronError::Rejected { .. } => "electron_rejected",
            ElectronError::Fail { .. } => "electron_failed",
            ElectronError::Timeout { .. } => "electron_timeout",
            ElectronError::Panic { .. } => "electron_panic",
            ElectronError::Canceled => "electron_canceled",
        }
    }

    /// Indicates whether redelivering the electron could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ElectronError::Fail { .. } | ElectronError::Timeout { .. } | ElectronError::Canceled
        )
    }
}

/// # Transport errors raised by conductor implementations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConductorError {
    /// The conductor has been closed and can no longer carry messages.
    #[error("conductor closed")]
    Closed,

    /// Delivering an outbound electron failed.
    #[error("send failed: {reason}")]
    Send {
        /// Transport-level cause.
        reason: String,
    },

    /// Reporting a completion back to the requester failed.
    #[error("complete failed: {reason}")]
    Complete {
        /// Transport-level cause.
        reason: String,
    },
}

impl ConductorError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConductorError::Closed => "conductor_closed",
            ConductorError::Send { .. } => "conductor_send_failed",
            ConductorError::Complete { .. } => "conductor_complete_failed",
        }
    }
}

/// # Errors produced by the dispatcher runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Operation attempted on a cancelled dispatcher.
    #[error("dispatcher canceled")]
    Canceled,

    /// The registration channel is gone; the dispatcher cannot accept
    /// further registrations.
    #[error("registration channel closed")]
    RegistrationClosed,

    /// Shutdown grace period was exceeded; some workers were still running
    /// when the dispatcher gave up waiting.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the workers that did not shut down in time.
        stuck: Vec<String>,
    },
}

impl DispatchError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Canceled => "dispatch_canceled",
            DispatchError::RegistrationClosed => "dispatch_registration_closed",
            DispatchError::GraceExceeded { .. } => "dispatch_grace_exceeded",
        }
    }
}
