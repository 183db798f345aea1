//! # Instance: one electron bonded to one fresh atom replica.
//!
//! An [`Instance`] is the ephemeral pairing the dispatcher routes around:
//! the electron, the conductor it arrived on, and — once an atom adapter
//! picks it up — the in-progress [`Properties`] record. It lives from the
//! moment a conductor adapter accepts the electron until the outcome has
//! been reported through `Conductor::complete`.
//!
//! # Execution
//!
//! ```text
//!   ┌──────────┐   bond    ┌───────────────┐
//!   │ Instance │ ────────► │ fresh replica │
//!   └────┬─────┘           └───────┬───────┘
//!        │    child token + timeout│
//!        ▼                         ▼
//!    Properties ◄───── result / error / panic / deadline
//!        │
//!   conductor.complete(properties)
//! ```
//!
//! - The atom runs on its own spawned task so a panic is trapped at the join
//!   and converted into an error instead of tearing the adapter down.
//! - If the electron carries a non-zero timeout, the join is wrapped in
//!   [`tokio::time::timeout`]; on expiry the child token is cancelled, the
//!   task is aborted, and the recorded error is the deadline.
//! - Errors returned by `complete` are emitted as events and do not
//!   propagate.

use tokio::{task::JoinError, time};
use tokio_util::sync::CancellationToken;

use crate::{
    atom::Atom,
    conductor::ConductorRef,
    electron::Electron,
    error::ElectronError,
    events::{Bus, Event, EventKind},
    properties::Properties,
};

/// One electron bound to one conductor for a single execution.
pub(crate) struct Instance {
    pub(crate) electron: Electron,
    pub(crate) conductor: ConductorRef,
    properties: Option<Properties>,
}

impl Instance {
    pub(crate) fn new(electron: Electron, conductor: ConductorRef) -> Self {
        Self {
            electron,
            conductor,
            properties: None,
        }
    }

    /// Bonds the fresh atom replica to this instance and drives it to an
    /// outcome, then reports through the conductor.
    pub(crate) async fn execute(mut self, token: &CancellationToken, bus: &Bus, atom: Box<dyn Atom>) {
        let atom_id = atom.id().to_string();
        self.properties = Some(Properties::open(&self.electron.id, &atom_id));

        let child = token.child_token();
        let payload = self.electron.payload.clone().unwrap_or_default();

        let ctx = child.clone();
        let mut atom = atom;
        let mut handle = tokio::spawn(async move { atom.process(ctx, payload).await });

        let outcome = match self.electron.timeout.filter(|d| !d.is_zero()) {
            Some(deadline) => match time::timeout(deadline, &mut handle).await {
                Ok(join) => collapse(join),
                Err(_elapsed) => {
                    child.cancel();
                    handle.abort();
                    Err(ElectronError::Timeout { timeout: deadline })
                }
            },
            None => collapse(handle.await),
        };

        let mut properties = match self.properties.take() {
            Some(p) => p,
            None => Properties::open(&self.electron.id, &atom_id),
        };

        if let Err(err) = &outcome {
            bus.publish(
                Event::now(EventKind::ExecutionFailed)
                    .with_electron(&self.electron.id)
                    .with_atom(&atom_id)
                    .with_conductor(self.conductor.id())
                    .with_error(err.to_string()),
            );
        }
        properties.finish(outcome);

        if let Err(err) = self.conductor.complete(properties).await {
            tracing::warn!(
                electron = %self.electron.id,
                conductor = %self.conductor.id(),
                error = %err,
                "completion report rejected by conductor",
            );
            bus.publish(
                Event::now(EventKind::CompleteFailed)
                    .with_electron(&self.electron.id)
                    .with_atom(&atom_id)
                    .with_conductor(self.conductor.id())
                    .with_error(err.to_string()),
            );
        }
    }
}

/// Converts a join outcome into the electron's outcome, trapping panics.
fn collapse(
    join: Result<Result<Vec<u8>, ElectronError>, JoinError>,
) -> Result<Vec<u8>, ElectronError> {
    match join {
        Ok(outcome) => outcome,
        Err(err) if err.is_panic() => {
            let panic = err.into_panic();
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "opaque panic payload".into());
            Err(ElectronError::Panic { reason })
        }
        Err(_) => Err(ElectronError::Canceled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collapse_traps_panic_message() {
        let join = tokio::spawn(async { panic!("boom") }).await;
        let out = collapse(join.map(|_: ()| Ok(Vec::new())));
        assert_eq!(
            out,
            Err(ElectronError::Panic {
                reason: "boom".into()
            })
        );
    }

    #[tokio::test]
    async fn collapse_passes_results_through() {
        let join = tokio::spawn(async { Ok::<_, ElectronError>(b"out".to_vec()) }).await;
        assert_eq!(collapse(join), Ok(b"out".to_vec()));
    }
}
