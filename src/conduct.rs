//! # Conductor adapter: the per-conductor receive loop.
//!
//! One adapter runs per registered conductor. It pulls electrons off the
//! conductor's receive stream, validates them, and forwards the valid ones
//! to the dispatcher's intake channel wrapped in an [`Instance`].
//!
//! - An invalid electron is answered immediately: a failure [`Properties`]
//!   with `start == end` goes back through `Conductor::complete`, an
//!   [`EventKind::ElectronRejected`] event is published, and the loop moves
//!   on.
//! - Forwarding to intake blocks when the dispatcher is saturated; that
//!   back-pressure throttles a conductor that outpaces the dispatcher. The
//!   send is aborted by cancellation.
//! - On dispatcher cancellation the adapter calls `Conductor::close`
//!   (idempotent) so the transport stops delivering.
//! - When the receive stream closes on its own the adapter publishes
//!   [`EventKind::ReceiverClosed`] and exits *without* closing the
//!   conductor: it does not restart itself, and an external supervisor may
//!   re-register it.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    conductor::ConductorRef,
    electron::Electron,
    error::ElectronError,
    events::{Bus, Event, EventKind},
    instance::Instance,
    properties::Properties,
};

/// Runs the receive loop for one conductor until cancellation or stream
/// closure.
pub(crate) async fn conduct(
    token: CancellationToken,
    bus: Bus,
    conductor: ConductorRef,
    intake: mpsc::Sender<Instance>,
) {
    let mut receiver = conductor.receive().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            next = receiver.recv() => {
                let Some(electron) = next else {
                    bus.publish(
                        Event::now(EventKind::ReceiverClosed)
                            .with_conductor(conductor.id()),
                    );
                    // The conductor stays open for re-registration.
                    return;
                };

                if !electron.validate() {
                    reject(&bus, &conductor, electron).await;
                    continue;
                }

                bus.publish(
                    Event::now(EventKind::ElectronReceived)
                        .with_electron(&electron.id)
                        .with_atom(&electron.atom_id)
                        .with_conductor(conductor.id()),
                );

                let electron_id = electron.id.clone();
                let atom_id = electron.atom_id.clone();
                let instance = Instance::new(electron, conductor.clone());

                tokio::select! {
                    _ = token.cancelled() => break,
                    sent = intake.send(instance) => {
                        if sent.is_err() {
                            // Intake gone; the dispatcher is shutting down.
                            break;
                        }
                        bus.publish(
                            Event::now(EventKind::ElectronQueued)
                                .with_electron(electron_id)
                                .with_atom(atom_id)
                                .with_conductor(conductor.id()),
                        );
                    }
                }
            }
        }
    }

    // Dispatcher shutdown: tell the transport to stop delivering.
    conductor.close().await;
}

/// Answers an invalid electron with a closed failure record.
async fn reject(bus: &Bus, conductor: &ConductorRef, electron: Electron) {
    let error = ElectronError::Rejected {
        reason: "invalid electron".into(),
    };
    let properties = Properties::failure(&electron.id, &electron.atom_id, error.clone());

    if let Err(err) = conductor.complete(properties).await {
        tracing::warn!(
            electron = %electron.id,
            conductor = %conductor.id(),
            error = %err,
            "failed to report validation rejection",
        );
    }

    bus.publish(
        Event::now(EventKind::ElectronRejected)
            .with_electron(&electron.id)
            .with_conductor(conductor.id())
            .with_error(error.to_string()),
    );
}
