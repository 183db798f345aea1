//! # Atom adapter: the per-kind fan-out loop.
//!
//! One adapter runs per registered atom kind and owns that kind's instance
//! channel. For every routed instance it replicates the prototype and hands
//! the fresh atom to the executor, so no two electrons ever share atom
//! state.
//!
//! Executions run one at a time on the adapter; a panicking atom is trapped
//! inside [`Instance::execute`] and does not tear the adapter down.
//! System-level parallelism for one kind comes from conductors balancing
//! electrons across dispatcher nodes.
//!
//! Channel closure means the kind was re-registered: the replacement
//! adapter owns the new channel, and this one drains what was already
//! routed to it, publishes [`EventKind::AtomChannelClosed`], and exits.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    atom::AtomRef,
    events::{Bus, Event, EventKind},
    instance::Instance,
};

/// Runs the fan-out loop for one atom kind until cancellation or channel
/// closure.
pub(crate) async fn fan_out(
    token: CancellationToken,
    bus: Bus,
    prototype: AtomRef,
    mut instances: mpsc::Receiver<Instance>,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            next = instances.recv() => {
                let Some(instance) = next else {
                    bus.publish(
                        Event::now(EventKind::AtomChannelClosed)
                            .with_atom(prototype.id()),
                    );
                    return;
                };

                let replica = prototype.replicate();
                instance.execute(&token, &bus, replica).await;
            }
        }
    }
}
