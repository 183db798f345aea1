//! # Conductor: the transport adapter contract.
//!
//! A [`Conductor`] bridges the dispatcher to whatever substrate delivers
//! electrons — a message queue, a pub/sub topic, an in-memory channel. The
//! dispatcher only ever pulls from [`receive`](Conductor::receive) and
//! reports through [`complete`](Conductor::complete); the
//! [`send`](Conductor::send) side exists for external producers injecting
//! work and is never called by the dispatcher itself.
//!
//! Conductors are expected to load-balance electrons across every
//! dispatcher node that registered the requested atom kind, and to carry
//! their own redelivery semantics: the dispatcher drops electrons it has no
//! route for and relies on the conductor to retry them elsewhere.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::{electron::Electron, error::ConductorError, properties::Properties};

/// # Shared handle to a registered conductor.
pub type ConductorRef = Arc<dyn Conductor>;

/// # Transport adapter delivering electrons and reporting completions.
#[async_trait]
pub trait Conductor: Send + Sync + 'static {
    /// Returns the conductor's stable identity.
    ///
    /// Defaults to the fully-qualified type name.
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Registration-time well-formedness check. Default-valid.
    fn valid(&self) -> bool {
        true
    }

    /// Hands out the inbound electron stream.
    ///
    /// The stream is lazy and unbounded from the dispatcher's point of view;
    /// channel closure signals that the adapter should shut down.
    async fn receive(&self) -> mpsc::Receiver<Electron>;

    /// Injects an electron on behalf of an external producer and returns the
    /// channel its completion record will arrive on.
    ///
    /// Not used by the dispatcher.
    async fn send(&self, electron: Electron)
        -> Result<oneshot::Receiver<Properties>, ConductorError>;

    /// Reports an electron's outcome back to the original requester.
    async fn complete(&self, properties: Properties) -> Result<(), ConductorError>;

    /// Shuts the transport down. Idempotent.
    ///
    /// Called by the dispatcher when its lifecycle is cancelled while this
    /// conductor's adapter is still running; may also be called by the
    /// owning application. Not called when the receive stream closes on its
    /// own, so a re-registered conductor keeps working.
    async fn close(&self);
}
