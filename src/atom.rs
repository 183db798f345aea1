//! # Atom abstraction and function-backed atom implementation.
//!
//! This module defines the [`Atom`] trait (async, cancelable, replicable)
//! and a convenient function-backed implementation [`AtomFn`].
//! The common handle type is [`AtomRef`], an `Arc<dyn Atom>` holding the
//! registered prototype.
//!
//! Atoms are **prototypes**: the dispatcher keeps one value per kind and
//! replicates it for every electron, so state written during one execution
//! can never leak into the next. Rust has no structural reflection, so the
//! copy is an explicit [`replicate`](Atom::replicate) — implement it as a
//! structural clone.
//!
//! An atom's process method receives a [`CancellationToken`] and should
//! periodically check it to stop cooperatively during shutdown.

use std::{borrow::Cow, future::Future, sync::Arc};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ElectronError;

/// # Shared handle to a registered atom prototype.
pub type AtomRef = Arc<dyn Atom>;

/// # Asynchronous, cancelable, replicable executor.
///
/// An `Atom` has a stable [`id`](Atom::id) (its kind name), an async
/// [`process`](Atom::process) method that turns a payload into result bytes,
/// and a [`replicate`](Atom::replicate) method producing the fresh copy that
/// actually executes. Implementors should regularly check cancellation and
/// exit promptly during shutdown.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use covalent::{Atom, ElectronError};
///
/// #[derive(Clone, Default)]
/// struct Reverse;
///
/// #[async_trait]
/// impl Atom for Reverse {
///     fn id(&self) -> &str { "reverse" }
///
///     async fn process(
///         &mut self,
///         _ctx: CancellationToken,
///         mut payload: Vec<u8>,
///     ) -> Result<Vec<u8>, ElectronError> {
///         payload.reverse();
///         Ok(payload)
///     }
///
///     fn replicate(&self) -> Box<dyn Atom> { Box::new(self.clone()) }
/// }
/// ```
#[async_trait]
pub trait Atom: Send + Sync + 'static {
    /// Returns the stable kind name electrons address this atom by.
    ///
    /// Defaults to the fully-qualified type name.
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Registration-time well-formedness check. Default-valid.
    fn valid(&self) -> bool {
        true
    }

    /// Executes one electron's payload until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` and exit quickly to
    /// honor graceful shutdown.
    async fn process(
        &mut self,
        ctx: CancellationToken,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, ElectronError>;

    /// Produces the fresh copy of this prototype that will execute an
    /// electron. Must be a structural copy: replicas share no mutable state
    /// with the prototype or with each other.
    fn replicate(&self) -> Box<dyn Atom>;
}

/// # Function-backed atom implementation.
///
/// [`AtomFn`] wraps a closure `Fnc: Fn(CancellationToken, Vec<u8>) -> Fut`.
/// The closure must be `Clone`, which is what makes the prototype
/// replicable; captured state is copied into every replica.
/// Use [`AtomFn::arc`] for a one-liner that returns an [`AtomRef`].
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use covalent::{AtomFn, AtomRef, ElectronError};
///
/// let echo: AtomRef = AtomFn::arc("echo", |_ctx: CancellationToken, payload| async move {
///     Ok::<_, ElectronError>(payload)
/// });
///
/// assert_eq!(echo.id(), "echo");
/// ```
pub struct AtomFn<Fnc> {
    /// Stable kind name.
    name: Cow<'static, str>,
    /// Underlying function; cloned into each replica.
    func: Fnc,
}

impl<Fnc> AtomFn<Fnc> {
    /// Creates a new function-backed atom.
    ///
    /// Prefer [`AtomFn::arc`] when you immediately need an [`AtomRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, func: Fnc) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    /// Creates the atom and returns it as a shared prototype handle.
    pub fn arc<Fut>(name: impl Into<Cow<'static, str>>, func: Fnc) -> AtomRef
    where
        Fnc: Fn(CancellationToken, Vec<u8>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>, ElectronError>> + Send + 'static,
    {
        Arc::new(Self::new(name, func))
    }
}

#[async_trait]
impl<Fnc, Fut> Atom for AtomFn<Fnc>
where
    Fnc: Fn(CancellationToken, Vec<u8>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>, ElectronError>> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.name
    }

    async fn process(
        &mut self,
        ctx: CancellationToken,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, ElectronError> {
        (self.func)(ctx, payload).await
    }

    fn replicate(&self) -> Box<dyn Atom> {
        Box::new(Self {
            name: self.name.clone(),
            func: self.func.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn atom_fn_processes_payload() {
        let echo = AtomFn::arc("echo", |_ctx, payload| async move { Ok(payload) });
        let mut replica = echo.replicate();
        let out = replica
            .process(CancellationToken::new(), b"hi".to_vec())
            .await
            .unwrap();
        assert_eq!(out, b"hi");
    }

    #[test]
    fn default_id_is_type_name() {
        #[derive(Clone)]
        struct Bare;

        #[async_trait]
        impl Atom for Bare {
            async fn process(
                &mut self,
                _ctx: CancellationToken,
                payload: Vec<u8>,
            ) -> Result<Vec<u8>, ElectronError> {
                Ok(payload)
            }

            fn replicate(&self) -> Box<dyn Atom> {
                Box::new(self.clone())
            }
        }

        assert!(Bare.id().ends_with("Bare"));
        assert!(Bare.valid());
    }
}
