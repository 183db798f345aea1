//! # Registration entries and the process-wide registry.
//!
//! A [`Registration`] is the tagged variant the dispatcher accepts through
//! its registration channel: either a conductor or an atom prototype.
//!
//! The **registry** is an optional process-wide accumulator of pre-declared
//! registrations. Entries added with [`register`] before a dispatcher starts
//! are fed through the normal registration path when `Dispatcher::exec`
//! runs. The registry is append-only: entries are snapshotted, never
//! removed, so dispatchers created later in the same process see them too.
//!
//! # Example
//! ```
//! use covalent::{registry, AtomFn, Registration};
//!
//! registry::register(Registration::Atom(AtomFn::arc(
//!     "upper",
//!     |_ctx, payload: Vec<u8>| async move { Ok(payload.to_ascii_uppercase()) },
//! )));
//!
//! assert!(registry::registrations()
//!     .iter()
//!     .any(|r| r.id() == "upper"));
//! ```

use std::sync::{Mutex, OnceLock};

use crate::{
    atom::{Atom, AtomRef},
    conductor::{Conductor, ConductorRef},
};

/// A conductor or atom submitted for registration.
#[derive(Clone)]
pub enum Registration {
    /// Transport adapter to pull electrons from.
    Conductor(ConductorRef),
    /// Atom prototype to route electrons to.
    Atom(AtomRef),
}

impl Registration {
    /// Wraps a concrete atom prototype.
    pub fn atom(atom: impl Atom) -> Self {
        Self::Atom(std::sync::Arc::new(atom))
    }

    /// Wraps a concrete conductor.
    pub fn conductor(conductor: impl Conductor) -> Self {
        Self::Conductor(std::sync::Arc::new(conductor))
    }

    /// Identity of the wrapped value.
    pub fn id(&self) -> &str {
        match self {
            Registration::Conductor(c) => c.id(),
            Registration::Atom(a) => a.id(),
        }
    }

    /// Well-formedness of the wrapped value.
    pub fn valid(&self) -> bool {
        match self {
            Registration::Conductor(c) => c.valid(),
            Registration::Atom(a) => a.valid(),
        }
    }
}

impl From<ConductorRef> for Registration {
    fn from(c: ConductorRef) -> Self {
        Self::Conductor(c)
    }
}

impl From<AtomRef> for Registration {
    fn from(a: AtomRef) -> Self {
        Self::Atom(a)
    }
}

static REGISTRY: OnceLock<Mutex<Vec<Registration>>> = OnceLock::new();

fn registry() -> &'static Mutex<Vec<Registration>> {
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

/// Appends a pre-declared registration to the process-wide registry.
pub fn register(entry: Registration) {
    registry()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push(entry);
}

/// Snapshots the current registry contents.
pub fn registrations() -> Vec<Registration> {
    registry()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomFn;

    #[test]
    fn registry_accumulates_and_snapshots() {
        let before = registrations().len();
        register(Registration::Atom(AtomFn::arc("snapshot-probe", |_, p| async move { Ok(p) })));

        let snapshot = registrations();
        assert_eq!(snapshot.len(), before + 1);
        assert!(snapshot.iter().any(|r| r.id() == "snapshot-probe"));
        assert!(snapshot.iter().all(Registration::valid));
    }
}
