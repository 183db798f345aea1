//! # covalent
//!
//! **Covalent** is a distributed task-execution dispatcher.
//!
//! Work units (**electrons**) arrive from transport adapters
//! (**conductors**) and are routed to locally-registered executor
//! prototypes (**atoms**). A dispatcher may run on many nodes at once;
//! conductors load-balance electrons across whichever dispatchers
//! registered the requested atom kind, and completion records flow back
//! through the conductor that originated each electron.
//!
//! ## Features
//!
//! | Area              | Description                                                       | Key types / traits                        |
//! |-------------------|-------------------------------------------------------------------|-------------------------------------------|
//! | **Dispatching**   | Route electrons from conductors to atom kinds, supervise runs.    | [`Dispatcher`], [`Config`]                |
//! | **Atoms**         | Define executors as prototypes replicated per electron.           | [`Atom`], [`AtomFn`], [`AtomRef`]         |
//! | **Conductors**    | Plug in transports that deliver work and carry results back.      | [`Conductor`], [`ConductorRef`]           |
//! | **Wire types**    | JSON electron and completion-record formats.                      | [`Electron`], [`Properties`]              |
//! | **Registration**  | Runtime and process-wide pre-declared registration.               | [`Registration`], [`registry`]            |
//! | **Events**        | Structured lifecycle telemetry over a broadcast bus.              | [`Event`], [`EventKind`]                  |
//! | **Errors**        | Typed errors per failure domain.                                  | [`ElectronError`], [`ConductorError`], [`DispatchError`] |
//!
//! ```no_run
//! use covalent::{AtomFn, Config, Dispatcher, Registration};
//!
//! # async fn demo(transport: covalent::ConductorRef) -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(Config::default());
//! dispatcher.exec().await;
//!
//! // Atoms are prototypes: each electron executes against a fresh replica.
//! let echo = AtomFn::arc("echo", |_ctx, payload| async move { Ok(payload) });
//! dispatcher.register(Registration::Atom(echo)).await?;
//!
//! // Conductors feed electrons in and carry completion records back.
//! dispatcher.register(Registration::Conductor(transport)).await?;
//!
//! dispatcher.stop();
//! dispatcher.wait().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ---

mod alive;
mod atom;
mod conduct;
mod conductor;
mod config;
mod dispatcher;
mod electron;
mod error;
mod events;
mod fanout;
mod instance;
mod properties;
pub mod registry;

// ---- Public re-exports ----

pub use atom::{Atom, AtomFn, AtomRef};
pub use conductor::{Conductor, ConductorRef};
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use electron::Electron;
pub use error::{ConductorError, DispatchError, ElectronError};
pub use events::{Bus, Event, EventKind};
pub use properties::Properties;
pub use registry::Registration;
