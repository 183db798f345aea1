//! # Dispatcher: registration intake, routing, lifecycle, and shutdown.
//!
//! The [`Dispatcher`] owns the runtime components (event bus, lifecycle
//! token, worker tracker, routing table) and orchestrates the flow of
//! electrons from conductors to atoms.
//!
//! ## Architecture
//! ```text
//! conductor ──► conductor adapter ──► intake ──► distribution loop
//!                                                      │ routing table
//!                                                      ▼
//!                                     per-kind channel ──► atom adapter
//!                                                                │
//!                                                          Instance::execute
//!                                                                │
//! conductor ◄───────────────── complete(Properties) ◄────────────┘
//! ```
//!
//! ## Rules
//! - Registrations (compile-time registry and runtime `register`) all pass
//!   through the same registration path.
//! - The routing table is the only shared mutable structure; lookups take a
//!   read lock, registration takes the write lock, and no lock is held
//!   across a channel send.
//! - Re-registering an atom kind replaces its channel; the previous adapter
//!   drains and exits on channel closure.
//! - Electrons with no route are dropped without `complete` — the conductor
//!   redelivers or times out on its own, so another dispatcher may serve
//!   them.
//! - Cancellation is one-way and terminal: a stopped dispatcher cannot be
//!   revived.
//!
//! ```no_run
//! use covalent::{AtomFn, Config, Dispatcher, Registration};
//!
//! # async fn demo(transport: covalent::ConductorRef) -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(Config::default());
//! dispatcher.exec().await;
//!
//! dispatcher
//!     .register(Registration::Atom(AtomFn::arc("echo", |_ctx, payload| async move {
//!         Ok(payload)
//!     })))
//!     .await?;
//! dispatcher.register(Registration::Conductor(transport)).await?;
//!
//! dispatcher.stop();
//! dispatcher.wait().await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::{
    alive::AliveTracker,
    conduct::conduct,
    config::Config,
    error::DispatchError,
    events::{Bus, Event, EventKind},
    fanout::fan_out,
    instance::Instance,
    registry::{self, Registration},
};

/// The local runtime matching electrons to atoms and supervising their
/// execution.
///
/// Cheap to clone; clones share the same runtime.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    cfg: Config,
    bus: Bus,
    token: CancellationToken,
    tracker: TaskTracker,
    alive: AliveTracker,
    reg_tx: mpsc::Sender<Registration>,
    reg_rx: StdMutex<Option<mpsc::Receiver<Registration>>>,
    intake_tx: mpsc::Sender<Instance>,
    intake_rx: StdMutex<Option<mpsc::Receiver<Instance>>>,
    routes: RwLock<HashMap<String, mpsc::Sender<Instance>>>,
    started: AtomicBool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Dispatcher {
    /// Creates a dispatcher with the given configuration. No workers run
    /// until [`exec`](Self::exec).
    pub fn new(cfg: Config) -> Self {
        let (reg_tx, reg_rx) = mpsc::channel(cfg.registration_capacity);
        let (intake_tx, intake_rx) = mpsc::channel(cfg.intake_capacity);

        Self {
            inner: Arc::new(Inner {
                bus: Bus::new(cfg.bus_capacity),
                token: CancellationToken::new(),
                tracker: TaskTracker::new(),
                alive: AliveTracker::new(),
                reg_tx,
                reg_rx: StdMutex::new(Some(reg_rx)),
                intake_tx,
                intake_rx: StdMutex::new(Some(intake_rx)),
                routes: RwLock::new(HashMap::new()),
                started: AtomicBool::new(false),
                cfg,
            }),
        }
    }

    /// Starts the dispatcher loops. Idempotent; returns once the loops are
    /// running, not when work completes.
    ///
    /// Pre-declared [`registry`] entries are fed through the registration
    /// path before the loops start, so they are routable by the time `exec`
    /// returns.
    pub async fn exec(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }

        for entry in registry::registrations() {
            self.inner.handle_registration(entry).await;
        }

        if let Some(rx) = self.inner.reg_rx.lock().unwrap_or_else(|p| p.into_inner()).take() {
            let inner = self.inner.clone();
            self.inner.track("registration-loop", registration_loop(inner, rx));
        }

        if let Some(rx) = self.inner.intake_rx.lock().unwrap_or_else(|p| p.into_inner()).take() {
            let inner = self.inner.clone();
            self.inner.track("distribution-loop", distribution_loop(inner, rx));
        }
    }

    /// Submits a conductor or atom at runtime.
    ///
    /// Non-blocking up to the registration channel capacity, then blocks
    /// until the registration loop drains. Fails on a cancelled dispatcher.
    pub async fn register(&self, entry: Registration) -> Result<(), DispatchError> {
        if self.inner.token.is_cancelled() {
            return Err(DispatchError::Canceled);
        }

        tokio::select! {
            _ = self.inner.token.cancelled() => Err(DispatchError::Canceled),
            sent = self.inner.reg_tx.send(entry) => {
                sent.map_err(|_| DispatchError::RegistrationClosed)
            }
        }
    }

    /// Attaches an event consumer.
    ///
    /// Events published while no receiver exists are dropped; subscribe
    /// before [`exec`](Self::exec) to observe registration events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Returns a sorted snapshot of currently alive worker names: the core
    /// loops plus one `conductor:<id>` / `atom:<id>` entry per adapter.
    ///
    /// Used internally for stuck-worker reporting during shutdown; also
    /// useful for external monitoring.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.alive.snapshot()
    }

    /// Number of events published while no subscriber was attached.
    pub fn dropped_events(&self) -> u64 {
        self.inner.bus.dropped()
    }

    /// Triggers cancellation. One-way: every loop exits on its next
    /// iteration and the dispatcher cannot be revived.
    pub fn stop(&self) {
        self.inner
            .bus
            .publish(Event::now(EventKind::ShutdownRequested));
        self.inner.token.cancel();
    }

    /// Blocks until cancellation, then waits up to `Config::grace` for all
    /// workers to finish. On overrun the error names the stuck workers.
    pub async fn wait(&self) -> Result<(), DispatchError> {
        self.inner.token.cancelled().await;
        self.inner.tracker.close();

        let grace = self.inner.cfg.grace;
        match time::timeout(grace, self.inner.tracker.wait()).await {
            Ok(()) => Ok(()),
            Err(_) => Err(DispatchError::GraceExceeded {
                grace,
                stuck: self.inner.alive.snapshot(),
            }),
        }
    }
}

impl Inner {
    /// Spawns a worker on the tracker, keeping the alive set exact: the
    /// name is inserted before the spawn and removed when the worker exits.
    fn track<F>(&self, name: impl Into<String>, worker: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        self.alive.insert(name.clone());

        let alive = self.alive.clone();
        self.tracker.spawn(async move {
            worker.await;
            alive.remove(&name);
        });
    }

    /// Validates and applies one registration: conductors get a receive
    /// adapter, atoms get a fan-out adapter plus a routing-table entry.
    async fn handle_registration(&self, entry: Registration) {
        if !entry.valid() {
            self.bus.publish(
                Event::now(EventKind::RegistrationRejected)
                    .with_error(format!("invalid registration {}", entry.id())),
            );
            return;
        }

        match entry {
            Registration::Conductor(conductor) => {
                let name = format!("conductor:{}", conductor.id());
                let id = conductor.id().to_string();
                self.track(
                    name,
                    conduct(
                        self.token.clone(),
                        self.bus.clone(),
                        conductor,
                        self.intake_tx.clone(),
                    ),
                );
                self.bus.publish(
                    Event::now(EventKind::ConductorRegistered).with_conductor(id),
                );
            }
            Registration::Atom(prototype) => {
                let (tx, rx) = mpsc::channel(self.cfg.atom_capacity);
                {
                    let mut routes = self.routes.write().await;
                    // Replacing an existing kind drops the old sender; the
                    // old adapter drains its channel and exits.
                    routes.insert(prototype.id().to_string(), tx);
                }
                let name = format!("atom:{}", prototype.id());
                let id = prototype.id().to_string();
                self.track(
                    name,
                    fan_out(self.token.clone(), self.bus.clone(), prototype, rx),
                );
                self.bus
                    .publish(Event::now(EventKind::AtomRegistered).with_atom(id));
            }
        }
    }
}

/// Drains the registration channel until cancellation.
async fn registration_loop(inner: Arc<Inner>, mut rx: mpsc::Receiver<Registration>) {
    loop {
        tokio::select! {
            _ = inner.token.cancelled() => return,
            next = rx.recv() => {
                match next {
                    Some(entry) => inner.handle_registration(entry).await,
                    None => return,
                }
            }
        }
    }
}

/// Drains the intake channel, routing each instance to its atom kind.
async fn distribution_loop(inner: Arc<Inner>, mut rx: mpsc::Receiver<Instance>) {
    loop {
        tokio::select! {
            _ = inner.token.cancelled() => return,
            next = rx.recv() => {
                let Some(instance) = next else { return };

                let route = {
                    let routes = inner.routes.read().await;
                    routes.get(&instance.electron.atom_id).cloned()
                };

                let Some(tx) = route else {
                    inner.bus.publish(
                        Event::now(EventKind::AtomMissing)
                            .with_electron(&instance.electron.id)
                            .with_atom(&instance.electron.atom_id),
                    );
                    continue;
                };

                let electron_id = instance.electron.id.clone();
                let atom_id = instance.electron.atom_id.clone();

                tokio::select! {
                    _ = inner.token.cancelled() => return,
                    sent = tx.send(instance) => {
                        if sent.is_err() {
                            // The adapter died between lookup and send.
                            inner.bus.publish(
                                Event::now(EventKind::AtomChannelClosed)
                                    .with_electron(electron_id)
                                    .with_atom(atom_id),
                            );
                            continue;
                        }
                        inner.bus.publish(
                            Event::now(EventKind::ElectronRouted)
                                .with_electron(electron_id)
                                .with_atom(atom_id),
                        );
                    }
                }
            }
        }
    }
}
