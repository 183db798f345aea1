//! Shared fixtures: an in-memory conductor and helper atoms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time;

use covalent::{
    Conductor, ConductorError, Electron, Event, EventKind, Properties,
};

/// In-memory conductor: electrons are injected by the test, completion
/// records come back out on an unbounded channel.
pub struct MemConductor {
    inbound_tx: Mutex<Option<mpsc::Sender<Electron>>>,
    inbound_rx: Mutex<Option<mpsc::Receiver<Electron>>>,
    completions: mpsc::UnboundedSender<Properties>,
    pending: Mutex<HashMap<String, oneshot::Sender<Properties>>>,
    closed: AtomicBool,
}

impl MemConductor {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Properties>) {
        let (inbound_tx, inbound_rx) = mpsc::channel(16);
        let (completions, completions_rx) = mpsc::unbounded_channel();
        let conductor = Arc::new(Self {
            inbound_tx: Mutex::new(Some(inbound_tx)),
            inbound_rx: Mutex::new(Some(inbound_rx)),
            completions,
            pending: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        });
        (conductor, completions_rx)
    }

    /// Delivers an electron as if it arrived off the transport.
    pub async fn inject(&self, electron: Electron) {
        let tx = self
            .inbound_tx
            .lock()
            .unwrap()
            .clone()
            .expect("conductor closed");
        tx.send(electron).await.expect("receive loop gone");
    }

    /// Closes the inbound stream, signalling adapter shutdown.
    pub fn close_stream(&self) {
        self.inbound_tx.lock().unwrap().take();
    }

    /// Whether `Conductor::close` has been invoked.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Conductor for MemConductor {
    fn id(&self) -> &str {
        "mem"
    }

    async fn receive(&self) -> mpsc::Receiver<Electron> {
        self.inbound_rx
            .lock()
            .unwrap()
            .take()
            .expect("receive may only be called once")
    }

    async fn send(
        &self,
        electron: Electron,
    ) -> Result<oneshot::Receiver<Properties>, ConductorError> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .insert(electron.id.clone(), tx);
        self.inject(electron).await;
        Ok(rx)
    }

    async fn complete(&self, properties: Properties) -> Result<(), ConductorError> {
        if let Some(waiter) = self
            .pending
            .lock()
            .unwrap()
            .remove(&properties.electron_id)
        {
            let _ = waiter.send(properties.clone());
        }
        self.completions
            .send(properties)
            .map_err(|e| ConductorError::Complete {
                reason: e.to_string(),
            })
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.close_stream();
    }
}

/// Awaits the next completion record, failing the test on silence.
pub async fn next_completion(rx: &mut mpsc::UnboundedReceiver<Properties>) -> Properties {
    time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for completion")
        .expect("completions channel closed")
}

/// Drains the event stream until an event of `kind` shows up.
pub async fn wait_for_kind(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == kind => return ev,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    panic!("event bus closed while waiting for {kind:?}")
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {kind:?}"))
}
