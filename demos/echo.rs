//! Minimal end-to-end flow: one in-memory conductor, one echo atom.
//!
//! ```bash
//! cargo run --example echo
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use covalent::{
    AtomFn, Conductor, ConductorError, Config, Dispatcher, Electron, Properties, Registration,
};

/// Receive-only conductor backed by local channels; completions are handed
/// to the demo through `done`.
struct ChannelConductor {
    inbound: Mutex<Option<mpsc::Receiver<Electron>>>,
    done: mpsc::UnboundedSender<Properties>,
}

#[async_trait]
impl Conductor for ChannelConductor {
    fn id(&self) -> &str {
        "channel"
    }

    async fn receive(&self) -> mpsc::Receiver<Electron> {
        self.inbound.lock().unwrap().take().expect("single adapter")
    }

    async fn send(
        &self,
        _electron: Electron,
    ) -> Result<oneshot::Receiver<Properties>, ConductorError> {
        Err(ConductorError::Send {
            reason: "demo conductor is receive-only".into(),
        })
    }

    async fn complete(&self, properties: Properties) -> Result<(), ConductorError> {
        self.done
            .send(properties)
            .map_err(|e| ConductorError::Complete {
                reason: e.to_string(),
            })
    }

    async fn close(&self) {}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let dispatcher = Dispatcher::new(Config::default());
    let mut events = dispatcher.subscribe();
    tokio::spawn(async move {
        while let Ok(ev) = events.recv().await {
            tracing::info!("{ev}");
        }
    });

    dispatcher.exec().await;

    dispatcher
        .register(Registration::Atom(AtomFn::arc("echo", |_ctx, payload| {
            async move { Ok(payload) }
        })))
        .await?;

    let (inbound_tx, inbound_rx) = mpsc::channel(8);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    dispatcher
        .register(Registration::conductor(ChannelConductor {
            inbound: Mutex::new(Some(inbound_rx)),
            done: done_tx,
        }))
        .await?;

    inbound_tx
        .send(Electron::new("demo", "e-1", "echo").with_payload(&b"hello, covalent"[..]))
        .await?;

    let properties = done_rx.recv().await.expect("completion");
    let took = properties.duration().num_microseconds().unwrap_or_default();
    let result = properties
        .result
        .map(|r| String::from_utf8_lossy(&r).into_owned());
    println!(
        "electron {} finished in {took}us: {result:?}",
        properties.electron_id,
    );

    dispatcher.stop();
    dispatcher.wait().await?;
    Ok(())
}
