//! Deadline enforcement: a slow atom against a 100ms electron timeout.
//!
//! ```bash
//! cargo run --example deadline
//! ```

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time;

use covalent::{
    AtomFn, Conductor, ConductorError, Config, Dispatcher, Electron, Properties, Registration,
};

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
    dispatcher.exec().await;

    // Sleeps far past any reasonable deadline; the dispatcher cuts it off.
    dispatcher
        .register(Registration::Atom(AtomFn::arc("slow", |_ctx, _payload| {
            async move {
                time::sleep(Duration::from_secs(5)).await;
                Ok(Vec::new())
            }
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
        .send(
            Electron::new("demo", "e-1", "slow")
                .with_timeout(Duration::from_millis(100)),
        )
        .await?;

    let properties = done_rx.recv().await.expect("completion");
    let took = properties.duration().num_milliseconds();
    let outcome = properties
        .error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no error".into());
    println!(
        "electron {} ended after {took}ms: {outcome}",
        properties.electron_id,
    );

    dispatcher.stop();
    dispatcher.wait().await?;
    Ok(())
}
