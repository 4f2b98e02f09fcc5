//! Public handle for the realtime connection.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::connection::connection_loop;
use crate::subscriptions::SubscriptionSet;
use crate::transport::{Transport, WsTransport};
use crate::types::{RealtimeConfig, RealtimeMessage};

/// Handle for the realtime connection.
///
/// One handle multiplexes any number of subscriptions over a single
/// background WebSocket. Constructed once per client; the socket is
/// only opened once the first subscription exists.
pub struct RealtimeClient {
    subs: Arc<Mutex<SubscriptionSet>>,
    nudge_tx: mpsc::Sender<()>,
}

impl RealtimeClient {
    /// Create the handle and start the background connection task.
    pub fn connect(config: RealtimeConfig) -> Self {
        Self::with_transport(config, Arc::new(WsTransport))
    }

    /// Like [`RealtimeClient::connect`] with a custom transport.
    pub fn with_transport(config: RealtimeConfig, transport: Arc<dyn Transport>) -> Self {
        let (nudge_tx, nudge_rx) = mpsc::channel(64);
        let subs = Arc::new(Mutex::new(SubscriptionSet::new()));
        tokio::spawn(connection_loop(
            config,
            Arc::clone(&subs),
            transport,
            nudge_rx,
        ));
        Self { subs, nudge_tx }
    }

    /// Register a callback for events on the given channels.
    ///
    /// Never fails; connection problems surface as logged reconnect
    /// attempts, not as errors here. Callbacks run on their own tasks,
    /// so a slow subscriber cannot stall frame processing.
    pub async fn subscribe<F>(
        &self,
        channels: impl IntoIterator<Item = impl Into<String>>,
        callback: F,
    ) -> Unsubscribe
    where
        F: Fn(RealtimeMessage) + Send + Sync + 'static,
    {
        let channels: Vec<String> = channels.into_iter().map(Into::into).collect();
        let handle = self.subs.lock().await.add(channels, Arc::new(callback));
        let _ = self.nudge_tx.send(()).await;
        Unsubscribe {
            subs: Arc::clone(&self.subs),
            nudge_tx: self.nudge_tx.clone(),
            handle,
        }
    }
}

/// Tears down one subscription. Channels no other subscription
/// references leave the channel set with it.
pub struct Unsubscribe {
    subs: Arc<Mutex<SubscriptionSet>>,
    nudge_tx: mpsc::Sender<()>,
    handle: u64,
}

impl Unsubscribe {
    /// Remove the subscription. Safe to call more than once; the
    /// second call is a no-op.
    pub async fn unsubscribe(&self) {
        if self.subs.lock().await.remove(self.handle) {
            let _ = self.nudge_tx.send(()).await;
        }
    }
}
