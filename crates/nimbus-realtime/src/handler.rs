//! Inbound message handling: handshake authentication and event fan-out.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::subscriptions::SubscriptionSet;
use crate::transport::Socket;
use crate::types::{RealtimeConfig, RealtimeMessage, WireMessage};

/// Handle one decoded frame. Never fails: anything unexpected is
/// logged and dropped so a single frame cannot take the connection
/// down.
pub(crate) async fn handle_message(
    msg: &WireMessage,
    subs: &Arc<Mutex<SubscriptionSet>>,
    socket: &mut dyn Socket,
    config: &RealtimeConfig,
) {
    match msg.kind.as_str() {
        "connected" => {
            // The server may have authenticated the socket from a
            // cookie already. If not, and a session credential is
            // stored for this project, attach it now.
            let authenticated = msg.data.get("user").is_some_and(|u| !u.is_null());
            if authenticated {
                return;
            }
            let Some(session) = config.session.get().await else {
                return;
            };
            let frame = serde_json::json!({
                "type": "authentication",
                "data": { "session": session },
            });
            match serde_json::to_string(&frame) {
                Ok(text) => {
                    if let Err(e) = socket.send(text).await {
                        warn!(error = %e, "failed to send authentication frame");
                    }
                }
                Err(e) => warn!(error = %e, "failed to encode authentication frame"),
            }
        }
        "event" => {
            let message: RealtimeMessage = match serde_json::from_value(msg.data.clone()) {
                Ok(message) => message,
                Err(e) => {
                    debug!(error = %e, "discarding malformed event payload");
                    return;
                }
            };
            // The server filters by the subscribed channels, but a
            // socket replacement can race an in-flight event for
            // channels we no longer hold. Filter again before fan-out.
            let callbacks = subs.lock().await.matching(&message.channels);
            for callback in callbacks {
                let message = message.clone();
                // Deferred dispatch: subscribers never run inline with
                // frame processing.
                tokio::spawn(async move { callback(message) });
            }
        }
        "error" => {
            // Retained by the connection loop for the close handler;
            // not re-raised to subscribers.
            warn!(data = %msg.data, "realtime error message");
        }
        other => {
            debug!(kind = %other, "unhandled realtime message");
        }
    }
}
