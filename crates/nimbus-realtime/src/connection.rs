//! Background connection loop: debounced (re)connects, socket
//! replacement on channel-set changes, and tiered-backoff recovery.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::handler::handle_message;
use crate::subscriptions::{backoff_delay, SubscriptionSet};
use crate::transport::{Frame, Socket, Transport};
use crate::types::{RealtimeConfig, WireMessage};

/// Server-assigned close/error code for a policy violation (revoked
/// realtime access, invalid auth session). Retrying would fail the
/// same way, so this one case stops the reconnect loop.
const POLICY_VIOLATION: u16 = 1008;

/// Debounce window for subscribe/unsubscribe bursts.
const DEBOUNCE: Duration = Duration::from_millis(50);

/// Why the current socket stopped serving.
enum SocketOutcome {
    /// The channel set changed the URL; reconnect immediately.
    Replaced,
    /// The channel set became empty; close and wait for a subscriber.
    Idle,
    /// Remote close or stream failure.
    Remote { policy_violation: bool },
    /// The client handle was dropped.
    Shutdown,
}

pub(crate) async fn connection_loop(
    config: RealtimeConfig,
    subs: Arc<Mutex<SubscriptionSet>>,
    transport: Arc<dyn Transport>,
    mut nudge_rx: mpsc::Receiver<()>,
) {
    let mut attempts: u32 = 0;

    // Idle until the first subscription arrives.
    'idle: loop {
        if nudge_rx.recv().await.is_none() {
            return;
        }
        debounce(&mut nudge_rx).await;

        loop {
            let url = match subs.lock().await.socket_url(&config.endpoint, &config.project) {
                Some(url) => url,
                // No channels, no socket.
                None => continue 'idle,
            };

            match transport.connect(&url).await {
                Ok(socket) => {
                    info!(endpoint = %config.endpoint, "realtime connected");
                    attempts = 0;
                    match serve_socket(socket, &url, &config, &subs, &mut nudge_rx).await {
                        SocketOutcome::Replaced => continue,
                        SocketOutcome::Idle => continue 'idle,
                        SocketOutcome::Shutdown => return,
                        SocketOutcome::Remote {
                            policy_violation: true,
                        } => {
                            warn!("realtime access denied by server policy, not retrying");
                            // The next subscribe/unsubscribe re-arms the loop.
                            continue 'idle;
                        }
                        SocketOutcome::Remote {
                            policy_violation: false,
                        } => {
                            let delay = backoff_delay(attempts);
                            attempts += 1;
                            warn!(
                                attempts,
                                delay_ms = delay.as_millis() as u64,
                                "realtime connection lost, reconnecting"
                            );
                            if !wait_backoff(delay, &mut nudge_rx).await {
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    let delay = backoff_delay(attempts);
                    attempts += 1;
                    error!(error = %e, attempts, "realtime connect failed");
                    if !wait_backoff(delay, &mut nudge_rx).await {
                        return;
                    }
                }
            }
        }
    }
}

/// Serve one socket until it is replaced, idled, or closed.
///
/// The last parsed message is tracked so a close that follows a
/// policy-violation error message can be told apart from an ordinary
/// drop. The replace/idle decision is made here, at the point that
/// initiates the close, so no suppression flag survives past it.
async fn serve_socket(
    mut socket: Box<dyn Socket>,
    url: &str,
    config: &RealtimeConfig,
    subs: &Arc<Mutex<SubscriptionSet>>,
    nudge_rx: &mut mpsc::Receiver<()>,
) -> SocketOutcome {
    let mut last_error_code: Option<u16> = None;

    loop {
        tokio::select! {
            frame = socket.recv() => match frame {
                Some(Frame::Text(text)) => {
                    match serde_json::from_str::<WireMessage>(&text) {
                        Ok(msg) => {
                            last_error_code = if msg.kind == "error" {
                                msg.data.get("code").and_then(|c| c.as_u64()).map(|c| c as u16)
                            } else {
                                None
                            };
                            handle_message(&msg, subs, socket.as_mut(), config).await;
                        }
                        Err(e) => debug!(error = %e, "discarding malformed realtime frame"),
                    }
                }
                Some(Frame::Close(code)) => {
                    debug!(code = ?code, "realtime socket closed by server");
                    return SocketOutcome::Remote {
                        policy_violation: last_error_code == Some(POLICY_VIOLATION),
                    };
                }
                None => {
                    return SocketOutcome::Remote {
                        policy_violation: last_error_code == Some(POLICY_VIOLATION),
                    };
                }
            },
            nudge = nudge_rx.recv() => match nudge {
                Some(()) => {
                    debounce(nudge_rx).await;
                    match subs.lock().await.socket_url(&config.endpoint, &config.project) {
                        None => return SocketOutcome::Idle,
                        Some(new_url) if new_url != url => return SocketOutcome::Replaced,
                        // Same channel set, same URL: reuse the socket.
                        Some(_) => {}
                    }
                }
                None => return SocketOutcome::Shutdown,
            },
        }
    }
}

/// Collapse a burst of subscribe/unsubscribe nudges into one
/// (re)connection decision. Each further nudge restarts the window.
async fn debounce(nudge_rx: &mut mpsc::Receiver<()>) {
    loop {
        match tokio::time::timeout(DEBOUNCE, nudge_rx.recv()).await {
            Ok(Some(())) => continue,
            Ok(None) | Err(_) => return,
        }
    }
}

/// Sleep out the backoff delay. A nudge cuts the wait short (the
/// channel set changed, so reconnect now). Returns `false` when the
/// client handle is gone.
async fn wait_backoff(delay: Duration, nudge_rx: &mut mpsc::Receiver<()>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        nudge = nudge_rx.recv() => match nudge {
            Some(()) => {
                debounce(nudge_rx).await;
                true
            }
            None => false,
        },
    }
}
