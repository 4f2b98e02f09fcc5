//! Configuration, wire envelope, and event payload types.

use std::sync::Arc;

use nimbus_client::Client;
use nimbus_common::SessionSlot;
use serde::{Deserialize, Serialize};

/// Configuration for the realtime connection.
#[derive(Debug, Clone, Default)]
pub struct RealtimeConfig {
    /// Realtime endpoint, e.g. `wss://cloud.nimbus.io/v1/realtime`.
    pub endpoint: String,
    /// Project identifier.
    pub project: String,
    /// Persisted session credential for this project, shared with the
    /// REST client. Read when the server handshake completes.
    pub session: SessionSlot,
}

impl RealtimeConfig {
    /// Build the realtime configuration from a REST client.
    pub fn from_client(client: &Client) -> Self {
        Self {
            endpoint: client.config.realtime_endpoint(),
            project: client.config.project.clone(),
            session: client.session_slot(),
        }
    }
}

/// Inbound/outbound frame envelope: `{ "type": ..., "data": ... }`.
///
/// Known inbound kinds are `connected`, `event`, `error`, `response`;
/// anything else is ignored. The one outbound kind is
/// `authentication`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Decoded event payload delivered to subscription callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeMessage {
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Callback invoked with each matching event.
pub(crate) type EventCallback = Arc<dyn Fn(RealtimeMessage) + Send + Sync>;
