//! Realtime channel multiplexing for the Nimbus SDK.
//!
//! One persistent WebSocket carries every subscription of a client.
//! Subscriptions reference-count their channels; the socket URL is a
//! pure function of the project id and the current channel set, so any
//! change to the set replaces the socket (bursts of changes are
//! debounced into one replacement). Lost connections retry forever
//! with tiered backoff, except when the server signals a policy
//! violation.

mod connection;
mod handler;
mod subscriptions;

pub mod client;
pub mod transport;
pub mod types;

pub use client::{RealtimeClient, Unsubscribe};
pub use transport::{Frame, Socket, Transport, WsTransport};
pub use types::{RealtimeConfig, RealtimeMessage};
