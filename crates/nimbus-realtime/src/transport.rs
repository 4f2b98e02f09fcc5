//! Transport seam: a minimal socket abstraction over tokio-tungstenite
//! so the connection state machine is testable without a server.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use nimbus_common::RealtimeError;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::warn;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// One inbound frame, reduced to what the realtime protocol uses.
#[derive(Debug, Clone)]
pub enum Frame {
    Text(String),
    Close(Option<u16>),
}

#[async_trait]
pub trait Socket: Send {
    async fn send(&mut self, text: String) -> Result<(), RealtimeError>;
    /// Next frame, or `None` once the stream is finished.
    async fn recv(&mut self) -> Option<Frame>;
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn Socket>, RealtimeError>;
}

/// Production transport backed by tokio-tungstenite.
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn Socket>, RealtimeError> {
        let (stream, _) =
            tokio::time::timeout(CONNECT_TIMEOUT, tokio_tungstenite::connect_async(url))
                .await
                .map_err(|_| RealtimeError::Connect("handshake timed out".into()))?
                .map_err(|e| RealtimeError::Connect(e.to_string()))?;
        Ok(Box::new(WsSocket { inner: stream }))
    }
}

struct WsSocket {
    inner: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
}

#[async_trait]
impl Socket for WsSocket {
    async fn send(&mut self, text: String) -> Result<(), RealtimeError> {
        self.inner
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| RealtimeError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Frame> {
        while let Some(result) = self.inner.next().await {
            match result {
                Ok(WsMessage::Text(text)) => return Some(Frame::Text(text.as_str().to_owned())),
                Ok(WsMessage::Close(frame)) => {
                    return Some(Frame::Close(frame.map(|f| u16::from(f.code))))
                }
                // Ping/pong are answered by tungstenite; binary frames
                // are not part of the protocol.
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "realtime socket error");
                    return None;
                }
            }
        }
        None
    }
}
