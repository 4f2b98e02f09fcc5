//! Generic HTTP call convention shared by all resource services.

use nimbus_common::{NimbusError, SessionSlot};
use reqwest::Method;
use tracing::debug;

use crate::config::ClientConfig;

/// Request body for [`Client::call`].
pub enum Body {
    None,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// Nimbus REST client.
///
/// Every resource service method reduces to one [`Client::call`]:
/// verb + path + headers + body in, decoded JSON or a typed
/// [`NimbusError::Api`] out.
pub struct Client {
    pub config: ClientConfig,
    session: SessionSlot,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session: SessionSlot::new(),
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// The session slot shared with the realtime connection.
    pub fn session_slot(&self) -> SessionSlot {
        self.session.clone()
    }

    /// Store (or clear) the session credential for this project.
    pub async fn set_session(&self, session: Option<String>) {
        self.session.set(session).await;
    }

    /// Perform one REST call following the shared convention.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
        body: Body,
    ) -> Result<serde_json::Value, NimbusError> {
        let url = format!("{}{}", self.config.endpoint.trim_end_matches('/'), path);
        debug!(method = %method, url = %url, "nimbus REST call");

        let mut req = self
            .http
            .request(method, &url)
            .header("x-nimbus-project", &self.config.project);
        if let Some(ref key) = self.config.key {
            req = req.header("x-nimbus-key", key);
        }
        if let Some(ref jwt) = self.config.jwt {
            req = req.header("x-nimbus-jwt", jwt);
        }
        if let Some(session) = self.session.get().await {
            req = req.header("x-nimbus-session", session);
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req = match body {
            Body::None => req,
            Body::Json(value) => req.json(&value),
            Body::Multipart(form) => req.multipart(form),
        };

        let resp = req
            .send()
            .await
            .map_err(|e| NimbusError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| NimbusError::Network(e.to_string()))?;

        decode_response(status, &text)
    }
}

/// Decode a REST response: JSON (or null for empty bodies) on 2xx,
/// typed API error otherwise.
pub(crate) fn decode_response(status: u16, text: &str) -> Result<serde_json::Value, NimbusError> {
    if (200..300).contains(&status) {
        if text.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        return Ok(serde_json::from_str(text)?);
    }

    let error_type = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from))
        .unwrap_or_else(|| "unknown".to_string());

    Err(NimbusError::Api {
        code: status,
        error_type,
        response: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_success_json() {
        let value = decode_response(200, r#"{"$id":"doc1","title":"hi"}"#).unwrap();
        assert_eq!(value["$id"], "doc1");
    }

    #[test]
    fn decode_empty_body_as_null() {
        let value = decode_response(204, "").unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn decode_error_with_type() {
        let err = decode_response(
            404,
            r#"{"message":"Document not found","type":"document_not_found","code":404}"#,
        )
        .unwrap_err();
        match err {
            NimbusError::Api {
                code,
                error_type,
                response,
            } => {
                assert_eq!(code, 404);
                assert_eq!(error_type, "document_not_found");
                assert!(response.contains("Document not found"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn decode_error_with_unparseable_body() {
        let err = decode_response(502, "Bad Gateway").unwrap_err();
        match err {
            NimbusError::Api {
                code, error_type, ..
            } => {
                assert_eq!(code, 502);
                assert_eq!(error_type, "unknown");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn decode_malformed_success_body_is_json_error() {
        let err = decode_response(200, "{not json").unwrap_err();
        assert!(matches!(err, NimbusError::Json(_)));
    }

    #[tokio::test]
    async fn session_slot_is_shared() {
        let client = Client::new(ClientConfig::default());
        let slot = client.session_slot();
        client.set_session(Some("sess_1".into())).await;
        assert_eq!(slot.get().await, Some("sess_1".into()));
    }
}
