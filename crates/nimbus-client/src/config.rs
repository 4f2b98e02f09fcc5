//! Client configuration: endpoint, project, and credential headers.

/// Configuration for talking to a Nimbus deployment.
#[derive(Clone)]
pub struct ClientConfig {
    /// REST base URL, e.g. `https://cloud.nimbus.io/v1`.
    pub endpoint: String,
    /// Project identifier.
    pub project: String,
    /// Optional API key (server-side integrations).
    pub key: Option<String>,
    /// Optional JWT for delegated auth.
    pub jwt: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("jwt", &self.jwt.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.nimbus.io/v1".to_string(),
            project: String::new(),
            key: None,
            jwt: None,
        }
    }
}

impl ClientConfig {
    /// Derive the realtime endpoint from the REST endpoint: swap the
    /// scheme to WebSocket and append the `/realtime` path.
    pub fn realtime_endpoint(&self) -> String {
        let base = if let Some(rest) = self.endpoint.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.endpoint.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.endpoint.clone()
        };
        format!("{}/realtime", base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realtime_endpoint_swaps_scheme() {
        let config = ClientConfig {
            endpoint: "https://cloud.nimbus.io/v1".into(),
            ..Default::default()
        };
        assert_eq!(config.realtime_endpoint(), "wss://cloud.nimbus.io/v1/realtime");

        let config = ClientConfig {
            endpoint: "http://localhost/v1".into(),
            ..Default::default()
        };
        assert_eq!(config.realtime_endpoint(), "ws://localhost/v1/realtime");
    }

    #[test]
    fn realtime_endpoint_ignores_trailing_slash() {
        let config = ClientConfig {
            endpoint: "https://cloud.nimbus.io/v1/".into(),
            ..Default::default()
        };
        assert_eq!(config.realtime_endpoint(), "wss://cloud.nimbus.io/v1/realtime");
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = ClientConfig {
            endpoint: "https://cloud.nimbus.io/v1".into(),
            project: "demo".into(),
            key: Some("standard_secret".into()),
            jwt: Some("eyJhbGciOi".into()),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("demo"));
        assert!(!debug.contains("standard_secret"));
        assert!(!debug.contains("eyJhbGciOi"));
        assert!(debug.contains("[REDACTED]"));
    }
}
