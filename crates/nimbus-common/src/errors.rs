#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("realtime connect error: {0}")]
    Connect(String),

    #[error("realtime send error: {0}")]
    Send(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NimbusError {
    /// Typed API error decoded from a non-2xx REST response.
    #[error("api error {code} ({error_type}): {response}")]
    Api {
        code: u16,
        error_type: String,
        response: String,
    },

    #[error(transparent)]
    Realtime(#[from] RealtimeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = NimbusError::Api {
            code: 401,
            error_type: "general_unauthorized_scope".into(),
            response: "{\"message\":\"missing scope\"}".into(),
        };
        assert_eq!(
            err.to_string(),
            "api error 401 (general_unauthorized_scope): {\"message\":\"missing scope\"}"
        );
    }

    #[test]
    fn realtime_error_display() {
        let err = RealtimeError::Connect("dns failure".into());
        assert_eq!(err.to_string(), "realtime connect error: dns failure");

        let err = RealtimeError::Send("socket gone".into());
        assert_eq!(err.to_string(), "realtime send error: socket gone");
    }

    #[test]
    fn nimbus_error_from_realtime() {
        let rt_err = RealtimeError::Connect("refused".into());
        let err: NimbusError = rt_err.into();
        assert!(matches!(err, NimbusError::Realtime(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn nimbus_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: NimbusError = io_err.into();
        assert!(matches!(err, NimbusError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn nimbus_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: NimbusError = json_err.into();
        assert!(matches!(err, NimbusError::Json(_)));
    }

    #[test]
    fn other_variants_display() {
        let err = NimbusError::Network("timeout".into());
        assert_eq!(err.to_string(), "network error: timeout");

        let err = NimbusError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
