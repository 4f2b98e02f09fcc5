//! Shared handle to the persisted session credential.

use std::sync::Arc;

use tokio::sync::RwLock;

/// The session credential for the configured project, shared between
/// the REST client (which sets it after login) and the realtime
/// connection (which reads it when the server handshake completes).
#[derive(Clone, Default)]
pub struct SessionSlot {
    inner: Arc<RwLock<Option<String>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, session: Option<String>) {
        *self.inner.write().await = session;
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }
}

impl std::fmt::Debug for SessionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSlot").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_get() {
        let slot = SessionSlot::new();
        assert_eq!(slot.get().await, None);

        slot.set(Some("sess_abc123".into())).await;
        assert_eq!(slot.get().await, Some("sess_abc123".into()));

        slot.set(None).await;
        assert_eq!(slot.get().await, None);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let slot = SessionSlot::new();
        let other = slot.clone();
        slot.set(Some("sess_shared".into())).await;
        assert_eq!(other.get().await, Some("sess_shared".into()));
    }

    #[test]
    fn debug_does_not_leak_credential() {
        let slot = SessionSlot::new();
        let debug = format!("{slot:?}");
        assert!(!debug.contains("sess_"));
    }
}
