//! Key-value persistence for sessions.

use std::collections::HashMap;

use {async_trait::async_trait, tokio::sync::RwLock};

use crate::{Result, Session};

/// Stores one [`Session`] per user id.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Session>>;
    async fn put(&self, user_id: &str, session: &Session) -> Result<()>;
    /// Returns whether anything was removed.
    async fn delete(&self, user_id: &str) -> Result<bool>;
}

/// Process-lifetime backend. Sessions are lost on restart.
#[derive(Default)]
pub struct MemorySessionBackend {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn get(&self, user_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), session.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::SessionKey};

    #[tokio::test]
    async fn put_get_delete() {
        let backend = MemorySessionBackend::new();
        assert!(backend.get("u1").await.unwrap().is_none());

        let mut session = Session::new();
        session.set(SessionKey::LastAnswer, "Go with pizza");
        backend.put("u1", &session).await.unwrap();
        assert_eq!(backend.get("u1").await.unwrap(), Some(session));

        assert!(backend.delete("u1").await.unwrap());
        assert!(!backend.delete("u1").await.unwrap());
    }
}
