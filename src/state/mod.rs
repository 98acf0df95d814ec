//! Session state persistence
//!
//! The durable store is a plain key-value surface behind the
//! [`StateStore`] trait. [`SessionState`] layers the two typed accessors
//! on top: the per-user profile and the per-conversation dialog state.
//! Both are loaded at the start of a turn and flushed exactly once at the
//! end, whichever branch the turn took.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::dialog::DialogState;
use crate::value_objects::UserProfile;

/// Errors from the state layer
#[derive(Debug, Error)]
pub enum StateError {
    /// The backing store failed
    #[error("state store error: {0}")]
    Store(String),

    /// A stored value no longer deserializes
    #[error("corrupt state under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable key-value storage for session state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read one value; `None` when the key has never been written
    async fn get(&self, key: &str) -> Result<Option<Value>, StateError>;

    /// Write one value, replacing any previous one
    async fn set(&self, key: &str, value: Value) -> Result<(), StateError>;
}

/// In-process store used by tests and demos
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Typed accessors over the state store
#[derive(Clone)]
pub struct SessionState {
    store: Arc<dyn StateStore>,
}

impl SessionState {
    /// Wrap a store
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    fn profile_key(user_id: &str) -> String {
        format!("user/{user_id}/profile")
    }

    fn dialog_key(conversation_id: &str) -> String {
        format!("conversation/{conversation_id}/dialog-state")
    }

    /// Load the user's profile and the conversation's dialog state,
    /// defaulting each when nothing has been stored yet
    pub async fn load(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<(UserProfile, DialogState), StateError> {
        let profile = self.read(&Self::profile_key(user_id)).await?;
        let dialog = self.read(&Self::dialog_key(conversation_id)).await?;
        Ok((profile, dialog))
    }

    /// Flush both halves of the session state. Called once per turn, after
    /// all processing.
    pub async fn save(
        &self,
        user_id: &str,
        conversation_id: &str,
        profile: &UserProfile,
        dialog: &DialogState,
    ) -> Result<(), StateError> {
        self.write(&Self::profile_key(user_id), profile).await?;
        self.write(&Self::dialog_key(conversation_id), dialog)
            .await?;
        debug!(user_id, conversation_id, "session state flushed");
        Ok(())
    }

    async fn read<T>(&self, key: &str) -> Result<T, StateError>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match self.store.get(key).await? {
            Some(value) => serde_json::from_value(value).map_err(|source| StateError::Corrupt {
                key: key.to_string(),
                source,
            }),
            None => Ok(T::default()),
        }
    }

    async fn write<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StateError> {
        let value = serde_json::to_value(value).map_err(|source| StateError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DialogFrame, GreetingFlow};

    #[tokio::test]
    async fn load_defaults_when_nothing_stored() {
        let session = SessionState::new(Arc::new(MemoryStateStore::new()));
        let (profile, dialog) = session.load("user-1", "conv-1").await.unwrap();
        assert_eq!(profile, UserProfile::default());
        assert!(!dialog.has_active_dialog());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let session = SessionState::new(Arc::new(MemoryStateStore::new()));

        let profile = UserProfile {
            name: Some("Alice".to_string()),
            ..UserProfile::default()
        };
        let mut dialog = DialogState::new();
        dialog.frames.push(DialogFrame::Greeting(GreetingFlow::begin(&UserProfile::default()).0));

        session
            .save("user-1", "conv-1", &profile, &dialog)
            .await
            .unwrap();
        let (loaded_profile, loaded_dialog) = session.load("user-1", "conv-1").await.unwrap();
        assert_eq!(loaded_profile, profile);
        assert_eq!(loaded_dialog, dialog);
    }

    #[tokio::test]
    async fn state_is_scoped_per_conversation() {
        let session = SessionState::new(Arc::new(MemoryStateStore::new()));
        let mut dialog = DialogState::new();
        dialog.frames.push(DialogFrame::Greeting(GreetingFlow::begin(&UserProfile::default()).0));
        session
            .save("user-1", "conv-1", &UserProfile::default(), &dialog)
            .await
            .unwrap();

        let (_, other) = session.load("user-1", "conv-2").await.unwrap();
        assert!(!other.has_active_dialog());
    }
}
