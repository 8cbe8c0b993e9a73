use crate::{error::Result, storage::traits::CredentialStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local store; the key is gone when the process exits.
#[derive(Default)]
pub struct MemoryCredentialStore {
    value: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(Some(value.into())),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<String>> {
        Ok(self.value.read().await.clone())
    }

    async fn set(&self, value: &str) -> Result<()> {
        *self.value.write().await = Some(value.to_string());
        Ok(())
    }
}
