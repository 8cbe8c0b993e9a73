use crate::error::Result;
use async_trait::async_trait;

/// Fixed key the API credential is stored under.
pub const API_KEY_STORAGE_KEY: &str = "sd_api_key";

/// Where the client keeps its API key between runs.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>>;
    async fn set(&self, value: &str) -> Result<()>;
}
