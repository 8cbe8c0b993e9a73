pub mod file;
pub mod memory;
pub mod traits;

use crate::config::StorageConfig;
use std::sync::Arc;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;
pub use traits::{CredentialStore, API_KEY_STORAGE_KEY};

/// File-backed store when a path is configured, in-memory otherwise.
pub fn credential_store(config: &StorageConfig) -> Arc<dyn CredentialStore> {
    match &config.credentials_path {
        Some(path) => {
            log::info!("Persisting API key in {}", path.display());
            Arc::new(FileCredentialStore::new(path.clone()))
        }
        None => {
            log::warn!("No credentials path configured; the API key will not survive a restart");
            Arc::new(MemoryCredentialStore::new())
        }
    }
}
