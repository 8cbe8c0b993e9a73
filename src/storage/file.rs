use std::path::{Path, PathBuf};

use crate::{
    error::{Result, SdError},
    storage::traits::{CredentialStore, API_KEY_STORAGE_KEY},
};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Key/value JSON document on disk, read and written whole like browser
/// local storage. Entries under other keys are preserved on write. Values
/// are stored raw: no expiry, no encryption.
pub struct FileCredentialStore {
    path: PathBuf,
    key: String,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: API_KEY_STORAGE_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(SdError::Storage(format!("{}: {}", self.path.display(), e))),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SdError::Storage(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(SdError::Storage(format!("{}: {}", self.path.display(), e))),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<String>> {
        let document = self.read_document().await?;
        Ok(document
            .get(&self.key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string))
    }

    async fn set(&self, value: &str) -> Result<()> {
        let mut document = self.read_document().await?;
        document.insert(self.key.clone(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(&Value::Object(document))?;
        tokio::fs::write(&self.path, body).await?;

        log::debug!("Stored credential under '{}' in {}", self.key, self.path.display());
        Ok(())
    }
}
