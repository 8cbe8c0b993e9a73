use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{Result, SdError};

/// An image file produced from the displayed result.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DownloadFile {
    pub fn from_base64(data: &str, now: DateTime<Utc>) -> Result<Self> {
        let bytes = STANDARD
            .decode(data)
            .map_err(|e| SdError::Response(format!("image is not valid base64: {}", e)))?;

        Ok(Self {
            file_name: download_file_name(now),
            bytes,
        })
    }

    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// `generated-2024-01-01T00-00-00-000Z.png` for 2024-01-01T00:00:00.000Z.
pub fn download_file_name(now: DateTime<Utc>) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("generated-{}.png", timestamp)
}
