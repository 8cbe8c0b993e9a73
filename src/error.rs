use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Authentication failed: upstream rejected the API key")]
    Auth,
    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },
    #[error("Response error: {0}")]
    Response(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl SdError {
    /// HTTP status reported by the upstream API, if the failure came from one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            SdError::Auth => Some(401),
            SdError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The fixed message a user sees for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            SdError::Auth => messages::INVALID_API_KEY,
            _ => messages::GENERATION_FAILED,
        }
    }
}

impl From<reqwest::Error> for SdError {
    fn from(err: reqwest::Error) -> Self {
        SdError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SdError {
    fn from(err: serde_json::Error) -> Self {
        SdError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SdError {
    fn from(err: std::io::Error) -> Self {
        SdError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SdError>;

/// Human-readable messages that replace failure detail at the user boundary.
pub mod messages {
    pub const INVALID_API_KEY: &str = "Invalid API Key";
    pub const GENERATION_FAILED: &str = "An error occurred while generating the image.";
    pub const NO_IMAGE: &str = "No image was generated.";
    pub const PROXY_FAILURE: &str = "Failed to generate image";
}
