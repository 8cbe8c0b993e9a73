use crate::error::messages;

/// A generated image ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    base64: String,
    pub seed: Option<u64>,
}

impl GeneratedImage {
    pub fn new(base64: impl Into<String>, seed: Option<u64>) -> Self {
        Self {
            base64: base64.into(),
            seed,
        }
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.base64)
    }
}

/// Result of the last finished generation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Image(GeneratedImage),
    Error(String),
}

impl Outcome {
    pub fn no_image() -> Self {
        Outcome::Error(messages::NO_IMAGE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientState {
    /// No API key yet; nothing may be sent until one is submitted.
    AwaitingApiKey,
    Idle { outcome: Option<Outcome> },
    Loading,
}

impl ClientState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ClientState::Loading)
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            ClientState::Idle {
                outcome: Some(Outcome::Image(image)),
            } => Some(image),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ClientState::Idle {
                outcome: Some(Outcome::Error(message)),
            } => Some(message),
            _ => None,
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        ClientState::Idle { outcome: None }
    }
}
