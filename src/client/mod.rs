//! Headless controller behind the generation form: owns the form fields,
//! the API key prompt, and the loading/result/error state.

pub mod download;
pub mod egress;
pub mod state;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{Result, SdError},
    models::GenerationRequest,
    storage::CredentialStore,
};

pub use download::{download_file_name, DownloadFile};
pub use egress::{Egress, ProxyClient};
pub use state::{ClientState, GeneratedImage, Outcome};

pub struct GenerationClient {
    egress: Egress,
    store: Arc<dyn CredentialStore>,
    api_key: Option<String>,
    form: GenerationRequest,
    state: ClientState,
    last_seed: Option<u64>,
}

impl GenerationClient {
    /// Reads the stored key once. Without one the client starts in
    /// [`ClientState::AwaitingApiKey`].
    pub async fn new(egress: Egress, store: Arc<dyn CredentialStore>) -> Self {
        let api_key = match store.get().await {
            Ok(key) => key.filter(|k| !k.is_empty()),
            Err(e) => {
                log::warn!("Could not read stored API key: {}", e);
                None
            }
        };

        let state = if api_key.is_some() {
            ClientState::default()
        } else {
            log::info!("No stored API key, waiting for one");
            ClientState::AwaitingApiKey
        };

        Self {
            egress,
            store,
            api_key,
            form: GenerationRequest::new(""),
            state,
            last_seed: None,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn form(&self) -> &GenerationRequest {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut GenerationRequest {
        &mut self.form
    }

    /// Seed echoed by the last successful generation. Display only.
    pub fn last_seed(&self) -> Option<u64> {
        self.last_seed
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, ClientState::Idle { .. }) && !self.form.prompt.is_empty()
    }

    /// Stores a new key. Returns `false` and changes nothing when the key
    /// is blank after trimming.
    pub async fn submit_api_key(&mut self, key: &str) -> Result<bool> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(false);
        }

        self.store.set(key).await?;
        self.api_key = Some(key.to_string());
        if matches!(self.state, ClientState::AwaitingApiKey) {
            self.state = ClientState::default();
        }

        log::info!("API key saved");
        Ok(true)
    }

    /// Runs one generation and leaves the client idle with its outcome.
    ///
    /// Fails without touching the network when no key is set or the form
    /// does not validate. Upstream failures are not errors here: they become
    /// an [`Outcome::Error`] with a fixed message.
    pub async fn generate(&mut self) -> Result<&ClientState> {
        let api_key = match (&self.state, &self.api_key) {
            (ClientState::AwaitingApiKey, _) | (_, None) => {
                return Err(SdError::Validation("an API key is required".into()))
            }
            (ClientState::Loading, _) => {
                return Err(SdError::Validation("a generation is already running".into()))
            }
            (ClientState::Idle { .. }, Some(key)) => key.clone(),
        };
        self.form.validate()?;

        let loading = LoadingGuard::enter(&mut self.state);
        let outcome = match self.egress.send(&api_key, &self.form).await {
            Ok(response) => match response.successful_image() {
                Some(image) => {
                    self.last_seed = response.seed;
                    Outcome::Image(GeneratedImage::new(image, response.seed))
                }
                None => {
                    log::info!(
                        "No image in response (finish_reason: {:?})",
                        response.finish_reason
                    );
                    Outcome::no_image()
                }
            },
            Err(e) => {
                log::error!("Generation failed: {}", e);
                Outcome::Error(e.user_message().to_string())
            }
        };

        loading.finish(outcome);
        Ok(&self.state)
    }

    /// File for the displayed image, or `None` when nothing is displayed.
    pub fn download(&self, now: DateTime<Utc>) -> Result<Option<DownloadFile>> {
        self.state
            .image()
            .map(|image| DownloadFile::from_base64(image.base64(), now))
            .transpose()
    }
}

/// Holds the client in `Loading` for one request. Dropping it before
/// `finish` (a cancelled future) puts the client back to an empty `Idle`.
struct LoadingGuard<'a> {
    state: &'a mut ClientState,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a mut ClientState) -> Self {
        *state = ClientState::Loading;
        Self { state }
    }

    fn finish(self, outcome: Outcome) {
        *self.state = ClientState::Idle {
            outcome: Some(outcome),
        };
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.state.is_loading() {
            log::warn!("Generation cancelled before completion");
            *self.state = ClientState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::StabilityConfig, stability::StabilityClient, storage::MemoryCredentialStore};

    fn egress() -> Egress {
        let config = StabilityConfig::new().with_base_url("http://127.0.0.1:9");
        Egress::Direct(StabilityClient::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_starts_awaiting_key() {
        let client = GenerationClient::new(egress(), Arc::new(MemoryCredentialStore::new())).await;
        assert_eq!(client.state(), &ClientState::AwaitingApiKey);
        assert!(!client.can_submit());
    }

    #[tokio::test]
    async fn test_blank_key_is_ignored() {
        let store = Arc::new(MemoryCredentialStore::new());
        let mut client = GenerationClient::new(egress(), store.clone()).await;

        assert!(!client.submit_api_key("   ").await.unwrap());
        assert_eq!(client.state(), &ClientState::AwaitingApiKey);
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_key_is_trimmed_and_persisted() {
        let store = Arc::new(MemoryCredentialStore::new());
        let mut client = GenerationClient::new(egress(), store.clone()).await;

        assert!(client.submit_api_key("  sk-abc \n").await.unwrap());
        assert_eq!(client.state(), &ClientState::Idle { outcome: None });
        assert_eq!(store.get().await.unwrap().as_deref(), Some("sk-abc"));
    }

    #[tokio::test]
    async fn test_generate_requires_prompt() {
        let store = Arc::new(MemoryCredentialStore::with_value("sk"));
        let mut client = GenerationClient::new(egress(), store).await;

        assert!(!client.can_submit());
        let err = client.generate().await.unwrap_err();
        assert!(matches!(err, SdError::Validation(_)));
        assert_eq!(client.state(), &ClientState::Idle { outcome: None });
    }

    #[tokio::test]
    async fn test_generate_before_key_is_rejected() {
        let mut client = GenerationClient::new(egress(), Arc::new(MemoryCredentialStore::new())).await;
        client.form_mut().prompt = "a hill".into();

        assert!(client.generate().await.is_err());
        assert_eq!(client.state(), &ClientState::AwaitingApiKey);
    }

    #[test]
    fn test_loading_guard_resets_when_dropped() {
        let mut state = ClientState::default();
        {
            let _loading = LoadingGuard::enter(&mut state);
        }
        assert_eq!(state, ClientState::Idle { outcome: None });

        let loading = LoadingGuard::enter(&mut state);
        loading.finish(Outcome::no_image());
        assert_eq!(state.error(), Some("No image was generated."));
    }

    #[tokio::test]
    async fn test_download_without_image() {
        let store = Arc::new(MemoryCredentialStore::with_value("sk"));
        let client = GenerationClient::new(egress(), store).await;
        assert_eq!(client.download(Utc::now()).unwrap(), None);
    }
}
