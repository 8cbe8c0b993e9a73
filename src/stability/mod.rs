pub mod image_client;

use crate::{
    config::StabilityConfig,
    error::{Result, SdError},
    models::ModelInfo,
};

pub use image_client::{ImageClient, GENERATE_PATH};

/// Entry point for the Stability AI REST API.
#[derive(Clone)]
pub struct StabilityClient {
    image_client: ImageClient,
    api_key: Option<String>,
}

impl StabilityClient {
    pub fn new(config: StabilityConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sdgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SdError::Config(format!("failed to build HTTP client: {}", e)))?;

        log::debug!("Stability client targeting {}", config.base_url());

        Ok(Self {
            image_client: ImageClient::new(http, config.base_url()),
            api_key: config.api_key.filter(|key| !key.is_empty()),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    /// Server-side key, used when a caller does not bring its own.
    pub fn default_api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        ImageClient::supported_models()
    }
}
