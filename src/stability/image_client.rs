use crate::{
    error::{Result, SdError},
    models::{build_multipart_body, GenerationRequest, GenerationResponse, Model, ModelInfo},
};
use reqwest::{header, Client, StatusCode};
use serde::de::IgnoredAny;
use serde_json::Value;

pub const GENERATE_PATH: &str = "/v2beta/stable-image/generate/sd3";

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    endpoint: String,
}

impl ImageClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        Model::ALL.into_iter().map(ModelInfo::from).collect()
    }

    /// Sends the request and returns the upstream body bytes untouched,
    /// once they are known to hold JSON.
    pub async fn generate_body(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>> {
        let payload = build_multipart_body(request);

        log::info!(
            "Generating image with model: {}",
            request
                .model
                .map(|model| model.as_str())
                .unwrap_or("<upstream default>")
        );
        log::debug!("Multipart fields: {:?}", payload.fields());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header(header::ACCEPT, "application/json")
            .multipart(payload.into_multipart())
            .send()
            .await
            .map_err(|e| {
                log::error!("Request to {} failed: {}", self.endpoint, e);
                SdError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Upstream rejected the API key");
            return Err(SdError::Auth);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Upstream returned {}: {}", status, body);
            return Err(SdError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SdError::Transport(e.to_string()))?;
        serde_json::from_slice::<IgnoredAny>(&bytes)
            .map_err(|e| SdError::Response(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    pub async fn generate_raw(&self, api_key: &str, request: &GenerationRequest) -> Result<Value> {
        let body = self.generate_body(api_key, request).await?;
        serde_json::from_slice(&body).map_err(|e| SdError::Response(e.to_string()))
    }

    pub async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse> {
        let body = self.generate_raw(api_key, request).await?;
        serde_json::from_value(body).map_err(|e| SdError::Response(e.to_string()))
    }
}
