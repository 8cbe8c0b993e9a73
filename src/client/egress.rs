use reqwest::{Client, StatusCode};

use crate::{
    error::{Result, SdError},
    models::{GenerationRequest, GenerationResponse},
    stability::StabilityClient,
};

/// Route a generation request takes to the upstream API.
#[derive(Clone)]
pub enum Egress {
    /// Talk to Stability AI directly; the key travels with this process.
    Direct(StabilityClient),
    /// Go through a running `sdgen-proxy`.
    Proxy(ProxyClient),
}

impl Egress {
    pub async fn send(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse> {
        match self {
            Egress::Direct(client) => client.image().generate(api_key, request).await,
            Egress::Proxy(proxy) => proxy.generate(api_key, request).await,
        }
    }
}

/// Client for the proxy's `POST /generate` endpoint.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/generate", base_url.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The proxy answers every failure with the same 500, so nothing finer
    /// than [`SdError::Upstream`] can be recovered here.
    pub async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse> {
        let body = request.clone().with_api_key(api_key);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SdError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SdError::Auth);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SdError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerationResponse>()
            .await
            .map_err(|e| SdError::Response(e.to_string()))
    }
}
