//! `POST /generate` request proxy. Every failure, whatever its cause or
//! upstream status, is answered with the same 500 body.

use actix_web::{http::header::ContentType, middleware, web, App, HttpResponse, HttpServer};
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{messages, Result, SdError},
    logger::Stopwatch,
    models::GenerationRequest,
    stability::StabilityClient,
};

#[derive(Clone)]
pub struct ProxyState {
    pub stability: StabilityClient,
}

impl ProxyState {
    pub fn new(stability: StabilityClient) -> Self {
        Self { stability }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/generate", web::post().to(generate))
        .route("/health", web::get().to(health));
}

/// Parses an inbound body and forwards it upstream, returning the upstream
/// JSON bytes as-is.
pub async fn forward(stability: &StabilityClient, body: &[u8]) -> Result<Vec<u8>> {
    let request: GenerationRequest = serde_json::from_slice(body)
        .map_err(|e| SdError::Serialization(format!("invalid request body: {}", e)))?;

    let api_key = request
        .effective_api_key()
        .or_else(|| stability.default_api_key())
        .unwrap_or_default();
    if api_key.is_empty() {
        log::warn!("No API key in request and none configured");
    }

    stability.image().generate_body(api_key, &request).await
}

async fn generate(state: web::Data<ProxyState>, body: web::Bytes) -> HttpResponse {
    let request_id = Uuid::new_v4();
    let stopwatch = Stopwatch::start(format!("generate [{}]", request_id));

    match forward(&state.stability, &body).await {
        Ok(upstream) => {
            stopwatch.stop();
            HttpResponse::Ok()
                .content_type(ContentType::json())
                .body(upstream)
        }
        Err(e) => {
            log::error!("[{}] Error generating image: {}", request_id, e);
            HttpResponse::InternalServerError().json(json!({ "error": messages::PROXY_FAILURE }))
        }
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let stability = StabilityClient::new(config.stability.clone())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(ProxyState::new(stability));
    let (host, port) = config.server.bind_address();

    crate::logger::log_startup_info("sdgen-proxy", env!("CARGO_PKG_VERSION"), &host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
