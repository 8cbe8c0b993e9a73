#![cfg(feature = "server")]

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use sdgen::server::{configure, ProxyState};
use sdgen::stability::GENERATE_PATH;
use sdgen::{StabilityClient, StabilityConfig};

fn state(config: StabilityConfig) -> web::Data<ProxyState> {
    web::Data::new(ProxyState::new(StabilityClient::new(config).unwrap()))
}

async fn post_generate(config: StabilityConfig, body: Value) -> (StatusCode, Value) {
    let app =
        test::init_service(App::new().app_data(state(config)).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

fn multipart_body(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

#[actix_web::test]
async fn relays_upstream_body_verbatim() {
    let server = MockServer::start().await;
    let upstream = json!({
        "image": "UE5HIQ==",
        "finish_reason": "CONTENT_FILTERED",
        "seed": 1234,
        "extra": {"kept": true}
    });
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("authorization", "Bearer sk-client"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post_generate(
        StabilityConfig::new().with_base_url(server.uri()),
        json!({"prompt": "a fox", "apiKey": "sk-client"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream);
}

#[actix_web::test]
async fn upstream_failures_never_leak_status() {
    for upstream_status in [400u16, 401, 403, 404, 429, 500, 503] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(upstream_status)
                    .set_body_json(json!({"name": "upstream", "errors": ["detail"]})),
            )
            .mount(&server)
            .await;

        let (status, body) = post_generate(
            StabilityConfig::new().with_base_url(server.uri()),
            json!({"prompt": "a fox", "apiKey": "sk"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "upstream {upstream_status}");
        assert_eq!(body, json!({"error": "Failed to generate image"}));
    }
}

#[actix_web::test]
async fn transport_failure_is_generic_500() {
    let (status, body) = post_generate(
        StabilityConfig::new().with_base_url("http://127.0.0.1:1"),
        json!({"prompt": "a fox", "apiKey": "sk"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to generate image"}));
}

#[actix_web::test]
async fn malformed_body_is_generic_500() {
    let app = test::init_service(
        App::new()
            .app_data(state(StabilityConfig::new().with_base_url("http://127.0.0.1:1")))
            .configure(configure),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/generate")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"prompt\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Failed to generate image"}));
}

#[actix_web::test]
async fn unset_fields_are_not_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"finish_reason": "SUCCESS"})))
        .mount(&server)
        .await;

    let (status, _) = post_generate(
        StabilityConfig::new().with_base_url(server.uri()),
        json!({
            "prompt": "a fox",
            "model": "sd3-large-turbo",
            "aspect_ratio": "21:9",
            "negative_prompt": "",
            "seed": 0,
            "cfg_scale": 5,
            "apiKey": "sk"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = multipart_body(&requests[0]);

    assert!(body.contains("name=\"prompt\"\r\n\r\na fox\r\n"));
    assert!(body.contains("name=\"model\"\r\n\r\nsd3-large-turbo\r\n"));
    assert!(body.contains("name=\"aspect_ratio\"\r\n\r\n21:9\r\n"));
    assert!(body.contains("name=\"cfg_scale\"\r\n\r\n5.0\r\n"));
    assert!(!body.contains("name=\"seed\""));
    assert!(!body.contains("name=\"negative_prompt\""));
    assert!(!body.contains("name=\"apiKey\""));

    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[actix_web::test]
async fn empty_enum_fields_are_not_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"finish_reason": "SUCCESS"})))
        .mount(&server)
        .await;

    let (status, _) = post_generate(
        StabilityConfig::new().with_base_url(server.uri()),
        json!({
            "prompt": "a fox",
            "model": "",
            "aspect_ratio": "",
            "seed": -5,
            "apiKey": "sk"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = multipart_body(&requests[0]);

    assert!(body.contains("name=\"prompt\"\r\n\r\na fox\r\n"));
    assert!(body.contains("name=\"seed\"\r\n\r\n-5\r\n"));
    assert!(!body.contains("name=\"model\""));
    assert!(!body.contains("name=\"aspect_ratio\""));
}

#[actix_web::test]
async fn relays_upstream_bytes_unchanged() {
    let server = MockServer::start().await;
    let upstream = r#"{"seed":77,"image":"UE5HIQ==","finish_reason":"SUCCESS"}"#;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(upstream, "application/json"))
        .mount(&server)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(state(StabilityConfig::new().with_base_url(server.uri())))
            .configure(configure),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"prompt": "a fox", "apiKey": "sk"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(content_type, "application/json");
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], upstream.as_bytes());
}

#[actix_web::test]
async fn falls_back_to_server_side_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer sk-server"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"finish_reason": "SUCCESS"})))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _) = post_generate(
        StabilityConfig::new()
            .with_base_url(server.uri())
            .with_api_key("sk-server"),
        json!({"prompt": "a fox", "apiKey": ""}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = test::init_service(
        App::new()
            .app_data(state(StabilityConfig::new()))
            .configure(configure),
    )
    .await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"status": "ok"}));
}
