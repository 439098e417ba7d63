use axum::{
    Router,
    body::Body,
    http::{Request, header},
    routing::get,
};
use tower::ServiceExt;

use nova_backend::config::CorsConfig;
use nova_backend::cors::build_cors_layer;

fn enabled_cors(origins: &[&str], methods: &[&str]) -> CorsConfig {
    CorsConfig {
        enabled: true,
        allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
        allowed_methods: methods.iter().map(|s| s.to_string()).collect(),
        allowed_headers: vec!["Content-Type".to_string()],
        ..CorsConfig::default()
    }
}

#[tokio::test]
async fn cors_layer_adds_allow_origin_header() {
    let cors = enabled_cors(&["https://example.com"], &["GET"]);

    let layer = build_cors_layer(&cors)
        .expect("valid cors config")
        .expect("enabled cors yields a layer");
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(layer);

    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("call app");

    let allow_origin = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .expect("missing allow origin")
        .to_str()
        .expect("invalid allow origin");
    assert_eq!(allow_origin, "https://example.com");
}

#[tokio::test]
async fn cors_preflight_includes_allow_methods() {
    let cors = enabled_cors(&["https://example.com"], &["GET", "POST"]);

    let layer = build_cors_layer(&cors)
        .expect("valid cors config")
        .expect("enabled cors yields a layer");
    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(layer);

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("call app");

    let allow_methods = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .expect("missing allow methods")
        .to_str()
        .expect("invalid allow methods");
    assert!(allow_methods.contains("POST"));
}

#[tokio::test]
async fn misconfigured_cors_fails_application_assembly() {
    use nova_backend::capability::CapabilityDescriptor;
    use nova_backend::{AppConfig, AppError, build_application};
    use std::sync::Arc;

    static NO_CAPABILITIES: &[CapabilityDescriptor] = &[];

    // CORS 启用但没有任何可用 Origin：基线中间件无降级模式，装配必须失败
    let mut config = AppConfig::default();
    config.cors.enabled = true;
    let err = build_application(Arc::new(config), NO_CAPABILITIES)
        .expect_err("misconfigured cors must abort assembly");
    assert!(matches!(err, AppError::Config(_)), "got: {err:?}");
}
