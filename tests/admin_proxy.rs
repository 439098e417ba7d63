//! 管理代理端到端：方法/路径/查询串/请求体透传、凭证注入、错误映射。

mod common;

use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::response::Json;
use axum::Router;
use serde_json::{Value, json};
use tower::ServiceExt;

use nova_backend::capability::CapabilityDescriptor;
use nova_backend::{AppConfig, build_application};

static CAPABILITIES: &[CapabilityDescriptor] = &[CapabilityDescriptor {
    name: "admin",
    mount_prefix: "/api/admin",
    build: nova_backend::features::admin::build,
}];

/// 回显上游：把收到的请求要素编码进响应体，供断言使用。
async fn echo(req: Request) -> Json<Value> {
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let method = req.method().to_string();
    let bytes = to_bytes(req.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    Json(json!({
        "method": method,
        "path": path,
        "query": query,
        "auth": auth,
        "body": String::from_utf8_lossy(&bytes),
    }))
}

async fn start_echo_upstream() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream listener");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, Router::new().fallback(echo)).await;
    });
    addr
}

fn admin_config(platform_url: String) -> Arc<AppConfig> {
    let mut config = AppConfig::default();
    config.admin.platform_url = Some(platform_url);
    config.admin.api_key = Some("secret-key".to_string());
    Arc::new(config)
}

#[tokio::test]
async fn proxy_forwards_path_query_and_credentials() {
    let upstream = start_echo_upstream().await;
    let config = admin_config(format!("http://{upstream}/v3"));

    let mut app = build_application(config, CAPABILITIES).expect("baseline assembles");
    app.wait_for_capabilities().await;
    assert!(app.composer().is_mounted("/api/admin"));

    let resp = app
        .router()
        .oneshot(common::get("/api/admin/content?limit=5"))
        .await
        .expect("proxy request");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = common::body_json(resp).await;
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/v3/content");
    assert_eq!(body["query"], "limit=5");
    assert_eq!(body["auth"], "Bearer secret-key");
}

#[tokio::test]
async fn proxy_forwards_request_body() {
    let upstream = start_echo_upstream().await;
    let config = admin_config(format!("http://{upstream}/v3"));

    let mut app = build_application(config, CAPABILITIES).expect("baseline assembles");
    app.wait_for_capabilities().await;

    let payload = json!({"title": "新页面"});
    let resp = app
        .router()
        .oneshot(common::post_json("/api/admin/entries", &payload))
        .await
        .expect("proxy request");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = common::body_json(resp).await;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/v3/entries");
    let forwarded: Value =
        serde_json::from_str(body["body"].as_str().expect("body echoed")).expect("body is json");
    assert_eq!(forwarded, payload);
}

#[tokio::test]
async fn unreachable_platform_maps_to_bad_gateway() {
    // 占用一个端口后立即释放，得到大概率拒绝连接的地址
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let dead_addr = listener.local_addr().expect("probe addr");
    drop(listener);

    let config = admin_config(format!("http://{dead_addr}/v3"));
    let mut app = build_application(config, CAPABILITIES).expect("baseline assembles");
    app.wait_for_capabilities().await;

    let resp = app
        .router()
        .oneshot(common::get("/api/admin/content"))
        .await
        .expect("proxy request");
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body = common::body_json(resp).await;
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn missing_credentials_leave_capability_unmounted() {
    let mut config = AppConfig::default();
    config.admin.platform_url = Some("http://127.0.0.1:9/v3".to_string());
    // api_key 缺失

    let mut app =
        build_application(Arc::new(config), CAPABILITIES).expect("baseline assembles");
    app.wait_for_capabilities().await;

    assert!(!app.composer().is_mounted("/api/admin"));
    let resp = app
        .router()
        .oneshot(common::get("/api/admin/content"))
        .await
        .expect("request unmounted prefix");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
