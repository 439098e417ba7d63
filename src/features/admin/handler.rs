use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
    routing::any,
};
use reqwest::Url;
use std::time::Duration;

use crate::error::AppError;

/// 代理转发时缓冲请求体的上限。
///
/// 管理操作以 JSON 为主，不经由这里传输大文件。
const MAX_PROXY_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 管理代理的路由状态
#[derive(Clone)]
pub struct AdminState {
    /// 外部内容平台 Base URL
    pub platform_url: Url,
    /// 平台 API Key（以 Bearer 注入上游请求）
    pub api_key: String,
    /// 共享 HTTP Client
    pub client: reqwest::Client,
    /// 上游请求超时
    pub upstream_timeout: Duration,
}

/// 把剥离挂载前缀后的请求路径拼到平台基地址上。
fn target_url(base: &Url, path: &str, query: Option<&str>) -> Url {
    let mut url = base.clone();
    let joined = format!("{}{}", base.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url.set_query(query);
    url
}

/// 转发处理器：方法、路径、查询串、请求体原样转发，
/// 注入平台凭证；上游状态码与响应体透传给调用方。
async fn proxy(State(state): State<AdminState>, req: Request) -> Result<Response, AppError> {
    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|_| AppError::Validation(format!("不支持的 HTTP 方法: {}", req.method())))?;
    let url = target_url(&state.platform_url, req.uri().path(), req.uri().query());

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = to_bytes(req.into_body(), MAX_PROXY_BODY_BYTES)
        .await
        .map_err(|e| AppError::Validation(format!("读取请求体失败: {e}")))?;

    let mut upstream = state
        .client
        .request(method, url)
        .timeout(state.upstream_timeout)
        .bearer_auth(&state.api_key)
        .body(body);
    if let Some(ct) = content_type {
        upstream = upstream.header(reqwest::header::CONTENT_TYPE, ct);
    }

    // reqwest 错误在 AppError 转换中区分超时（504）与网络错误（502）。
    let upstream_res = upstream.send().await?;

    let status = StatusCode::from_u16(upstream_res.status().as_u16())
        .map_err(|e| AppError::Internal(format!("上游状态码非法: {e}")))?;
    let response_type = upstream_res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| HeaderValue::from_bytes(v.as_bytes()).ok());
    let bytes = upstream_res.bytes().await.map_err(AppError::from)?;

    let mut builder = axum::http::Response::builder().status(status);
    if let Some(ct) = response_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    builder
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(format!("构建响应失败: {e}")))
}

/// 构建管理代理路由（挂载到 `/api/admin`）
pub fn create_admin_router() -> Router<AdminState> {
    Router::new()
        .route("/", any(proxy))
        .route("/*path", any(proxy))
}
