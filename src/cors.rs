use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

/// CORS 配置错误。
///
/// CORS 属于基线中间件：配置已启用但无法构建出可用的 layer 时，
/// 启动应当失败，而不是降级为"未启用 CORS"继续对外服务。
#[derive(Debug, Error)]
pub enum CorsConfigError {
    #[error("allow_credentials=true 不能与 \"*\" 同时使用")]
    CredentialsWithWildcard,
    #[error("CORS 已启用但 allowed_origins 中没有可用条目")]
    NoUsableOrigins,
}

struct Parsed<T> {
    any: bool,
    values: Vec<T>,
}

fn parse_values<T>(label: &str, raw_values: &[String], parse: fn(&str) -> Option<T>) -> Parsed<T> {
    let mut any = false;
    let mut values = Vec::new();
    for raw in raw_values {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        if value == "*" {
            any = true;
            continue;
        }
        match parse(value) {
            Some(v) => values.push(v),
            None => tracing::warn!("CORS {} 含无效值: {}", label, value),
        }
    }
    Parsed { any, values }
}

/// 根据配置构建 CORS 中间件。
///
/// - `enabled=false` 返回 `Ok(None)`，不加 layer；
/// - 启用但配置不可用（凭证与通配符冲突、无可用 Origin）返回错误，由启动方中止。
pub fn build_cors_layer(cors: &CorsConfig) -> Result<Option<CorsLayer>, CorsConfigError> {
    if !cors.enabled {
        return Ok(None);
    }

    let origins = parse_values("allowed_origins", &cors.allowed_origins, |v| {
        HeaderValue::from_str(v).ok()
    });
    if !origins.any && origins.values.is_empty() {
        return Err(CorsConfigError::NoUsableOrigins);
    }

    let methods = parse_values("allowed_methods", &cors.allowed_methods, |v| {
        Method::from_bytes(v.to_ascii_uppercase().as_bytes()).ok()
    });
    let headers = parse_values("allowed_headers", &cors.allowed_headers, |v| {
        HeaderName::from_bytes(v.to_ascii_lowercase().as_bytes()).ok()
    });
    let expose = parse_values("expose_headers", &cors.expose_headers, |v| {
        HeaderName::from_bytes(v.to_ascii_lowercase().as_bytes()).ok()
    });

    if cors.allow_credentials && (origins.any || methods.any || headers.any || expose.any) {
        return Err(CorsConfigError::CredentialsWithWildcard);
    }

    let mut layer = CorsLayer::new();

    if origins.any {
        layer = layer.allow_origin(Any);
    } else {
        layer = layer.allow_origin(origins.values);
    }

    if methods.any {
        layer = layer.allow_methods(Any);
    } else if !methods.values.is_empty() {
        layer = layer.allow_methods(methods.values);
    }

    if headers.any {
        layer = layer.allow_headers(Any);
    } else if !headers.values.is_empty() {
        layer = layer.allow_headers(headers.values);
    }

    if expose.any {
        layer = layer.expose_headers(Any);
    } else if !expose.values.is_empty() {
        layer = layer.expose_headers(expose.values);
    }

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(secs) = cors.max_age_secs
        && secs > 0
    {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Ok(Some(layer))
}
