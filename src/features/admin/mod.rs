//! 管理代理能力：把 `/api/admin/*` 转发到外部内容平台。
//!
//! 凭证只在本服务侧持有，站点管理端无需直接接触平台 API Key。

pub mod handler;

use axum::Router;
use futures_util::future::BoxFuture;
use reqwest::Url;
use std::time::Duration;

use crate::capability::{CapabilityContext, CapabilityError};

pub use handler::{AdminState, create_admin_router};

/// 能力构建入口（注册表引用）。
///
/// 平台地址与 API Key 缺一不可：缺失按"能力不可用"处理，
/// 不影响基线服务启动。
pub fn build(ctx: CapabilityContext) -> BoxFuture<'static, Result<Router, CapabilityError>> {
    Box::pin(async move {
        let admin = &ctx.config.admin;
        if !admin.enabled {
            return Err(CapabilityError::Disabled);
        }

        let raw_url = admin
            .platform_url
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(CapabilityError::MissingConfig("admin.platform_url"))?;
        let api_key = admin
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(CapabilityError::MissingConfig("admin.api_key"))?
            .to_string();

        let platform_url = Url::parse(raw_url)
            .map_err(|e| CapabilityError::InvalidConfig(format!("admin.platform_url 无效: {e}")))?;
        if !matches!(platform_url.scheme(), "http" | "https") {
            return Err(CapabilityError::InvalidConfig(format!(
                "admin.platform_url 仅支持 http/https: {platform_url}"
            )));
        }

        let client = crate::http::shared_client()
            .map_err(|e| CapabilityError::Init(format!("HTTP client 构建失败: {e}")))?
            .clone();

        let state = AdminState {
            platform_url,
            api_key,
            client,
            upstream_timeout: Duration::from_secs(admin.timeout_secs.max(1)),
        };
        Ok(create_admin_router().with_state(state))
    })
}
