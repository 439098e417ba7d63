//! 公共表单提交能力：联系表单与报价请求的受理与异步转发。

pub mod handler;
pub mod intake;
pub mod models;

use axum::Router;
use futures_util::future::BoxFuture;

use crate::capability::{CapabilityContext, CapabilityError};

pub use handler::{FormsState, create_forms_router};

/// 能力构建入口（注册表引用）。
///
/// 启用校验与转发配置解析失败都转成 [`CapabilityError`]，
/// 由加载器统一按"能力不可用"处理。
pub fn build(ctx: CapabilityContext) -> BoxFuture<'static, Result<Router, CapabilityError>> {
    Box::pin(async move {
        let forms = &ctx.config.forms;
        if !forms.enabled {
            return Err(CapabilityError::Disabled);
        }

        let intake = intake::spawn_intake(forms)?;
        Ok(create_forms_router().with_state(FormsState { intake }))
    })
}
