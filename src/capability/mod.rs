//! 能力装配核心。
//!
//! 服务的路由表由两部分组成：启动前必须就位的基线路由，以及若干
//! 可选"能力"（一个功能域的一组路由）。能力通过静态注册表声明，
//! 启动时逐个独立初始化：成功则挂载到对应前缀，失败则记录一条
//! 告警并跳过，基线服务与其余能力不受影响。

use std::sync::Arc;

use axum::Router;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::config::AppConfig;

pub mod composer;
pub mod loader;

pub use composer::{ComposeError, MountEntry, MountSource, RouteComposer};
pub use loader::{LoadOutcome, UnavailableReason, load};

/// 能力构建上下文，传递进程级配置。
#[derive(Clone)]
pub struct CapabilityContext {
    pub config: Arc<AppConfig>,
}

/// 能力构建函数：返回一套可直接挂载的路由，或一个构建失败原因。
///
/// 使用普通函数指针而非闭包，保证注册表可以是 `const` 切片。
pub type CapabilityBuild =
    fn(CapabilityContext) -> BoxFuture<'static, Result<Router, CapabilityError>>;

/// 能力描述符：进程生命周期内不变的静态声明。
pub struct CapabilityDescriptor {
    /// 能力名（用于日志与挂载表）
    pub name: &'static str,
    /// 挂载前缀
    pub mount_prefix: &'static str,
    /// 构建函数
    pub build: CapabilityBuild,
}

/// 能力构建失败原因（业务侧）。
///
/// panic 与超时不在此列，由加载器（[`loader::load`]）统一兜底。
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// 已通过配置显式禁用
    #[error("能力已通过配置禁用")]
    Disabled,
    /// 缺少必需配置项
    #[error("缺少必需配置: {0}")]
    MissingConfig(&'static str),
    /// 配置值无效
    #[error("配置无效: {0}")]
    InvalidConfig(String),
    /// 初始化过程失败
    #[error("初始化失败: {0}")]
    Init(String),
}

/// 本服务的能力注册表。
///
/// 顺序只影响日志输出；挂载顺序由各能力初始化完成的先后决定，
/// 能力之间不得相互依赖对方的前缀。
pub fn registry() -> &'static [CapabilityDescriptor] {
    const CAPABILITIES: &[CapabilityDescriptor] = &[
        CapabilityDescriptor {
            name: "forms",
            mount_prefix: "/api",
            build: crate::features::forms::build,
        },
        CapabilityDescriptor {
            name: "admin",
            mount_prefix: "/api/admin",
            build: crate::features::admin::build,
        },
    ];
    CAPABILITIES
}
