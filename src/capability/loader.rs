//! 能力加载器：故障隔离边界。
//!
//! 每个能力在进程启动时仅尝试加载一次。构建过程中的任何失败形态
//! （返回错误、panic、超时）都被收敛为 [`LoadOutcome::Unavailable`]，
//! 绝不向调用方抛出：一个能力的缺陷不能影响基线服务或其他能力。

use std::time::Duration;

use axum::Router;
use tokio::time::timeout;

use super::{CapabilityContext, CapabilityDescriptor, CapabilityError};

/// 单次能力加载的结果。
///
/// 每个描述符每次进程启动只产生一次，之后不再重试。
pub enum LoadOutcome {
    /// 构建成功，返回可挂载的路由
    Available(Router),
    /// 构建失败及其诊断原因
    Unavailable(UnavailableReason),
}

/// 能力不可用的原因
#[derive(Debug, thiserror::Error)]
pub enum UnavailableReason {
    /// 构建函数返回了业务侧错误（禁用/缺配置/配置无效/初始化失败）
    #[error(transparent)]
    Build(CapabilityError),
    /// 构建任务 panic
    #[error("初始化任务 panic: {0}")]
    Panicked(String),
    /// 构建超过时限仍未完成，任务已中止
    #[error("初始化超过 {0:?} 未完成，已中止")]
    TimedOut(Duration),
}

/// 加载单个能力。
///
/// 构建函数在独立的 tokio 任务中执行：panic 被运行时捕获为
/// `JoinError`，不会沿调用栈展开到装配层；超出 `load_timeout`
/// 的任务被中止，避免悬挂的能力阻塞启动收尾。
pub async fn load(
    descriptor: &CapabilityDescriptor,
    ctx: CapabilityContext,
    load_timeout: Duration,
) -> LoadOutcome {
    let mut task = tokio::spawn((descriptor.build)(ctx));

    match timeout(load_timeout, &mut task).await {
        Err(_elapsed) => {
            task.abort();
            LoadOutcome::Unavailable(UnavailableReason::TimedOut(load_timeout))
        }
        Ok(Err(join_err)) => {
            let detail = if join_err.is_panic() {
                panic_message(join_err.into_panic())
            } else {
                // 仅在超时分支主动 abort，此处只剩运行时关停等边缘情况
                join_err.to_string()
            };
            LoadOutcome::Unavailable(UnavailableReason::Panicked(detail))
        }
        Ok(Ok(Err(build_err))) => LoadOutcome::Unavailable(UnavailableReason::Build(build_err)),
        Ok(Ok(Ok(routes))) => LoadOutcome::Available(routes),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "非字符串 panic payload".to_string()
    }
}
