use std::sync::Arc;

use crate::config::AppConfig;

/// 聚合的应用共享状态（基线路由使用）。
///
/// 可选能力各自在构建时装配自己的状态，不经由这里。
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}
