//! 服务装配入口。
//!
//! 装配顺序固定：全局中间件 → 基线路由（失败即启动失败）→ 为每个
//! 注册的能力启动独立装配任务，随后立即返回可用的应用对象。基线
//! 流量从返回那一刻起即可处理，能力路由在各自初始化完成后陆续
//! 生效，先于挂载到达的请求得到标准 404。

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware,
    response::Response,
    routing::get,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_http::{compression::CompressionLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::capability::{
    self, CapabilityContext, CapabilityDescriptor, LoadOutcome, RouteComposer,
};
use crate::config::AppConfig;
use crate::cors::build_cors_layer;
use crate::error::AppError;
use crate::features;
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 装配完成的应用对象。
///
/// `router` 返回即可对外服务；能力装配任务在后台独立推进。
pub struct Application {
    router: Router,
    composer: RouteComposer,
    capability_tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("capability_tasks", &self.capability_tasks.len())
            .finish_non_exhaustive()
    }
}

impl Application {
    /// 对外服务的根路由
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// 路由装配器（诊断与测试用）
    pub fn composer(&self) -> &RouteComposer {
        &self.composer
    }

    /// 等待所有能力装配任务收尾。
    ///
    /// 正常启动路径不需要调用，返回的应用对象立即可用；
    /// 测试与诊断场景用它消除装配竞态。
    pub async fn wait_for_capabilities(&mut self) {
        for task in self.capability_tasks.drain(..) {
            let _ = task.await;
        }
    }
}

/// 组装应用。
///
/// 必须在 tokio runtime 内调用（能力装配通过 `tokio::spawn` 推进）。
/// 只有基线构建错误会从这里返回；单个能力的任何失败形态都被
/// 加载器收敛为一条告警日志。
pub fn build_application(
    config: Arc<AppConfig>,
    capabilities: &'static [CapabilityDescriptor],
) -> Result<Application, AppError> {
    // CORS 属于基线中间件：配置不可用时中止启动而不是降级。
    let cors = build_cors_layer(&config.cors).map_err(|e| AppError::Config(e.to_string()))?;

    let composer = RouteComposer::new();
    composer
        .mount_baseline(baseline_routes(&config))
        .map_err(|e| AppError::Config(format!("基线路由挂载失败: {e}")))?;

    let mut app = Router::new()
        .fallback(dispatch)
        .with_state(composer.clone())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(CompressionLayer::new());
    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    let capability_tasks = spawn_capability_loads(&composer, &config, capabilities);

    Ok(Application {
        router: app,
        composer,
        capability_tasks,
    })
}

/// 基线路由：健康检查、ping/demo、接口文档，以及可选的前端静态托管。
fn baseline_routes(config: &Arc<AppConfig>) -> Router {
    let state = AppState {
        config: config.clone(),
    };
    let api = Router::new()
        .route("/ping", get(features::ping::handler::ping))
        .route("/demo", get(features::demo::handler::demo))
        .with_state(state);

    let mut routes = Router::new()
        .route("/health", get(features::health::handler::health_check))
        .nest(&config.api.prefix, api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(dist_dir) = &config.frontend.dist_dir {
        // 未匹配到任何 API 的路径回退到前端构建产物。
        routes = routes.fallback_service(ServeDir::new(dist_dir));
    }
    routes
}

/// 请求分发：通过装配器的当前路由快照处理每个请求。
async fn dispatch(State(composer): State<RouteComposer>, req: Request) -> Response {
    let snapshot = composer.snapshot();
    match snapshot.as_ref().clone().oneshot(req).await {
        Ok(response) => response,
        Err(infallible) => match infallible {},
    }
}

/// 为每个能力启动一个独立装配任务。
///
/// 任务之间互不等待：某个能力的失败或缓慢不会推迟其他能力的
/// 挂载，也不会推迟应用对象可用的时刻。每个失败的能力恰好产生
/// 一条 warn 日志，带能力名与原因。
fn spawn_capability_loads(
    composer: &RouteComposer,
    config: &Arc<AppConfig>,
    capabilities: &'static [CapabilityDescriptor],
) -> Vec<JoinHandle<()>> {
    capabilities
        .iter()
        .map(|descriptor| {
            let composer = composer.clone();
            let ctx = CapabilityContext {
                config: config.clone(),
            };
            let load_timeout = config.capabilities.load_timeout();
            tokio::spawn(async move {
                match capability::load(descriptor, ctx, load_timeout).await {
                    LoadOutcome::Available(routes) => {
                        match composer.mount_capability(
                            descriptor.name,
                            descriptor.mount_prefix,
                            routes,
                        ) {
                            Ok(()) => tracing::info!(
                                capability = descriptor.name,
                                prefix = descriptor.mount_prefix,
                                "能力路由已挂载"
                            ),
                            Err(e) => tracing::warn!(
                                capability = descriptor.name,
                                reason = %e,
                                "能力路由挂载被拒绝"
                            ),
                        }
                    }
                    LoadOutcome::Unavailable(reason) => {
                        tracing::warn!(
                            capability = descriptor.name,
                            reason = %reason,
                            "能力不可用，已跳过挂载（基线服务不受影响）"
                        );
                    }
                }
            })
        })
        .collect()
}
