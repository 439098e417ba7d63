use utoipa::OpenApi;

/// OpenAPI 文档聚合。
///
/// 只覆盖本服务自有的接口：管理代理 `/api/admin/*` 的真实 surface
/// 由外部内容平台定义，不在此重复描述。
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::ping::handler::ping,
        crate::features::demo::handler::demo,
        crate::features::forms::handler::submit_contact,
        crate::features::forms::handler::submit_quote,
    ),
    components(
        schemas(
            crate::error::AppError,
            crate::error::ProblemDetails,
            crate::error::ProblemFieldError,
            crate::features::health::handler::HealthResponse,
            crate::features::ping::handler::PingResponse,
            crate::features::demo::handler::DemoResponse,
            crate::features::forms::models::ContactSubmission,
            crate::features::forms::models::QuoteRequest,
            crate::features::forms::models::SubmissionAccepted,
        )
    ),
    tags(
        (name = "Health", description = "Health APIs"),
        (name = "Baseline", description = "Baseline APIs"),
        (name = "Forms", description = "Form intake APIs"),
    ),
    info(
        title = "Nova Backend API",
        version = "0.1.0",
        description = "Nova 站点后端服务 (Axum)"
    )
)]
pub struct ApiDoc;
