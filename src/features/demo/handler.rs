use axum::response::Json;
use serde::Serialize;

/// 演示端点响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DemoResponse {
    /// 固定的演示消息
    #[schema(example = "Hello from the nova backend")]
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/demo",
    summary = "演示端点",
    description = "站点前端联调用的固定演示响应。",
    responses((status = 200, description = "演示响应", body = DemoResponse)),
    tag = "Baseline"
)]
pub async fn demo() -> Json<DemoResponse> {
    Json(DemoResponse {
        message: "Hello from the nova backend".to_string(),
    })
}
