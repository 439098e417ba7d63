use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::state::AppState;

/// ping 响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PingResponse {
    /// 配置的消息文本（默认 "ping"，可由 APP_PING_MESSAGE 覆盖）
    #[schema(example = "ping")]
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/ping",
    summary = "连通性探测",
    description = "返回配置的消息文本。消息来自 `ping.message`，默认为 \"ping\"，可通过环境变量 APP_PING_MESSAGE 覆盖。",
    responses((status = 200, description = "探测成功", body = PingResponse)),
    tag = "Baseline"
)]
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        message: state.config.ping.message.clone(),
    })
}
