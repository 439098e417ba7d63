use axum::{Router, extract::State, http::StatusCode, response::Json, routing::post};
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;

use super::intake::{IntakeHandle, SubmissionKind, SubmissionRecord};
use super::models::{ContactSubmission, QuoteRequest, SubmissionAccepted};

/// 表单能力的路由状态
#[derive(Clone)]
pub struct FormsState {
    pub intake: IntakeHandle,
}

fn accept(
    intake: &IntakeHandle,
    kind: SubmissionKind,
    payload: serde_json::Value,
) -> Result<(StatusCode, Json<SubmissionAccepted>), AppError> {
    let record = SubmissionRecord {
        id: Uuid::new_v4(),
        kind,
        received_at: Utc::now(),
        payload,
    };
    let id = record.id;
    intake.submit(record)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmissionAccepted {
            id: id.to_string(),
            status: "accepted".to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/contact",
    summary = "提交联系表单",
    description = "校验并受理联系表单。受理成功返回 202 与服务端分配的提交 ID，后续投递异步完成。",
    request_body = ContactSubmission,
    responses(
        (status = 202, description = "已受理", body = SubmissionAccepted),
        (
            status = 422,
            description = "参数校验失败",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        ),
        (
            status = 503,
            description = "受理队列已满",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        )
    ),
    tag = "Forms"
)]
pub async fn submit_contact(
    State(state): State<FormsState>,
    Json(submission): Json<ContactSubmission>,
) -> Result<(StatusCode, Json<SubmissionAccepted>), AppError> {
    submission.validate()?;
    let payload = serde_json::to_value(&submission)
        .map_err(|e| AppError::Internal(format!("提交序列化失败: {e}")))?;
    accept(&state.intake, SubmissionKind::Contact, payload)
}

#[utoipa::path(
    post,
    path = "/quote",
    summary = "提交报价请求",
    description = "校验并受理报价请求，行为与联系表单一致。",
    request_body = QuoteRequest,
    responses(
        (status = 202, description = "已受理", body = SubmissionAccepted),
        (
            status = 422,
            description = "参数校验失败",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        ),
        (
            status = 503,
            description = "受理队列已满",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        )
    ),
    tag = "Forms"
)]
pub async fn submit_quote(
    State(state): State<FormsState>,
    Json(submission): Json<QuoteRequest>,
) -> Result<(StatusCode, Json<SubmissionAccepted>), AppError> {
    submission.validate()?;
    let payload = serde_json::to_value(&submission)
        .map_err(|e| AppError::Internal(format!("提交序列化失败: {e}")))?;
    accept(&state.intake, SubmissionKind::Quote, payload)
}

/// 构建表单能力路由（挂载到 API 前缀下）
pub fn create_forms_router() -> Router<FormsState> {
    Router::new()
        .route("/contact", post(submit_contact))
        .route("/quote", post(submit_quote))
}
