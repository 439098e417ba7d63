//! 提交受理管道：有界队列 + 后台转发任务。
//!
//! 请求处理路径只做入队，转发（或落日志）由独立任务完成，
//! 上游转发目标的延迟不会传导到表单接口的响应时间。

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::capability::CapabilityError;
use crate::config::FormsConfig;
use crate::error::AppError;

/// 提交类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Contact,
    Quote,
}

impl SubmissionKind {
    fn as_str(self) -> &'static str {
        match self {
            SubmissionKind::Contact => "contact",
            SubmissionKind::Quote => "quote",
        }
    }
}

/// 一条已受理的提交记录
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// 服务端分配的提交 ID
    pub id: Uuid,
    /// 提交类型
    pub kind: SubmissionKind,
    /// 受理时间（UTC）
    pub received_at: DateTime<Utc>,
    /// 原始提交内容（已通过校验）
    pub payload: serde_json::Value,
}

/// 受理管道句柄：对请求处理路径只暴露入队操作。
#[derive(Clone, Debug)]
pub struct IntakeHandle {
    tx: mpsc::Sender<SubmissionRecord>,
}

impl IntakeHandle {
    /// 入队一条提交记录。
    ///
    /// 队列满时返回 503：表单提交是用户数据，不做静默丢弃。
    pub fn submit(&self, record: SubmissionRecord) -> Result<(), AppError> {
        self.tx.try_send(record).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => {
                AppError::Overloaded("提交队列已满，请稍后重试".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                AppError::Internal("提交处理任务已退出".to_string())
            }
        })
    }
}

/// 启动受理管道：解析转发配置并 spawn 后台转发任务。
pub fn spawn_intake(config: &FormsConfig) -> Result<IntakeHandle, CapabilityError> {
    let forward_url = match &config.forward_url {
        Some(raw) => Some(Url::parse(raw).map_err(|e| {
            CapabilityError::InvalidConfig(format!("forms.forward_url 无效: {e}"))
        })?),
        None => None,
    };

    let client = crate::http::shared_client()
        .map_err(|e| CapabilityError::Init(format!("HTTP client 构建失败: {e}")))?
        .clone();

    let (tx, mut rx) = mpsc::channel::<SubmissionRecord>(config.queue_capacity.max(1));
    let forward_timeout = Duration::from_secs(config.forward_timeout_secs.max(1));

    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            deliver(&client, forward_url.as_ref(), forward_timeout, record).await;
        }
        tracing::debug!("表单受理任务退出（通道已关闭）");
    });

    Ok(IntakeHandle { tx })
}

async fn deliver(
    client: &reqwest::Client,
    forward_url: Option<&Url>,
    forward_timeout: Duration,
    record: SubmissionRecord,
) {
    let Some(url) = forward_url else {
        // 未配置转发目标：仅落日志，站点运维人工跟进。
        tracing::info!(
            submission_id = %record.id,
            kind = record.kind.as_str(),
            "已受理表单提交（未配置转发目标）"
        );
        return;
    };

    let result = client
        .post(url.clone())
        .timeout(forward_timeout)
        .json(&record)
        .send()
        .await;

    match result {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!(
                submission_id = %record.id,
                kind = record.kind.as_str(),
                "表单提交已转发"
            );
        }
        Ok(resp) => {
            tracing::warn!(
                submission_id = %record.id,
                kind = record.kind.as_str(),
                status = resp.status().as_u16(),
                "转发目标返回非成功状态"
            );
        }
        Err(e) => {
            tracing::warn!(
                submission_id = %record.id,
                kind = record.kind.as_str(),
                error = %e,
                "表单提交转发失败"
            );
        }
    }
}
