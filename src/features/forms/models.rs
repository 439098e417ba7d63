use serde::{Deserialize, Serialize};

use crate::error::AppError;

const MAX_NAME_CHARS: usize = 200;
const MAX_EMAIL_CHARS: usize = 320;
const MAX_MESSAGE_CHARS: usize = 4000;

/// 联系表单提交
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    /// 提交人姓名
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// 联系邮箱
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// 留言内容
    pub message: String,
}

/// 报价请求提交
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// 提交人姓名
    pub name: String,
    /// 联系邮箱
    pub email: String,
    /// 公司名称（可选）
    #[serde(default)]
    pub company: Option<String>,
    /// 项目类型（可选，自由文本）
    #[serde(default)]
    pub project_type: Option<String>,
    /// 预算区间（可选，自由文本）
    #[serde(default)]
    pub budget: Option<String>,
    /// 需求描述
    pub message: String,
}

/// 提交受理响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAccepted {
    /// 服务端分配的提交 ID
    #[schema(example = "8b8f2f8a-1a2b-4c3d-9e0f-112233445566")]
    pub id: String,
    /// 固定为 "accepted"
    #[schema(example = "accepted")]
    pub status: String,
}

fn require_text(field: &str, value: &str, max_chars: usize) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} 不能为空")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} 超过最大长度 {max_chars}"
        )));
    }
    Ok(())
}

fn require_email(value: &str) -> Result<(), AppError> {
    require_text("email", value, MAX_EMAIL_CHARS)?;
    let trimmed = value.trim();
    // 只做形状校验；真实有效性由后续转发目标判断。
    let well_formed = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if well_formed {
        Ok(())
    } else {
        Err(AppError::Validation("email 格式不正确".to_string()))
    }
}

impl ContactSubmission {
    /// 校验提交内容，失败返回 422 级别的校验错误。
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("name", &self.name, MAX_NAME_CHARS)?;
        require_email(&self.email)?;
        require_text("message", &self.message, MAX_MESSAGE_CHARS)
    }
}

impl QuoteRequest {
    /// 校验提交内容，可选字段只限制长度。
    pub fn validate(&self) -> Result<(), AppError> {
        require_text("name", &self.name, MAX_NAME_CHARS)?;
        require_email(&self.email)?;
        require_text("message", &self.message, MAX_MESSAGE_CHARS)?;
        for (field, value) in [
            ("company", &self.company),
            ("projectType", &self.project_type),
            ("budget", &self.budget),
        ] {
            if let Some(v) = value {
                require_text(field, v, MAX_NAME_CHARS)?;
            }
        }
        Ok(())
    }
}
