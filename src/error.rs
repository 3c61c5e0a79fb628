//! 错误类型定义
//!
//! 区分上游接口错误、上游数据格式错误与调用方输入错误

use actix_web::http::StatusCode;
use thiserror::Error;

/// 服务层统一错误
#[derive(Debug, Error)]
pub enum AppError {
    /// 上游接口明确返回了错误/提示信息（如 "Error Message"、"Information"）
    #[error("{provider} API error: {message}")]
    UpstreamApi { provider: String, message: String },

    /// 上游返回了无法识别的数据结构
    #[error("unexpected upstream format: {0}")]
    UpstreamFormat(String),

    /// 调用方输入不满足前置条件
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 网络或 HTTP 错误
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON 解析错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 页面模板渲染错误
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl AppError {
    pub fn upstream_api(provider: &str, message: impl Into<String>) -> Self {
        Self::UpstreamApi {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// 对应的 HTTP 状态码，只有输入错误会暴露为 400
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// 截断响应内容用于日志输出
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}
