pub mod health;
pub mod pages;
pub mod sentiment;
pub mod stock;

use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::ApiResponse;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(pages::config).service(
        web::scope("/api")
            .configure(health::config)
            .configure(stock::config)
            .configure(sentiment::config),
    );
}

/// 错误响应：输入错误返回具体原因，上游错误只返回通用提示，细节写日志
pub(crate) fn error_response(err: &AppError, public_message: &str) -> HttpResponse {
    let message = match err {
        AppError::InvalidInput(reason) => reason.clone(),
        _ => public_message.to_string(),
    };
    HttpResponse::build(err.status_code()).json(ApiResponse::<()>::error(message))
}

pub(crate) fn not_found(message: String) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(message))
}

/// 取出非空的查询参数，去除首尾空白后为空视为无效输入
pub(crate) fn required_param(value: Option<&str>, name: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::InvalidInput(format!("{} cannot be empty.", name))),
    }
}
