use actix_web::{web, HttpResponse, Result};
use crate::models::{ApiResponse, HealthStatus};

pub async fn health_check() -> Result<HttpResponse> {
    log::info!("健康检查");
    let response = ApiResponse::success(HealthStatus {
        status: "healthy".to_string(),
        message: "API is operational".to_string(),
    });
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
