//! 行情与新闻情绪后端服务
//!
//! 提供股票历史行情、均线信号与新闻情绪的 JSON 接口和简单的 HTML 页面
//! 数据来源：Alpha Vantage、NewsAPI

mod config;   // 配置加载
mod error;    // 错误类型
mod handlers; // HTTP 请求处理器
mod models;   // 数据模型定义
mod services; // 业务逻辑服务
mod state;    // 共享状态

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::state::AppState;

/// 应用程序入口
///
/// 加载配置后启动 HTTP 服务器，默认监听 0.0.0.0:8000
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let (config, notes) = AppConfig::load();

    // 初始化日志系统，默认级别取自配置
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    for note in &notes {
        log::info!("{}", note);
    }

    log::info!("启动 {}", config.api.project_name);
    log::info!("调试模式: {}", config.api.debug);
    log::info!("限流配置（未强制）: {}", config.api.default_rate_limit);
    if config.api.alpha_vantage_api_key.is_empty() {
        log::warn!("未设置 ALPHA_VANTAGE_API_KEY，行情接口将返回空结果");
    }
    if config.api.news_api_key.is_empty() {
        log::warn!("未设置 NEWS_API_KEY，新闻情绪接口将返回空结果");
    }

    let bind_addr = config.bind_addr();
    let workers = config.server.workers;
    let state = web::Data::new(AppState::new(config)?);

    log::info!("监听 {}", bind_addr);

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // 请求日志
            .app_data(state.clone())
            .configure(handlers::config) // 配置路由
    });
    if workers > 0 {
        server = server.workers(workers);
    }

    server.bind(bind_addr)?.run().await?;

    log::info!("服务已停止");
    Ok(())
}
