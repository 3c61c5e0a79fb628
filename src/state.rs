//! 应用共享状态
//!
//! 启动时构建一次，之后只读

use minijinja::Environment;

use crate::config::AppConfig;
use crate::handlers::pages;
use crate::services::sentiment::NewsService;
use crate::services::stock::StockService;

pub struct AppState {
    pub config: AppConfig,
    pub stocks: StockService,
    pub news: NewsService,
    /// 页面模板
    pub templates: Environment<'static>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            stocks: StockService::new(&config.api)?,
            news: NewsService::new(&config.api)?,
            templates: pages::template_env()?,
            config,
        })
    }
}
