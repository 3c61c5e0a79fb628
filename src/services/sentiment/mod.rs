//! 情绪分析服务模块
//!
//! 新闻拉取（NewsAPI）与关键词打分

pub mod news_api;
pub mod scorer;

pub use news_api::NewsService;
pub use scorer::TEXT_PRESET;
