//! 情绪接口处理器
//!
//! - GET /sentiment/news?query= - 新闻情绪列表
//! - GET /sentiment/text?text= - 单段文本情绪

use actix_web::{web, HttpResponse, Result};

use super::{error_response, not_found, required_param};
use crate::error::preview;
use crate::models::{NewsQuery, TextQuery};
use crate::services::sentiment::TEXT_PRESET;
use crate::state::AppState;

/// 获取新闻情绪
///
/// GET /api/sentiment/news?query=TSLA
pub async fn get_news_sentiment(
    state: web::Data<AppState>,
    query: web::Query<NewsQuery>,
) -> Result<HttpResponse> {
    let query = match required_param(query.query.as_deref(), "Query") {
        Ok(q) => q,
        Err(e) => return Ok(error_response(&e, "")),
    };
    log::info!("请求新闻情绪: {}", query);

    match state.news.get_news_sentiment(&query).await {
        Ok(articles) if articles.is_empty() => {
            log::warn!("未找到 '{}' 的新闻情绪数据", query);
            Ok(not_found(format!("No news sentiment data found for '{}'", query)))
        }
        Ok(articles) => Ok(HttpResponse::Ok().json(articles)),
        Err(e) => {
            log::error!("获取 '{}' 新闻情绪失败: {}", query, e);
            Ok(error_response(&e, "Error fetching news sentiment."))
        }
    }
}

/// 分析单段文本情绪
///
/// GET /api/sentiment/text?text=...
pub async fn get_text_sentiment(query: web::Query<TextQuery>) -> Result<HttpResponse> {
    let text = query.into_inner().text.unwrap_or_default();
    if let Err(e) = required_param(Some(&text), "Text") {
        log::warn!("文本情绪请求参数无效: {}", e);
        return Ok(error_response(&e, ""));
    }
    log::info!("请求文本情绪: '{}'", preview(&text, 50));

    let result = TEXT_PRESET.score(&text);
    log::info!("文本情绪: {:?}, 分数: {:.2}", result.label, result.score);
    Ok(HttpResponse::Ok().json(result))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sentiment")
            .route("/news", web::get().to(get_news_sentiment))
            .route("/text", web::get().to(get_text_sentiment)),
    );
}
