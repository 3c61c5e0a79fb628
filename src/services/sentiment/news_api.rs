//! NewsAPI 新闻接口实现
//!
//! 对接 https://newsapi.org/v2/everything，按查询词拉取最近新闻并逐条打分

use chrono::{Duration, Local, NaiveDate};
use reqwest::Client;
use std::time::Duration as StdDuration;
use url::Url;

use super::scorer::ARTICLE_PRESET;
use crate::config::ApiConfig;
use crate::error::{preview, AppError, Result};
use crate::models::{ArticleSentiment, NewsApiResponse, NewsArticle};

const PROVIDER: &str = "NewsAPI";

/// 配置的回溯天数不可用时的默认值
const DEFAULT_DAYS_BACK: i64 = 7;

/// 新闻检索窗口的起始日期
///
/// 回溯天数非正或超出日期范围时退回 7 天
fn window_start(today: NaiveDate, days_back: i64) -> NaiveDate {
    let start = |days: i64| Duration::try_days(days).and_then(|d| today.checked_sub_signed(d));
    match start(days_back).filter(|_| days_back > 0) {
        Some(date) => date,
        None => {
            log::warn!("新闻回溯天数 {} 无效，使用 {} 天", days_back, DEFAULT_DAYS_BACK);
            start(DEFAULT_DAYS_BACK).unwrap_or(today)
        }
    }
}

/// 新闻情绪服务
pub struct NewsService {
    client: Client,
    base_url: Url,
    api_key: String,
    days_back: i64,
    page_size: u32,
}

impl NewsService {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .connect_timeout(StdDuration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.news_api_base_url)?,
            api_key: config.news_api_key.clone(),
            days_back: config.news_days_back,
            page_size: config.news_page_size,
        })
    }

    /// 获取查询词相关新闻并打分
    ///
    /// 未配置 API Key 时直接返回空列表
    pub async fn get_news_sentiment(&self, query: &str) -> Result<Vec<ArticleSentiment>> {
        log::info!("获取新闻情绪: '{}'", query);

        if self.api_key.is_empty() {
            log::error!("未配置 NewsAPI Key");
            return Ok(Vec::new());
        }

        let from_date = window_start(Local::now().date_naive(), self.days_back)
            .format("%Y-%m-%d")
            .to_string();
        let page_size = self.page_size.to_string();

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("q", query),
                ("apiKey", self.api_key.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("from", from_date.as_str()),
                ("language", "en"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        log::debug!("{} 响应 '{}': {}", PROVIDER, query, preview(&text, 200));

        if !status.is_success() {
            // NewsAPI 的错误响应同样带 message
            let message = serde_json::from_str::<NewsApiResponse>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            log::error!("{} 请求失败 '{}': {}", PROVIDER, query, message);
            return Err(AppError::upstream_api(PROVIDER, message));
        }

        let body: NewsApiResponse = serde_json::from_str(&text)?;
        let articles = score_articles(body)?;
        if articles.is_empty() {
            log::warn!("未找到 '{}' 的相关新闻", query);
        } else {
            log::info!("'{}' 共处理 {} 条新闻", query, articles.len());
        }
        Ok(articles)
    }
}

/// 校验响应状态并对每条新闻打分
pub fn score_articles(body: NewsApiResponse) -> Result<Vec<ArticleSentiment>> {
    match body.status.as_deref() {
        Some("ok") => Ok(body.articles.into_iter().map(score_article).collect()),
        _ => Err(AppError::upstream_api(
            PROVIDER,
            body.message.unwrap_or_else(|| "unknown error".to_string()),
        )),
    }
}

fn score_article(article: NewsArticle) -> ArticleSentiment {
    let title = article.title.unwrap_or_default();
    let description = article.description.unwrap_or_default();
    let result = ARTICLE_PRESET.score(&format!("{}. {}", title, description));

    ArticleSentiment {
        title,
        source: article.source.and_then(|s| s.name),
        published_at: article.published_at,
        url: article.url,
        sentiment: result.label,
        sentiment_score: result.score,
    }
}
