//! 情绪分析数据模型

use serde::{Deserialize, Serialize};

/// 情绪标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// 文本情绪结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    /// 原始文本或新闻标题
    pub text: String,
    #[serde(rename = "sentiment")]
    pub label: SentimentLabel,
    /// 取值范围 [-1, 1]，保留两位小数
    pub score: f64,
}

/// 单条新闻及其情绪
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSentiment {
    pub title: String,
    pub source: Option<String>,
    pub published_at: Option<String>,
    pub url: Option<String>,
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
}

/// NewsAPI 原始响应
#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source: Option<NewsSource>,
    pub published_at: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsSource {
    pub name: Option<String>,
}

/// 新闻情绪查询参数
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub query: Option<String>,
}

/// 文本情绪查询参数
#[derive(Debug, Deserialize)]
pub struct TextQuery {
    pub text: Option<String>,
}
