//! 关键词情绪打分
//!
//! 同一套打分逻辑，两组参数：直接文本用 `TEXT_PRESET`，新闻用 `ARTICLE_PRESET`

use crate::models::{SentimentLabel, SentimentResult};

/// 关键词计分方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matching {
    /// 每个命中的关键词各计一次
    PerKeyword,
    /// 列表中任一关键词命中即计一次
    AnyKeyword,
}

/// 标签阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// `>= t` 为正面，`<= -t` 为负面
    Inclusive(f64),
    /// `> t` 为正面，`< -t` 为负面
    Exclusive(f64),
}

impl Threshold {
    pub fn label(&self, score: f64) -> SentimentLabel {
        match *self {
            Self::Inclusive(t) if score >= t => SentimentLabel::Positive,
            Self::Inclusive(t) if score <= -t => SentimentLabel::Negative,
            Self::Exclusive(t) if score > t => SentimentLabel::Positive,
            Self::Exclusive(t) if score < -t => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }
}

/// 一组打分参数
#[derive(Debug, Clone, Copy)]
pub struct KeywordPreset {
    pub name: &'static str,
    pub positive: &'static [&'static str],
    pub negative: &'static [&'static str],
    pub increment: f64,
    pub matching: Matching,
    pub threshold: Threshold,
}

pub const TEXT_PRESET: KeywordPreset = KeywordPreset {
    name: "text",
    positive: &[
        "excellent", "amazing", "fantastic", "love", "good", "great", "positive", "recommend",
        "strong buy",
    ],
    negative: &[
        "terrible", "awful", "bad", "poor", "hate", "negative", "avoid", "strong sell",
    ],
    increment: 0.2,
    matching: Matching::PerKeyword,
    threshold: Threshold::Inclusive(0.1),
};

pub const ARTICLE_PRESET: KeywordPreset = KeywordPreset {
    name: "article",
    positive: &["good", "great", "positive", "up", "profit", "buy"],
    negative: &["bad", "poor", "negative", "down", "loss", "sell"],
    increment: 0.5,
    matching: Matching::AnyKeyword,
    threshold: Threshold::Exclusive(0.1),
};

impl KeywordPreset {
    /// 计算截断到 [-1, 1] 并保留两位小数的分数
    pub fn raw_score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let hits = |keywords: &[&str]| {
            let count = keywords.iter().filter(|kw| lower.contains(*kw)).count();
            match self.matching {
                Matching::PerKeyword => count,
                Matching::AnyKeyword => count.min(1),
            }
        };

        let score = (hits(self.positive) as f64 - hits(self.negative) as f64) * self.increment;
        round2(score.clamp(-1.0, 1.0))
    }

    pub fn score(&self, text: &str) -> SentimentResult {
        let score = self.raw_score(text);
        let label = self.threshold.label(score);
        log::debug!("{} 情绪打分: {:?}, 分数: {:.2}", self.name, label, score);

        SentimentResult {
            text: text.to_string(),
            label,
            score,
        }
    }
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // 避免 -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_preset_positive_example() {
        let result = TEXT_PRESET.score("This is an excellent and great stock, strong buy");
        assert_eq!(result.score, 0.6);
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.text, "This is an excellent and great stock, strong buy");
    }

    #[test]
    fn test_text_preset_clamps_negative() {
        let result = TEXT_PRESET.score("terrible awful bad poor hate negative avoid");
        assert_eq!(result.score, -1.0);
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_no_multiplicity() {
        let once = TEXT_PRESET.raw_score("good");
        let many = TEXT_PRESET.raw_score("good good GOOD goodness");
        assert_eq!(once, 0.2);
        assert_eq!(many, 0.2);
    }

    #[test]
    fn test_substring_matching() {
        // "badge" 包含 "bad"
        assert_eq!(TEXT_PRESET.raw_score("a shiny badge"), -0.2);
    }

    #[test]
    fn test_mixed_text_is_neutral() {
        let result = TEXT_PRESET.score("good but bad");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.label, SentimentLabel::Neutral);

        let result = TEXT_PRESET.score("nothing to see here");
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_article_preset_binary_match() {
        assert_eq!(ARTICLE_PRESET.raw_score("Great profit, buy now"), 0.5);
        assert_eq!(ARTICLE_PRESET.raw_score("Shares down on loss, sell"), -0.5);
        assert_eq!(ARTICLE_PRESET.raw_score("Profit up but shares down"), 0.0);
        assert_eq!(
            ARTICLE_PRESET.score("Record profit reported").label,
            SentimentLabel::Positive
        );
    }

    #[test]
    fn test_threshold_boundaries_differ_per_preset() {
        assert_eq!(Threshold::Inclusive(0.1).label(0.1), SentimentLabel::Positive);
        assert_eq!(Threshold::Inclusive(0.1).label(-0.1), SentimentLabel::Negative);
        assert_eq!(Threshold::Exclusive(0.1).label(0.1), SentimentLabel::Neutral);
        assert_eq!(Threshold::Exclusive(0.1).label(-0.1), SentimentLabel::Neutral);
        assert_eq!(Threshold::Exclusive(0.1).label(0.11), SentimentLabel::Positive);
    }

    #[test]
    fn test_result_json_keys() {
        let json = serde_json::to_value(TEXT_PRESET.score("I love it")).unwrap();
        assert_eq!(json["sentiment"], "positive");
        assert_eq!(json["score"], 0.2);
        assert_eq!(json["text"], "I love it");
    }
}
