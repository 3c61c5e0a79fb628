//! Alpha Vantage 行情接口实现
//!
//! 对接 https://www.alphavantage.co/query，拉取日线序列后交给 normalizer 处理

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::normalizer::{self, Period};
use crate::config::ApiConfig;
use crate::error::{preview, AppError, Result};
use crate::models::NormalizedSeries;

const PROVIDER: &str = "Alpha Vantage";

/// 根据时间范围选择接口函数和数据量
///
/// 短周期用普通日线的最近 100 条，其余取复权日线全量
pub fn api_function(period: Period) -> (&'static str, &'static str) {
    if period.is_short() {
        ("TIME_SERIES_DAILY", "compact")
    } else {
        ("TIME_SERIES_DAILY_ADJUSTED", "full")
    }
}

/// 股票行情服务
pub struct StockService {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl StockService {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.alpha_vantage_base_url)?,
            api_key: config.alpha_vantage_api_key.clone(),
        })
    }

    /// 获取归一化后的行情序列
    ///
    /// 未配置 API Key 时直接返回空序列
    pub async fn get_stock_series(&self, symbol: &str, period: Period) -> Result<NormalizedSeries> {
        log::info!("获取行情数据: {}, 时间范围: {:?}", symbol, period);

        if self.api_key.is_empty() {
            log::error!("未配置 Alpha Vantage API Key");
            return Ok(NormalizedSeries::empty());
        }

        let raw = self.fetch_raw(symbol, period).await?;

        match normalizer::normalize(&raw, period) {
            Ok(series) => {
                log::info!("{} 行情处理完成, 共 {} 行", symbol, series.len());
                Ok(series)
            }
            Err(e) => {
                log::error!(
                    "{} 行情数据处理失败: {}, 响应: {}",
                    symbol,
                    e,
                    preview(&raw.to_string(), 200)
                );
                Err(e)
            }
        }
    }

    async fn fetch_raw(&self, symbol: &str, period: Period) -> Result<Value> {
        let (function, outputsize) = api_function(period);

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("function", function),
                ("symbol", symbol),
                ("outputsize", outputsize),
                ("apikey", self.api_key.as_str()),
                ("datatype", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            log::error!("{} 行情请求失败: {}", symbol, response.status());
            return Err(AppError::upstream_api(
                PROVIDER,
                format!("HTTP {}", response.status()),
            ));
        }

        let text = response.text().await?;
        log::debug!("{} 响应 {}: {}", PROVIDER, symbol, preview(&text, 200));

        Ok(serde_json::from_str(&text)?)
    }
}
