//! 股票数据模型
//!
//! 定义归一化后的行情序列、均线信号与图表表格格式

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, Result};

pub const COL_OPEN: &str = "Open";
pub const COL_HIGH: &str = "High";
pub const COL_LOW: &str = "Low";
pub const COL_CLOSE: &str = "Close";
pub const COL_ADJUSTED_CLOSE: &str = "Adjusted close";
pub const COL_VOLUME: &str = "Volume";
pub const COL_MA50: &str = "MA50";
pub const COL_MA200: &str = "MA200";

/// 日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 单日 OHLCV 数据
///
/// 均线在前序数据不足时为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// 日期
    pub date: NaiveDate,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 收盘价
    pub close: f64,
    /// 复权收盘价（仅复权数据有）
    pub adjusted_close: Option<f64>,
    /// 成交量
    pub volume: f64,
    /// 50 日均线
    pub ma50: Option<f64>,
    /// 200 日均线
    pub ma200: Option<f64>,
}

/// 均线信号
///
/// 只比较最新一行的两条均线，不判断交叉发生的时点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Signal {
    GoldenCrossCandidate,
    DeathCrossCandidate,
    InsufficientData,
}

impl Signal {
    pub fn classify(ma50: Option<f64>, ma200: Option<f64>) -> Self {
        match (ma50, ma200) {
            (Some(short), Some(long)) if short > long => Self::GoldenCrossCandidate,
            (Some(_), Some(_)) => Self::DeathCrossCandidate,
            _ => Self::InsufficientData,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoldenCrossCandidate => "golden-cross-candidate",
            Self::DeathCrossCandidate => "death-cross-candidate",
            Self::InsufficientData => "insufficient-data",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 归一化后的行情序列，按日期升序，构造后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    rows: Vec<NormalizedRow>,
    signal: Signal,
}

impl NormalizedSeries {
    /// 由已排序、已计算均线的行构造
    pub(crate) fn new(rows: Vec<NormalizedRow>) -> Self {
        let signal = rows
            .last()
            .map(|row| Signal::classify(row.ma50, row.ma200))
            .unwrap_or(Signal::InsufficientData);
        Self { rows, signal }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn latest(&self) -> Option<&NormalizedRow> {
        self.rows.last()
    }

    fn has_adjusted_close(&self) -> bool {
        self.rows.iter().any(|row| row.adjusted_close.is_some())
    }

    /// 转换为图表使用的 `{index, columns, data}` 表格
    pub fn to_table(&self) -> SeriesTable {
        let adjusted = self.has_adjusted_close();

        let mut columns = vec![COL_OPEN, COL_HIGH, COL_LOW, COL_CLOSE];
        if adjusted {
            columns.push(COL_ADJUSTED_CLOSE);
        }
        columns.extend([COL_VOLUME, COL_MA50, COL_MA200]);

        let index = self
            .rows
            .iter()
            .map(|row| row.date.format(DATE_FORMAT).to_string())
            .collect();

        let data = self
            .rows
            .iter()
            .map(|row| {
                let mut values = vec![Some(row.open), Some(row.high), Some(row.low), Some(row.close)];
                if adjusted {
                    values.push(row.adjusted_close);
                }
                values.extend([Some(row.volume), row.ma50, row.ma200]);
                values
            })
            .collect();

        SeriesTable {
            index,
            columns: columns.into_iter().map(String::from).collect(),
            data,
        }
    }

    /// 从 `{index, columns, data}` 表格还原序列
    pub fn from_table(table: &SeriesTable) -> Result<Self> {
        if table.index.len() != table.data.len() {
            return Err(AppError::UpstreamFormat(format!(
                "索引长度 {} 与数据行数 {} 不一致",
                table.index.len(),
                table.data.len()
            )));
        }

        let position = |name: &str| table.columns.iter().position(|c| c == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| AppError::UpstreamFormat(format!("缺少列 {}", name)))
        };

        let open = required(COL_OPEN)?;
        let high = required(COL_HIGH)?;
        let low = required(COL_LOW)?;
        let close = required(COL_CLOSE)?;
        let volume = required(COL_VOLUME)?;
        let adjusted_close = position(COL_ADJUSTED_CLOSE);
        let ma50 = position(COL_MA50);
        let ma200 = position(COL_MA200);

        let mut rows = Vec::with_capacity(table.data.len());
        for (date, values) in table.index.iter().zip(&table.data) {
            let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_err(|e| AppError::UpstreamFormat(format!("无效日期 {}: {}", date, e)))?;
            let cell = |idx: usize| values.get(idx).copied().flatten();
            let value = |idx: usize, name: &str| {
                cell(idx).ok_or_else(|| {
                    AppError::UpstreamFormat(format!("{} 的 {} 列为空", date, name))
                })
            };

            rows.push(NormalizedRow {
                date,
                open: value(open, COL_OPEN)?,
                high: value(high, COL_HIGH)?,
                low: value(low, COL_LOW)?,
                close: value(close, COL_CLOSE)?,
                adjusted_close: adjusted_close.and_then(cell),
                volume: value(volume, COL_VOLUME)?,
                ma50: ma50.and_then(cell),
                ma200: ma200.and_then(cell),
            });
        }

        Ok(Self::new(rows))
    }
}

/// 图表表格格式，与 pandas `to_dict(orient="split")` 结构一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub index: Vec<String>,
    pub columns: Vec<String>,
    pub data: Vec<Vec<Option<f64>>>,
}

/// 股票分析摘要
#[derive(Debug, Serialize, Deserialize)]
pub struct StockAnalysis {
    /// 股票代码
    pub symbol: String,
    /// 最新收盘价
    pub current_price: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub signal: Signal,
    /// 附带均线列的完整表格
    pub data_for_chart_with_indicators: SeriesTable,
}

impl StockAnalysis {
    pub fn from_series(symbol: &str, series: &NormalizedSeries) -> Self {
        let latest = series.latest();
        Self {
            symbol: symbol.to_string(),
            current_price: latest.map(|row| row.close),
            ma50: latest.and_then(|row| row.ma50),
            ma200: latest.and_then(|row| row.ma200),
            signal: series.signal(),
            data_for_chart_with_indicators: series.to_table(),
        }
    }
}

/// 股票查询参数
#[derive(Debug, Deserialize)]
pub struct StockQuery {
    /// 时间范围: 1mo, 3mo, 1y, 5y, max
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_period() -> String {
    "1y".to_string()
}
