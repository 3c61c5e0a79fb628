//! 行情序列归一化
//!
//! 把 Alpha Vantage 按日期嵌套的 JSON 转成按日期升序的 OHLCV 行，
//! 再按时间范围截取并计算 MA50 / MA200

use chrono::{Duration, Local, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::error::{AppError, Result};
use crate::models::{
    NormalizedRow, NormalizedSeries, COL_ADJUSTED_CLOSE, COL_CLOSE, COL_HIGH, COL_LOW, COL_OPEN,
    COL_VOLUME, DATE_FORMAT,
};

const PROVIDER: &str = "Alpha Vantage";

pub const SHORT_WINDOW: usize = 50;
pub const LONG_WINDOW: usize = 200;

/// 数据频率
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// 单个序列键对应的行结构
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShape {
    pub frequency: Frequency,
    /// 是否必须带复权收盘价
    pub adjusted: bool,
}

/// 已知的序列键，按优先级排列，先匹配者胜出
///
/// 日线复权接口与普通日线共用同一个键，复权收盘价存在时保留
pub const SERIES_KEYS: &[(&str, RowShape)] = &[
    ("Time Series (Daily)", RowShape { frequency: Frequency::Daily, adjusted: false }),
    ("Monthly Adjusted Time Series", RowShape { frequency: Frequency::Monthly, adjusted: true }),
    ("Weekly Adjusted Time Series", RowShape { frequency: Frequency::Weekly, adjusted: true }),
    ("Monthly Time Series", RowShape { frequency: Frequency::Monthly, adjusted: false }),
    ("Weekly Time Series", RowShape { frequency: Frequency::Weekly, adjusted: false }),
];

/// 上游用于返回错误或提示信息的键
const MESSAGE_KEYS: &[&str] = &["Error Message", "Information", "Note"];

/// 时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    OneMonth,
    ThreeMonths,
    OneYear,
    FiveYears,
    Max,
}

impl Period {
    /// 未知取值按 max 处理，不做截取
    pub fn parse(token: &str) -> Self {
        match token {
            "1mo" => Self::OneMonth,
            "3mo" => Self::ThreeMonths,
            "1y" => Self::OneYear,
            "5y" => Self::FiveYears,
            _ => Self::Max,
        }
    }

    /// 保留最近多少天
    pub fn lookback_days(&self) -> Option<i64> {
        match self {
            Self::OneMonth => Some(30),
            Self::ThreeMonths => Some(90),
            Self::OneYear => Some(365),
            Self::FiveYears => Some(365 * 5),
            Self::Max => None,
        }
    }

    /// 短周期只需要最近 100 条
    pub fn is_short(&self) -> bool {
        matches!(self, Self::OneMonth | Self::ThreeMonths)
    }
}

fn ordinal_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+").expect("valid ordinal prefix pattern"))
}

/// 字段名标准化："1. open" -> "Open"，"5. adjusted close" -> "Adjusted close"
pub fn canonical_column(name: &str) -> String {
    let stripped = ordinal_prefix().replace(name.trim(), "");
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// 以当前本地日期为基准归一化
pub fn normalize(raw: &Value, period: Period) -> Result<NormalizedSeries> {
    normalize_as_of(raw, period, Local::now().date_naive())
}

/// 以指定日期为基准归一化
pub fn normalize_as_of(raw: &Value, period: Period, today: NaiveDate) -> Result<NormalizedSeries> {
    let (key, shape) = locate_series(raw)?;
    let entries = raw[key].as_object().ok_or_else(|| {
        AppError::UpstreamFormat(format!("{} 不是按日期索引的对象", key))
    })?;

    let mut rows = entries
        .iter()
        .map(|(date, fields)| parse_row(date, fields, shape))
        .collect::<Result<Vec<_>>>()?;

    rows.sort_by_key(|row| row.date);

    // 截止点带有当天的时刻，恰好 N 天前那一天的零点早于截止点，不保留
    if let Some(days) = period.lookback_days() {
        let cutoff = today - Duration::days(days);
        rows.retain(|row| row.date > cutoff);
    }

    apply_moving_averages(&mut rows);

    log::debug!(
        "{} 序列 {:?} 归一化完成: {} 行, 时间范围 {:?}",
        key,
        shape.frequency,
        rows.len(),
        period
    );

    Ok(NormalizedSeries::new(rows))
}

fn locate_series(raw: &Value) -> Result<(&'static str, RowShape)> {
    if let Some(found) = SERIES_KEYS.iter().find(|(key, _)| raw.get(*key).is_some()) {
        return Ok(*found);
    }

    for key in MESSAGE_KEYS {
        if let Some(message) = raw.get(*key) {
            let message = message
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| message.to_string());
            return Err(AppError::upstream_api(PROVIDER, message));
        }
    }

    let keys: Vec<&str> = raw
        .as_object()
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default();
    Err(AppError::UpstreamFormat(format!("未找到已知的序列键, 实际键: {:?}", keys)))
}

fn parse_row(date: &str, fields: &Value, shape: RowShape) -> Result<NormalizedRow> {
    let parsed_date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| AppError::UpstreamFormat(format!("无效日期 {}: {}", date, e)))?;

    let fields = fields
        .as_object()
        .ok_or_else(|| AppError::UpstreamFormat(format!("{} 的数据不是对象", date)))?;
    let values = parse_fields(date, fields)?;

    let get = |column: &str| values.iter().find(|(name, _)| name == column).map(|(_, v)| *v);
    let required = |column: &str| {
        get(column).ok_or_else(|| {
            AppError::UpstreamFormat(format!("{} 缺少字段 {}", date, column))
        })
    };

    let adjusted_close = if shape.adjusted {
        Some(required(COL_ADJUSTED_CLOSE)?)
    } else {
        get(COL_ADJUSTED_CLOSE)
    };

    Ok(NormalizedRow {
        date: parsed_date,
        open: required(COL_OPEN)?,
        high: required(COL_HIGH)?,
        low: required(COL_LOW)?,
        close: required(COL_CLOSE)?,
        adjusted_close,
        volume: required(COL_VOLUME)?,
        ma50: None,
        ma200: None,
    })
}

/// 解析所有字段，任一字段失败即整行失败
fn parse_fields(date: &str, fields: &Map<String, Value>) -> Result<Vec<(String, f64)>> {
    fields
        .iter()
        .map(|(name, value)| {
            let number = match value {
                Value::String(s) => s.trim().parse::<f64>().ok(),
                Value::Number(n) => n.as_f64(),
                _ => None,
            };
            number
                .map(|v| (canonical_column(name), v))
                .ok_or_else(|| {
                    AppError::UpstreamFormat(format!("{} 的字段 {} 无法解析: {}", date, name, value))
                })
        })
        .collect()
}

/// 计算 MA50 / MA200，数据不足的行保持 None
fn apply_moving_averages(rows: &mut [NormalizedRow]) {
    let closes: Vec<f64> = rows.iter().map(|row| row.close).collect();
    let ma50 = trailing_mean(&closes, SHORT_WINDOW);
    let ma200 = trailing_mean(&closes, LONG_WINDOW);

    for ((row, short), long) in rows.iter_mut().zip(ma50).zip(ma200) {
        row.ma50 = short;
        row.ma200 = long;
    }
}

/// 包含当前行在内的简单移动平均
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }
    for (i, w) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(w.iter().sum::<f64>() / window as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Signal, SeriesTable};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    /// 生成 count 天的日线数据，最新一天为 end，按降序写入（与上游一致）
    fn daily_payload(end: NaiveDate, count: i64, close_of: impl Fn(i64) -> f64) -> Value {
        let mut series = Map::new();
        for offset in 0..count {
            let date = end - Duration::days(offset);
            let close = close_of(count - 1 - offset);
            series.insert(
                date.format(DATE_FORMAT).to_string(),
                json!({
                    "1. open": format!("{:.4}", close - 0.5),
                    "2. high": format!("{:.4}", close + 1.0),
                    "3. low": format!("{:.4}", close - 1.0),
                    "4. close": format!("{:.4}", close),
                    "5. volume": "1000000"
                }),
            );
        }
        json!({
            "Meta Data": { "2. Symbol": "IBM" },
            "Time Series (Daily)": Value::Object(series)
        })
    }

    #[test]
    fn test_canonical_column() {
        let cases = vec![
            ("1. open", "Open"),
            ("4. close", "Close"),
            ("5. adjusted close", "Adjusted close"),
            ("6. volume", "Volume"),
            ("8. split coefficient", "Split coefficient"),
            ("volume", "Volume"),
        ];
        for (input, expected) in &cases {
            assert_eq!(canonical_column(input), *expected, "{}", input);
        }
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse("1mo").lookback_days(), Some(30));
        assert_eq!(Period::parse("3mo").lookback_days(), Some(90));
        assert_eq!(Period::parse("1y").lookback_days(), Some(365));
        assert_eq!(Period::parse("5y").lookback_days(), Some(1825));
        assert_eq!(Period::parse("max"), Period::Max);
        assert_eq!(Period::parse("10y"), Period::Max);
        assert!(Period::OneMonth.is_short());
        assert!(!Period::OneYear.is_short());
    }

    #[test]
    fn test_rows_sorted_ascending_and_unique() {
        let raw = daily_payload(today(), 40, |i| 100.0 + i as f64);
        let series = normalize_as_of(&raw, Period::Max, today()).unwrap();

        assert_eq!(series.len(), 40);
        for pair in series.rows().windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        assert_eq!(series.latest().unwrap().date, today());
        assert_eq!(series.rows()[0].close, 100.0);
        assert_eq!(series.rows()[0].open, 99.5);
        assert_eq!(series.rows()[0].volume, 1_000_000.0);
    }

    #[test]
    fn test_moving_average_definedness() {
        let raw = daily_payload(today(), 250, |i| 10.0 + (i % 7) as f64 * 1.25);
        let series = normalize_as_of(&raw, Period::Max, today()).unwrap();
        let rows = series.rows();
        let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();

        assert!(rows[..49].iter().all(|r| r.ma50.is_none()));
        assert!(rows[49..].iter().all(|r| r.ma50.is_some()));
        assert!(rows[..199].iter().all(|r| r.ma200.is_none()));
        assert!(rows[199..].iter().all(|r| r.ma200.is_some()));

        for i in [49, 120, 249] {
            let expected = closes[i - 49..=i].iter().sum::<f64>() / 50.0;
            assert!((rows[i].ma50.unwrap() - expected).abs() < 1e-9);
        }
        let expected = closes[50..=249].iter().sum::<f64>() / 200.0;
        assert!((rows[249].ma200.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_one_month_filter() {
        let raw = daily_payload(today(), 60, |i| 50.0 + i as f64);
        let series = normalize_as_of(&raw, Period::OneMonth, today()).unwrap();
        let cutoff = today() - Duration::days(30);

        assert_eq!(series.len(), 30);
        assert_eq!(series.rows()[0].date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(series.rows().iter().all(|r| r.date > cutoff));
    }

    #[test]
    fn test_one_month_filter_excludes_boundary_day() {
        let raw = daily_payload(today(), 40, |i| 50.0 + i as f64);
        let series = normalize_as_of(&raw, Period::OneMonth, today()).unwrap();
        let boundary = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

        assert_eq!(series.len(), 30);
        assert!(series.rows().iter().all(|r| r.date != boundary));
        assert_eq!(series.latest().unwrap().date, today());
    }

    #[test]
    fn test_max_keeps_everything() {
        let raw = daily_payload(today() - Duration::days(4000), 30, |i| 50.0 + i as f64);
        let series = normalize_as_of(&raw, Period::Max, today()).unwrap();
        assert_eq!(series.len(), 30);

        let filtered = normalize_as_of(&raw, Period::FiveYears, today()).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_moving_averages_follow_filter() {
        let raw = daily_payload(today(), 300, |i| i as f64);
        let series = normalize_as_of(&raw, Period::OneMonth, today()).unwrap();
        assert!(series.rows().iter().all(|r| r.ma50.is_none()));
        assert_eq!(series.signal(), Signal::InsufficientData);
    }

    #[test]
    fn test_signal_from_latest_row() {
        let rising = daily_payload(today(), 220, |i| 100.0 + i as f64);
        let series = normalize_as_of(&rising, Period::Max, today()).unwrap();
        assert_eq!(series.signal(), Signal::GoldenCrossCandidate);

        let falling = daily_payload(today(), 220, |i| 500.0 - i as f64);
        let series = normalize_as_of(&falling, Period::Max, today()).unwrap();
        assert_eq!(series.signal(), Signal::DeathCrossCandidate);

        let flat = daily_payload(today(), 220, |_| 42.0);
        let series = normalize_as_of(&flat, Period::Max, today()).unwrap();
        assert_eq!(series.signal(), Signal::DeathCrossCandidate);
    }

    #[test]
    fn test_empty_series_is_not_an_error() {
        let raw = json!({ "Time Series (Daily)": {} });
        let series = normalize_as_of(&raw, Period::OneYear, today()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.signal(), Signal::InsufficientData);
    }

    #[test]
    fn test_unknown_schema_is_format_error() {
        let raw = json!({ "Time Series (Hourly v2)": { "2024-01-02": {} } });
        let err = normalize_as_of(&raw, Period::Max, today()).unwrap_err();
        assert!(matches!(err, AppError::UpstreamFormat(_)), "{:?}", err);
    }

    #[test]
    fn test_error_payload_is_api_error() {
        let raw = json!({ "Error Message": "Invalid API call." });
        match normalize_as_of(&raw, Period::Max, today()) {
            Err(AppError::UpstreamApi { provider, message }) => {
                assert_eq!(provider, "Alpha Vantage");
                assert_eq!(message, "Invalid API call.");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let raw = json!({ "Information": "Thank you for using Alpha Vantage!" });
        assert!(matches!(
            normalize_as_of(&raw, Period::Max, today()),
            Err(AppError::UpstreamApi { .. })
        ));
    }

    #[test]
    fn test_bad_field_fails_fast() {
        let raw = json!({
            "Time Series (Daily)": {
                "2024-06-28": {
                    "1. open": "10", "2. high": "11", "3. low": "9",
                    "4. close": "n/a", "5. volume": "100"
                },
                "2024-06-27": {
                    "1. open": "10", "2. high": "11", "3. low": "9",
                    "4. close": "10.5", "5. volume": "100"
                }
            }
        });
        assert!(matches!(
            normalize_as_of(&raw, Period::Max, today()),
            Err(AppError::UpstreamFormat(_))
        ));
    }

    #[test]
    fn test_bad_date_fails() {
        let raw = json!({
            "Time Series (Daily)": {
                "June 28": {
                    "1. open": "10", "2. high": "11", "3. low": "9",
                    "4. close": "10", "5. volume": "100"
                }
            }
        });
        assert!(matches!(
            normalize_as_of(&raw, Period::Max, today()),
            Err(AppError::UpstreamFormat(_))
        ));
    }

    #[test]
    fn test_monthly_adjusted_requires_adjusted_close() {
        let raw = json!({
            "Monthly Adjusted Time Series": {
                "2024-05-31": {
                    "1. open": "10", "2. high": "12", "3. low": "9", "4. close": "11",
                    "5. adjusted close": "10.8", "6. volume": "5000", "7. dividend amount": "0.0000"
                }
            }
        });
        let series = normalize_as_of(&raw, Period::Max, today()).unwrap();
        let row = &series.rows()[0];
        assert_eq!(row.adjusted_close, Some(10.8));
        assert_eq!(row.volume, 5000.0);
        assert!(series.to_table().columns.contains(&"Adjusted close".to_string()));

        let missing = json!({
            "Monthly Adjusted Time Series": {
                "2024-05-31": {
                    "1. open": "10", "2. high": "12", "3. low": "9", "4. close": "11",
                    "6. volume": "5000"
                }
            }
        });
        assert!(normalize_as_of(&missing, Period::Max, today()).is_err());
    }

    #[test]
    fn test_daily_key_wins_over_monthly() {
        let mut raw = daily_payload(today(), 3, |i| 1.0 + i as f64);
        raw["Monthly Adjusted Time Series"] = json!({ "bad": "data" });
        let series = normalize_as_of(&raw, Period::Max, today()).unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_series_table_round_trip() {
        let raw = daily_payload(today(), 210, |i| 20.0 + (i as f64).sin());
        let series = normalize_as_of(&raw, Period::Max, today()).unwrap();

        let json = serde_json::to_value(series.to_table()).unwrap();
        let table: SeriesTable = serde_json::from_value(json).unwrap();
        let restored = NormalizedSeries::from_table(&table).unwrap();

        assert_eq!(restored, series);
    }

    #[test]
    fn test_trailing_mean_small_window() {
        let means = trailing_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(means, vec![None, None, Some(2.0), Some(3.0)]);
        assert_eq!(trailing_mean(&[1.0], 3), vec![None]);
    }
}
