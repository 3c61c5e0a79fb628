//! 股票接口处理器
//!
//! - GET /stocks/stock/{symbol} - 股票页面（HTML）
//! - GET /stocks/stock/{symbol}/data - 图表数据 `{index, columns, data}`
//! - GET /stocks/stock/{symbol}/analysis - 均线分析摘要

use actix_web::{web, HttpResponse, Result};

use super::{error_response, not_found, pages};
use crate::models::{ApiResponse, StockAnalysis, StockQuery};
use crate::services::stock::Period;
use crate::state::AppState;

/// 获取图表数据
///
/// GET /api/stocks/stock/{symbol}/data?period=1y
pub async fn get_stock_data(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<StockQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner().to_uppercase();
    log::info!("请求 {} 图表数据, 时间范围: {}", symbol, query.period);

    match state.stocks.get_stock_series(&symbol, Period::parse(&query.period)).await {
        Ok(series) if series.is_empty() => {
            log::warn!("{} 在时间范围 {} 内没有数据", symbol, query.period);
            Ok(not_found(format!("No data found for {}", symbol)))
        }
        Ok(series) => Ok(HttpResponse::Ok().json(series.to_table())),
        Err(e) => {
            log::error!("获取 {} 图表数据失败: {}", symbol, e);
            Ok(error_response(&e, "Error fetching stock data."))
        }
    }
}

/// 获取均线分析
///
/// GET /api/stocks/stock/{symbol}/analysis?period=1y
pub async fn get_stock_analysis(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<StockQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner().to_uppercase();
    log::info!("请求 {} 均线分析, 时间范围: {}", symbol, query.period);

    match state.stocks.get_stock_series(&symbol, Period::parse(&query.period)).await {
        Ok(series) if series.is_empty() => {
            log::warn!("{} 没有可分析的数据", symbol);
            Ok(not_found(format!("No data to analyze for {}", symbol)))
        }
        Ok(series) => {
            let analysis = StockAnalysis::from_series(&symbol, &series);
            log::info!("{} 分析完成, 信号: {}", symbol, analysis.signal);
            Ok(HttpResponse::Ok().json(ApiResponse::success(analysis)))
        }
        Err(e) => {
            log::error!("分析 {} 失败: {}", symbol, e);
            Ok(error_response(&e, "Error analyzing stock data."))
        }
    }
}

/// 股票页面，展示最近 5 行数据
///
/// GET /api/stocks/stock/{symbol}
pub async fn get_stock_page(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner().to_uppercase();
    log::info!("请求 {} 股票页面", symbol);

    match state.stocks.get_stock_series(&symbol, Period::OneYear).await {
        Ok(series) if series.is_empty() => {
            log::warn!("未找到 {} 的数据", symbol);
            Ok(not_found(format!("No data found for stock symbol {}", symbol)))
        }
        Ok(series) => match pages::render_stock_page(&state.templates, &symbol, &series) {
            Ok(body) => Ok(pages::html(body)),
            Err(e) => {
                log::error!("渲染 {} 股票页面失败: {}", symbol, e);
                Ok(error_response(&e, "Error rendering page."))
            }
        },
        Err(e) => {
            log::error!("获取 {} 股票页面失败: {}", symbol, e);
            Ok(error_response(
                &e,
                &format!("An internal error occurred while fetching data for {}.", symbol),
            ))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("/stock/{symbol}", web::get().to(get_stock_page))
            .route("/stock/{symbol}/data", web::get().to(get_stock_data))
            .route("/stock/{symbol}/analysis", web::get().to(get_stock_analysis)),
    );
}
