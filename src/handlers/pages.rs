//! HTML 页面
//!
//! 首页仪表盘与单只股票页面，图表由前端通过 JSON 接口加载
//! 模板以 `.html` 命名，变量输出自动做 HTML 转义

use actix_web::{http::header::ContentType, web, HttpResponse, Result};
use minijinja::{context, Environment};
use serde::Serialize;

use super::error_response;
use crate::error;
use crate::models::{NormalizedSeries, DATE_FORMAT};
use crate::state::AppState;

/// 股票页面预览的行数
const SUMMARY_ROWS: usize = 5;

/// 加载全部页面模板，启动时调用一次
pub fn template_env() -> std::result::Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("layout.html", include_str!("../../templates/layout.html"))?;
    env.add_template("index.html", include_str!("../../templates/index.html"))?;
    env.add_template("stock.html", include_str!("../../templates/stock.html"))?;
    Ok(env)
}

pub fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// 预览表格中的一行，数值已格式化
#[derive(Debug, Serialize)]
struct SummaryRow {
    date: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

pub fn render_index(env: &Environment<'_>, project_name: &str) -> error::Result<String> {
    let page = env
        .get_template("index.html")?
        .render(context! { project_name })?;
    Ok(page)
}

/// 股票页面：标题、均线信号与前几行数据
pub fn render_stock_page(
    env: &Environment<'_>,
    symbol: &str,
    series: &NormalizedSeries,
) -> error::Result<String> {
    let rows: Vec<SummaryRow> = series
        .rows()
        .iter()
        .take(SUMMARY_ROWS)
        .map(|row| SummaryRow {
            date: row.date.format(DATE_FORMAT).to_string(),
            open: format!("{:.2}", row.open),
            high: format!("{:.2}", row.high),
            low: format!("{:.2}", row.low),
            close: format!("{:.2}", row.close),
            volume: format!("{:.0}", row.volume),
        })
        .collect();

    let page = env.get_template("stock.html")?.render(context! {
        symbol,
        signal => series.signal().as_str(),
        rows,
    })?;
    Ok(page)
}

/// 首页
///
/// GET /
pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse> {
    log::info!("访问首页");
    match render_index(&state.templates, &state.config.api.project_name) {
        Ok(body) => Ok(html(body)),
        Err(e) => {
            log::error!("渲染首页失败: {}", e);
            Ok(error_response(&e, "Error rendering page."))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
}
