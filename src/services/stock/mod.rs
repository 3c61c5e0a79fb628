//! 股票数据服务模块
//!
//! 行情拉取（Alpha Vantage）与序列归一化

pub mod alpha_vantage;
pub mod normalizer;

pub use alpha_vantage::StockService;
pub use normalizer::Period;
