//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，API Key 等敏感项可由环境变量覆盖

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 上游 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 项目名称（用于页面标题）
    #[serde(default = "default_project_name")]
    pub project_name: String,
    /// 调试模式
    #[serde(default)]
    pub debug: bool,
    /// Alpha Vantage API Key（为空则行情接口直接返回空结果）
    #[serde(default)]
    pub alpha_vantage_api_key: String,
    /// NewsAPI Key（为空则新闻接口直接返回空结果）
    #[serde(default)]
    pub news_api_key: String,
    #[serde(default = "default_alpha_vantage_base_url")]
    pub alpha_vantage_base_url: String,
    #[serde(default = "default_news_api_base_url")]
    pub news_api_base_url: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 限流配置，仅作声明，不做强制
    #[serde(default = "default_rate_limit")]
    pub default_rate_limit: String,
    /// 新闻回溯天数
    #[serde(default = "default_news_days_back")]
    pub news_days_back: i64,
    /// 单次拉取新闻条数
    #[serde(default = "default_news_page_size")]
    pub news_page_size: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_project_name() -> String { "Fintech Analysis Website".to_string() }
fn default_alpha_vantage_base_url() -> String { "https://www.alphavantage.co/query".to_string() }
fn default_news_api_base_url() -> String { "https://newsapi.org/v2/everything".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_rate_limit() -> String { "100/hour".to_string() }
fn default_news_days_back() -> i64 { 7 }
fn default_news_page_size() -> u32 { 10 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            debug: false,
            alpha_vantage_api_key: String::new(),
            news_api_key: String::new(),
            alpha_vantage_base_url: default_alpha_vantage_base_url(),
            news_api_base_url: default_news_api_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            default_rate_limit: default_rate_limit(),
            news_days_back: default_news_days_back(),
            news_page_size: default_news_page_size(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后叠加环境变量
    ///
    /// 在日志系统初始化之前调用，因此这里的提示直接返回给调用方输出
    pub fn load() -> (Self, Vec<String>) {
        let config_paths = ["config.json", "config/config.json"];
        let mut notes = Vec::new();

        let mut config = None;
        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(loaded) => {
                        notes.push(format!("从 {} 加载配置成功", path));
                        config = Some(loaded);
                        break;
                    }
                    Err(e) => {
                        notes.push(format!("加载配置文件 {} 失败: {}", path, e));
                    }
                }
            }
        }

        let mut config = config.unwrap_or_else(|| {
            notes.push("使用默认配置".to_string());
            Self::default()
        });
        config.apply_env_overrides(|key| env::var(key).ok());
        (config, notes)
    }

    /// 用环境变量覆盖敏感配置项
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ALPHA_VANTAGE_API_KEY") {
            self.api.alpha_vantage_api_key = key;
        }
        if let Some(key) = lookup("NEWS_API_KEY") {
            self.api.news_api_key = key;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level.to_lowercase();
        }
        if let Some(debug) = lookup("DEBUG") {
            self.api.debug = debug.eq_ignore_ascii_case("true");
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
