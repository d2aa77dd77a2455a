//! 配置模块
//!
//! 支持从 JSON 文件加载配置,环境变量可覆盖关键项。
//! 生产环境下缺失或指向回环地址的 Base URL 在启动时直接报错。

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use url::Url;

/// 开发环境默认的数据报告 API 地址
const DEV_REPORT_BASE_URL: &str = "http://localhost:3002";

/// 趋势排行 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendApiConfig {
    /// Base URL
    #[serde(default = "default_trend_base_url")]
    pub base_url: String,
    /// Admin API Key(仅附加在趋势 API 请求头,为空则不发送)
    #[serde(default)]
    pub api_key: String,
}

/// 新闻搜索 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchApiConfig {
    /// Base URL(搜索 API 不携带 API Key)
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
}

/// 数据报告 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportApiConfig {
    /// Base URL,为空时回退:开发环境用本地默认地址,生产环境复用趋势 API 地址
    #[serde(default)]
    pub base_url: String,
}

/// HTTP 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// 请求超时时间(秒)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间(秒)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 运行环境: development | production
    #[serde(default = "default_environment")]
    pub environment: String,
    /// 趋势排行 API
    #[serde(default)]
    pub trend_api: TrendApiConfig,
    /// 新闻搜索 API
    #[serde(default)]
    pub search_api: SearchApiConfig,
    /// 数据报告 API
    #[serde(default)]
    pub report_api: ReportApiConfig,
    /// HTTP 客户端
    #[serde(default)]
    pub http: HttpConfig,
}

// 默认值函数
fn default_environment() -> String { "development".to_string() }
fn default_trend_base_url() -> String { "http://localhost:8000/api".to_string() }
fn default_search_base_url() -> String { "http://localhost:8001/search-api".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }

impl Default for TrendApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_trend_base_url(),
            api_key: String::new(),
        }
    }
}

impl Default for SearchApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
        }
    }
}

impl Default for ReportApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            trend_api: TrendApiConfig::default(),
            search_api: SearchApiConfig::default(),
            report_api: ReportApiConfig::default(),
            http: HttpConfig::default(),
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

    /// 加载配置:优先从文件,失败则使用默认值,最后应用环境变量覆盖
    pub fn load() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        let mut config = Self::default();
        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(loaded) => {
                        log::info!("从 {} 加载配置成功", path);
                        config = loaded;
                        break;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        config.apply_env_overrides();
        config
    }

    /// 应用环境变量覆盖
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("APP_ENV") {
            self.environment = v;
        }
        if let Ok(v) = env::var("TREND_API_BASE_URL") {
            self.trend_api.base_url = v;
        }
        if let Ok(v) = env::var("SEARCH_API_BASE_URL") {
            self.search_api.base_url = v;
        }
        if let Ok(v) = env::var("REPORT_API_BASE_URL") {
            self.report_api.base_url = v;
        }
        if let Ok(v) = env::var("ADMIN_API_KEY") {
            self.trend_api.api_key = v;
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 数据报告 API 地址:专用配置缺失时回退
    pub fn report_base_url(&self) -> String {
        let url = self.report_api.base_url.trim();
        if !url.is_empty() {
            return url.to_string();
        }
        if self.is_production() {
            return self.trend_api.base_url.clone();
        }
        DEV_REPORT_BASE_URL.to_string()
    }

    /// 校验配置
    ///
    /// 开发环境不做校验(允许本地代理地址);
    /// 生产环境下每个 Base URL 必须非空、可解析且不指向回环地址。
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.is_production() {
            return Ok(());
        }

        validate_base_url("趋势 API (TREND_API_BASE_URL)", &self.trend_api.base_url)?;
        validate_base_url("搜索 API (SEARCH_API_BASE_URL)", &self.search_api.base_url)?;
        validate_base_url("数据报告 API (REPORT_API_BASE_URL)", &self.report_base_url())?;
        Ok(())
    }
}

/// 校验单个 Base URL
fn validate_base_url(name: &str, value: &str) -> anyhow::Result<()> {
    let value = value.trim();
    if value.is_empty() {
        bail!(
            "{} 未配置。生产环境必须指向可公网访问的 HTTPS 地址,例如 https://api.yourdomain.com",
            name
        );
    }

    let parsed = Url::parse(value).with_context(|| format!("{} 不是合法的 URL: {}", name, value))?;

    if let Some(host) = parsed.host_str() {
        if host == "localhost" || host == "127.0.0.1" {
            bail!(
                "{} 指向回环地址: {}。生产环境不能使用 localhost,请配置实际后端地址",
                name,
                value
            );
        }
    }

    Ok(())
}

// ==================== 测试模块 ====================

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试默认配置在开发环境下通过校验
    #[test]
    fn test_development_config_is_valid() {
        println!("\n========== 测试开发环境默认配置 ==========");
        let config = AppConfig::default();
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
        println!("✅ 开发环境默认配置测试通过！");
    }

    /// 测试生产环境拒绝回环地址
    #[test]
    fn test_production_rejects_loopback() {
        println!("\n========== 测试生产环境回环地址拦截 ==========");
        let mut config = AppConfig::default();
        config.environment = "production".to_string();
        config.trend_api.base_url = "http://localhost:8000/api".to_string();
        config.search_api.base_url = "https://search.example.com".to_string();
        config.report_api.base_url = "https://report.example.com".to_string();

        let result = config.validate();
        assert!(result.is_err());
        let message = format!("{}", result.unwrap_err());
        println!("  错误信息: {}", message);
        assert!(message.contains("回环地址"));
        println!("✅ 回环地址拦截测试通过！");
    }

    /// 测试生产环境拒绝缺失的 Base URL
    #[test]
    fn test_production_rejects_missing_url() {
        println!("\n========== 测试生产环境缺失地址拦截 ==========");
        let mut config = AppConfig::default();
        config.environment = "production".to_string();
        config.trend_api.base_url = String::new();

        assert!(config.validate().is_err());
        println!("✅ 缺失地址拦截测试通过！");
    }

    /// 测试生产环境合法配置
    #[test]
    fn test_production_accepts_public_urls() {
        println!("\n========== 测试生产环境合法配置 ==========");
        let mut config = AppConfig::default();
        config.environment = "production".to_string();
        config.trend_api.base_url = "https://api.example.com".to_string();
        config.search_api.base_url = "https://search.example.com".to_string();
        config.report_api.base_url = String::new(); // 回退到趋势 API 地址

        assert!(config.validate().is_ok());
        assert_eq!(config.report_base_url(), "https://api.example.com");
        println!("✅ 生产环境合法配置测试通过！");
    }

    /// 测试数据报告地址在开发环境的默认回退
    #[test]
    fn test_report_base_url_dev_fallback() {
        println!("\n========== 测试数据报告地址回退 ==========");
        let config = AppConfig::default();
        assert_eq!(config.report_base_url(), DEV_REPORT_BASE_URL);
        println!("✅ 数据报告地址回退测试通过！");
    }
}
