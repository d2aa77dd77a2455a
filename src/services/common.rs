//! 公共常量和辅助函数

use chrono::Utc;
use chrono_tz::Asia::Seoul;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;

use crate::config::HttpConfig;

// ==================== 请求参数常量 ====================

/// 时间序列拉取条数上限
pub const TIME_SERIES_LIMIT: u32 = 20;
/// 关键词搜索默认返回上限
pub const KEYWORD_SEARCH_LIMIT: u32 = 20;

/// 获取首尔时间(ISO 8601 格式,带 +09:00 时区)
pub fn seoul_now() -> chrono::DateTime<chrono_tz::Tz> {
    Utc::now().with_timezone(&Seoul)
}

/// 构建带超时的 HTTP 客户端
pub fn build_http_client(http: &HttpConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// JSON 值转 f64,兼容数字和字符串两种编码
pub fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// 可选数值字段,字段缺失或为 null 时返回 None
pub fn opt_f64(item: &Value, key: &str) -> Option<f64> {
    match item.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(value_to_f64(v)),
    }
}

/// 字符串字段,缺失时为空串
pub fn str_field(item: &Value, key: &str) -> String {
    item[key].as_str().unwrap_or("").to_string()
}

/// id 类字段,兼容字符串和数字两种编码
pub fn id_field(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// 去掉富文本中的 HTML 标签
pub fn strip_html_tags(text: &str) -> String {
    let re = Regex::new(r"<[^>]*>").unwrap();
    re.replace_all(text, "").to_string()
}

// ==================== 测试模块 ====================
