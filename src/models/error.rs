//! API 错误模型
//!
//! 定义 API 客户端的类型化错误

use thiserror::Error;

/// API 客户端错误
///
/// 自动补全类调用不会抛出该错误(失败时静默降级为空结果),
/// 主内容类调用(排行、搜索执行、时间序列、关联数据、关键词搜索)
/// 失败时向调用方传播。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 请求未得到响应(网络不可达、DNS 解析失败、超时等)
    #[error("网络错误: {0}")]
    Network(String),
    /// 收到非 2xx 响应
    #[error("API 调用失败: HTTP {status}{}", detail_suffix(.message))]
    Http {
        /// HTTP 状态码
        status: u16,
        /// 诊断信息(开发环境携带响应体,生产环境为 None)
        message: Option<String>,
    },
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(" - {}", m),
        _ => String::new(),
    }
}

impl ApiError {
    /// HTTP 状态码(网络错误时为 None)
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::Http {
                status: status.as_u16(),
                message: None,
            },
            None => ApiError::Network(err.to_string()),
        }
    }
}
