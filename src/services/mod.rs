//! API 客户端服务模块
//!
//! 封装对各后端服务的请求构建与响应归一化

pub mod common;
pub mod report_api; // 数据报告 API
pub mod search_api; // 新闻搜索 API
pub mod trend_api;  // 趋势排行 API
