//! 新闻搜索数据模型
//!
//! 定义自动补全建议和分页搜索结果

use serde::{Deserialize, Serialize};

/// 搜索自动补全建议
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub keyword: String,
    /// 出现次数(后端可选下发)
    pub count: Option<f64>,
}

/// 单条搜索结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub link: String,
    /// 媒体名称
    pub press: String,
    pub pub_date: String,
    /// 摘要(可能含 HTML 标签,渲染前需清理)
    pub description: String,
    pub category: String,
}

/// 分页搜索响应
///
/// total 为服务端声明的总数,与 items.len() 无关;
/// items.len() 不超过 page_size。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultResponse {
    pub total: u64,
    pub items: Vec<SearchResult>,
    pub page: u32,
    pub page_size: u32,
}

impl SearchResultResponse {
    /// 空响应
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            total: 0,
            items: Vec::new(),
            page,
            page_size,
        }
    }

    /// 总页数(向上取整)
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64) as u32
    }
}
