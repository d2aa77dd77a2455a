//! 数据报告数据模型
//!
//! 定义数据报告域的排行、时间序列、关联数据结构

use serde::{Deserialize, Serialize};

use super::trend::TrendStatus;

/// 数据报告排行条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRanking {
    pub id: String,
    /// 归一化关键词文本
    pub keyword: String,
    /// 出现频次合计
    pub freq_sum: f64,
    /// 得分合计
    pub score_sum: f64,
}

/// 时间序列桶
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// 桶时间(ISO 8601)
    pub bucket_time: String,
    pub freq_sum: f64,
    pub score_sum: f64,
}

/// 关联文章
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedArticle {
    pub id: String,
    pub publisher: String,
    pub title: String,
    pub url: String,
    pub published_at: String,
    /// 关联权重
    pub weight: f64,
}

/// 关联关键词
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedKeyword {
    pub id: String,
    pub normalized_text: String,
    /// 共现次数
    pub co_count: f64,
    pub weight_sum: f64,
    pub association_score: f64,
}

/// 关键词搜索命中
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSearchHit {
    pub id: String,
    pub normalized_text: String,
}

/// 报告详情里的关联文章(精简字段)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArticle {
    pub title: String,
    pub source: String,
    pub url: String,
    pub weight: f64,
}

/// 关键词报告数据(展示层持有)
///
/// change 为派生值而非后端下发:取趋势序列末位与其前
/// min(3, L-1) 个点均值的百分比差,均值为 0 时取 0。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordData {
    /// 关键词 id(仅搜索/排行来源携带)
    pub id: Option<String>,
    /// 排名(搜索结果不在排行中时为 0)
    pub rank: u32,
    pub keyword: String,
    pub score: f64,
    /// 变化率(整数百分比)
    pub change: i32,
    pub status: TrendStatus,
    /// 趋势序列(时间正序)
    pub trend_data: Vec<f64>,
    /// 时间序列(时间正序,可缺失)
    pub time_series: Vec<TimeSeriesPoint>,
    pub related_keywords: Vec<String>,
    pub articles: Vec<ReportArticle>,
}

/// 图表数据点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// 横轴标签: HH:MM 或 T-<n>
    pub time: String,
    pub score: f64,
}
