//! 趋势排行数据模型
//!
//! 定义后端排行记录和展示用趋势条目

use serde::{Deserialize, Serialize};

/// 分类常量表,首位 '전체' 为"全部"哨兵值
///
/// 后端暂不下发分类信息,排行条目一律归入 '전체'
pub const CATEGORIES: [&str; 8] = [
    "전체", "기술", "엔터", "스포츠", "정치", "경제", "사회", "문화",
];

/// 新闻分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category(pub String);

impl Default for Category {
    fn default() -> Self {
        Category::all()
    }
}

impl Category {
    /// "全部"哨兵值
    pub const ALL: &'static str = "전체";

    pub fn all() -> Self {
        Category(Self::ALL.to_string())
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    /// 按名称解析分类,不在常量表中的名称返回 None
    pub fn parse(name: &str) -> Option<Self> {
        if CATEGORIES.contains(&name) {
            Some(Category(name.to_string()))
        } else {
            None
        }
    }
}

/// 展示用趋势状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Up,
    Down,
    Same,
}

impl TrendStatus {
    /// 渲染用符号
    pub fn symbol(&self) -> &'static str {
        match self {
            TrendStatus::Up => "▲",
            TrendStatus::Down => "▼",
            TrendStatus::Same => "-",
        }
    }
}

/// 排行记录(后端原始数据)
///
/// 历史上存在两代互不兼容的打分 schema:
/// - 新版: score24h / scoreRecent / scorePrev / diffScore
/// - 旧版: totalScore / recentScore / trendScore
///
/// 两代字段全部按可选建模,缺失项由调和层的回退链补默认值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingRecord {
    /// 关键词 id(部分响应缺失)
    pub id: String,
    /// 原始关键词(复合关键词以 ':' 分隔)
    pub keyword: String,
    /// 排名
    pub rank: u32,
    /// 后端状态: new | up | down | same
    pub status: String,
    /// 排名变动
    pub rank_change: i32,
    /// 全量得分
    pub score: Option<f64>,
    /// 最近 24 小时得分
    pub score24h: Option<f64>,
    /// 最近区间得分
    pub score_recent: Option<f64>,
    /// 上一区间得分
    pub score_prev: Option<f64>,
    /// 区间变化量
    pub diff_score: Option<f64>,
    /// 旧版: 总得分
    pub total_score: Option<f64>,
    /// 旧版: 最近得分
    pub recent_score: Option<f64>,
    /// 旧版: 趋势得分
    pub trend_score: Option<f64>,
    /// 关联文章标题列表
    pub articles: Vec<String>,
}

/// 条目关联文章(由标题列表合成)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: usize,
    /// 占位缩略图地址
    pub thumbnail: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub date: String,
}

/// 展示用趋势条目(由排行记录派生)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendItem {
    /// 顺序编号(从 1 开始)
    pub id: usize,
    /// 后端排名
    pub rank: u32,
    /// 展示关键词(优先取第一条文章标题)
    pub keyword: String,
    /// 原始关键词(搜索时使用)
    pub original_keyword: String,
    pub category: Category,
    /// 生成的描述语句
    pub description: String,
    pub status: TrendStatus,
    /// 六点趋势序列,末位等于总得分
    pub trend_data: Vec<f64>,
    pub articles: Vec<Article>,
}
