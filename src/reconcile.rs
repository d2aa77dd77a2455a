//! 排行调和
//!
//! 把后端排行记录转换为展示用趋势条目:得分回退链、六点趋势序列、
//! 状态映射、展示关键词选择和分类过滤。纯函数,无隐藏状态。

use crate::models::{Article, Category, RankingRecord, TrendItem, TrendStatus};

/// 综合两代 schema 解析出的得分三元组
struct ResolvedScores {
    total: f64,
    recent: f64,
    prev: f64,
}

/// 得分回退链
///
/// total:  score24h → score → totalScore → 0
/// recent: scoreRecent → recentScore → total
/// prev:   scorePrev → recent - diffScore → recent - 2*trendScore → max(0, recent*0.7)
fn resolve_scores(record: &RankingRecord) -> ResolvedScores {
    let total = record
        .score24h
        .or(record.score)
        .or(record.total_score)
        .unwrap_or(0.0);
    let recent = record.score_recent.or(record.recent_score).unwrap_or(total);
    let prev = record
        .score_prev
        .or_else(|| record.diff_score.map(|diff| recent - diff))
        .or_else(|| record.trend_score.map(|trend| recent - 2.0 * trend))
        .unwrap_or_else(|| (recent * 0.7).max(0.0));

    ResolvedScores { total, recent, prev }
}

/// 六点趋势序列: [prev, mid, recent, total*0.8, total*0.9, total]
///
/// mid 取 prev 与 recent 的中点,所有元素负值截断为 0,末位等于总得分。
fn build_trend_data(scores: &ResolvedScores) -> Vec<f64> {
    vec![
        scores.prev,
        (scores.prev + scores.recent) / 2.0,
        scores.recent,
        scores.total * 0.8,
        scores.total * 0.9,
        scores.total,
    ]
    .into_iter()
    .map(|v| v.max(0.0))
    .collect()
}

/// 后端状态映射: down/same 原样保留,其余(含 new/up)一律视为 up
fn map_status(status: &str) -> TrendStatus {
    match status {
        "down" => TrendStatus::Down,
        "same" => TrendStatus::Same,
        _ => TrendStatus::Up,
    }
}

/// 把单条排行记录转换为展示条目
fn to_trend_item(index: usize, record: &RankingRecord) -> TrendItem {
    let scores = resolve_scores(record);

    // 展示关键词优先取第一条文章标题
    let display_keyword = record
        .articles
        .first()
        .cloned()
        .unwrap_or_else(|| record.keyword.clone());

    let articles = record
        .articles
        .iter()
        .enumerate()
        .map(|(article_index, title)| Article {
            id: article_index + 1,
            thumbnail: format!(
                "https://picsum.photos/200/120?random={}",
                index * 10 + article_index
            ),
            title: title.clone(),
            summary: format!("{}에 대한 상세 내용입니다.", title),
            source: "트렌드뉴스".to_string(),
            date: "1시간 전".to_string(),
        })
        .collect();

    TrendItem {
        id: index + 1,
        rank: record.rank,
        keyword: display_keyword,
        original_keyword: record.keyword.clone(),
        // 后端暂不提供分类,一律归入 '전체'
        category: Category::all(),
        description: format!(
            "{} 키워드는 현재 총점 {:.1}점으로 많은 관심을 받고 있는 키워드입니다.",
            record.keyword, scores.total
        ),
        status: map_status(&record.status),
        trend_data: build_trend_data(&scores),
        articles,
    }
}

/// 把排行记录转换为展示条目并按分类过滤
///
/// '전체' 放行全部条目。后端暂不下发分类,所有条目均为 '전체',
/// 其它分类当前过滤不到任何条目,但过滤接缝保留不动。
pub fn reconcile(records: &[RankingRecord], category: &Category) -> Vec<TrendItem> {
    let items: Vec<TrendItem> = records
        .iter()
        .enumerate()
        .map(|(index, record)| to_trend_item(index, record))
        .collect();

    if category.is_all() {
        items
    } else {
        items
            .into_iter()
            .filter(|item| &item.category == category)
            .collect()
    }
}

/// 复合关键词转搜索词
///
/// 原始关键词以 ':' 连接复合键(如 "국민배우:안성기"),
/// 搜索前换成空格。原始关键词缺失时退回展示关键词。
pub fn search_query_for(item: &TrendItem) -> String {
    let keyword = if item.original_keyword.is_empty() {
        &item.keyword
    } else {
        &item.original_keyword
    };
    keyword.replace(':', " ").trim().to_string()
}

// ==================== 测试模块 ====================
