//! 关键词详情的增量加载
//!
//! 三个详情切面(时间序列、关联文章、关联关键词)并行拉取,
//! 单个切面失败只降级该切面,不影响其余切面;
//! 变化率、图表标签等派生值也在这里计算。

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Asia::Seoul;
use futures::future::join_all;

use crate::models::{
    ChartPoint, KeywordData, KeywordSearchHit, RelatedArticle, RelatedKeyword, ReportArticle,
    ReportRanking, TimeSeriesPoint, TrendStatus,
};
use crate::services::common::TIME_SERIES_LIMIT;
use crate::services::report_api::ReportApi;

/// 详情三个切面的拉取结果
#[derive(Debug, Default)]
pub struct DetailFacets {
    /// 时间序列(已反转为时间正序)
    pub time_series: Vec<TimeSeriesPoint>,
    pub related_keywords: Vec<RelatedKeyword>,
    pub articles: Vec<RelatedArticle>,
}

/// 并行拉取三个详情切面
///
/// 三个请求彼此无顺序约束,单个失败记一条告警并降级为空切面,
/// 绝不中断其余两个。
pub async fn load_facets(api: &ReportApi, keyword_id: &str, limit: u32) -> DetailFacets {
    let (time_series, articles, related_keywords) = tokio::join!(
        api.fetch_time_series(keyword_id, Some(limit)),
        api.fetch_related_articles(keyword_id),
        api.fetch_related_keywords(keyword_id),
    );

    let mut time_series = time_series.unwrap_or_else(|e| {
        log::warn!("时间序列加载失败: {}", e);
        Vec::new()
    });
    // 后端按最新在前返回,反转为时间正序
    time_series.reverse();

    DetailFacets {
        time_series,
        related_keywords: related_keywords.unwrap_or_else(|e| {
            log::warn!("关联关键词加载失败: {}", e);
            Vec::new()
        }),
        articles: articles.unwrap_or_else(|e| {
            log::warn!("关联文章加载失败: {}", e);
            Vec::new()
        }),
    }
}

/// 把切面合并进已展示的关键词数据
///
/// 空时间序列保留原有趋势;关联文章/关键词总是替换。
pub fn apply_facets(base: &KeywordData, facets: DetailFacets) -> KeywordData {
    let mut merged = base.clone();
    if !facets.time_series.is_empty() {
        merged.trend_data = facets.time_series.iter().map(|p| p.score_sum).collect();
        merged.time_series = facets.time_series;
    }
    merged.related_keywords = facets
        .related_keywords
        .into_iter()
        .map(|rk| rk.normalized_text)
        .collect();
    merged.articles = facets.articles.into_iter().map(to_report_article).collect();
    merged
}

fn to_report_article(article: RelatedArticle) -> ReportArticle {
    ReportArticle {
        title: article.title,
        source: article.publisher,
        url: article.url,
        weight: article.weight,
    }
}

// ==================== 派生值计算 ====================

/// 变化率(整数百分比)
///
/// 取序列末位与其前 min(3, L-1) 个点均值的百分比差,
/// 序列不足两点或均值为 0 时取 0。
pub fn change_percent(trend: &[f64]) -> i32 {
    if trend.len() < 2 {
        return 0;
    }

    let last = trend[trend.len() - 1];
    let window = usize::min(3, trend.len() - 1);
    let recent = &trend[trend.len() - 1 - window..trend.len() - 1];
    let avg = recent.iter().sum::<f64>() / recent.len() as f64;

    if avg > 0.0 {
        (((last - avg) / avg) * 100.0).round() as i32
    } else {
        0
    }
}

/// 由变化率推导状态
pub fn status_from_change(change: i32) -> TrendStatus {
    if change > 0 {
        TrendStatus::Up
    } else if change < 0 {
        TrendStatus::Down
    } else {
        TrendStatus::Same
    }
}

/// 图表数据点
///
/// 有时间戳时横轴用零填充的 HH:MM(首尔时区),
/// 否则用 T-<n> 从序列长度倒数。
pub fn chart_points(keyword: &KeywordData) -> Vec<ChartPoint> {
    if !keyword.time_series.is_empty() {
        return keyword
            .time_series
            .iter()
            .map(|point| ChartPoint {
                time: format_bucket_time(&point.bucket_time),
                score: point.score_sum,
            })
            .collect();
    }

    let len = keyword.trend_data.len();
    keyword
        .trend_data
        .iter()
        .enumerate()
        .map(|(index, &score)| ChartPoint {
            time: format!("T-{}", len - index - 1),
            score,
        })
        .collect()
}

/// bucketTime 转 HH:MM 标签,无法解析时原样返回
fn format_bucket_time(bucket_time: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(bucket_time) {
        return dt.with_timezone(&Seoul).format("%H:%M").to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(bucket_time, fmt) {
            return dt.format("%H:%M").to_string();
        }
    }
    bucket_time.to_string()
}

// ==================== 关键词数据组装 ====================

/// 由排行条目和时间序列构建关键词数据(排行页)
///
/// time_series 为 None 表示时间序列拉取失败,趋势退化为五个零;
/// 拉取成功但为空时趋势退化为单点(排行得分)。
pub fn keyword_from_ranking(
    rank: u32,
    item: &ReportRanking,
    time_series: Option<Vec<TimeSeriesPoint>>,
) -> KeywordData {
    let (trend_data, time_series) = match time_series {
        None => (vec![0.0; 5], Vec::new()),
        Some(series) => {
            let trend: Vec<f64> = series.iter().map(|p| p.score_sum).collect();
            if trend.is_empty() {
                (vec![item.score_sum], series)
            } else {
                (trend, series)
            }
        }
    };

    let change = change_percent(&trend_data);
    KeywordData {
        id: if item.id.is_empty() {
            None
        } else {
            Some(item.id.clone())
        },
        rank,
        keyword: item.keyword.clone(),
        score: item.score_sum,
        change,
        status: status_from_change(change),
        trend_data,
        time_series,
        related_keywords: Vec::new(),
        articles: Vec::new(),
    }
}

/// 由搜索命中和详情切面合成关键词数据(搜索选择路径)
///
/// 搜索结果可能不在排行中,rank 置 0,得分取时间序列末位。
pub fn keyword_from_search(hit: &KeywordSearchHit, facets: DetailFacets) -> KeywordData {
    let trend_data: Vec<f64> = facets.time_series.iter().map(|p| p.score_sum).collect();
    let score = trend_data.last().copied().unwrap_or(0.0);
    let change = change_percent(&trend_data);

    KeywordData {
        id: Some(hit.id.clone()),
        rank: 0,
        keyword: hit.normalized_text.clone(),
        score,
        change,
        status: status_from_change(change),
        trend_data: if trend_data.is_empty() {
            vec![score]
        } else {
            trend_data
        },
        time_series: facets.time_series,
        related_keywords: facets
            .related_keywords
            .into_iter()
            .map(|rk| rk.normalized_text)
            .collect(),
        articles: facets.articles.into_iter().map(to_report_article).collect(),
    }
}

/// 为排行条目并发补齐时间序列并组装关键词数据
pub async fn hydrate_ranking(api: &ReportApi, ranking: &[ReportRanking]) -> Vec<KeywordData> {
    let tasks = ranking.iter().enumerate().map(|(index, item)| async move {
        let time_series = match api.fetch_time_series(&item.id, Some(TIME_SERIES_LIMIT)).await {
            Ok(mut series) => {
                series.reverse();
                Some(series)
            }
            Err(e) => {
                log::warn!("时间序列加载失败: keyword={} {}", item.keyword, e);
                None
            }
        };
        keyword_from_ranking(index as u32 + 1, item, time_series)
    });

    join_all(tasks).await
}

/// 为相似关键词并发补齐时间序列
///
/// 相似关键词只展示概览,变化率置 0,失败时趋势退化为单个零点。
pub async fn hydrate_similar(api: &ReportApi, hits: &[KeywordSearchHit]) -> Vec<KeywordData> {
    let tasks = hits.iter().map(|hit| async move {
        let time_series = match api.fetch_time_series(&hit.id, Some(TIME_SERIES_LIMIT)).await {
            Ok(mut series) => {
                series.reverse();
                series
            }
            Err(_) => Vec::new(),
        };
        let trend_data: Vec<f64> = time_series.iter().map(|p| p.score_sum).collect();

        KeywordData {
            id: Some(hit.id.clone()),
            rank: 0,
            keyword: hit.normalized_text.clone(),
            score: trend_data.last().copied().unwrap_or(0.0),
            change: 0,
            status: TrendStatus::Same,
            trend_data: if trend_data.is_empty() {
                vec![0.0]
            } else {
                trend_data
            },
            time_series,
            related_keywords: Vec::new(),
            articles: Vec::new(),
        }
    });

    join_all(tasks).await
}

// ==================== 测试模块 ====================
