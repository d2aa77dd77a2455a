//! 趋势排行 API 客户端
//!
//! 对接 {trend_api}/trend/top,返回关键词排行记录。
//! 该 API 属于主内容,失败时向调用方传播类型化错误。

use reqwest::Client;
use serde_json::Value;

use crate::config::AppConfig;
use crate::models::{ApiError, RankingRecord};
use crate::services::common::{build_http_client, id_field, opt_f64, str_field};

/// 趋势排行 API 客户端
///
/// Admin API Key 仅附加在本客户端的请求头,搜索/报告 API 不携带。
pub struct TrendApi {
    client: Client,
    base_url: String,
    api_key: String,
    dev: bool,
}

impl TrendApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: build_http_client(&config.http),
            base_url: config.trend_api.base_url.trim_end_matches('/').to_string(),
            api_key: config.trend_api.api_key.clone(),
            dev: !config.is_production(),
        }
    }

    /// 拉取关键词排行
    pub async fn fetch_ranking(&self) -> Result<Vec<RankingRecord>, ApiError> {
        let url = format!("{}/trend/top", self.base_url);
        log::debug!("排行 API 调用: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            request = request.header("X-API-Key", self.api_key.as_str());
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("排行 API 错误响应: HTTP {} {}", status.as_u16(), body);
            // 响应体细节只在开发环境透出
            let message = if self.dev && !body.is_empty() {
                Some(body)
            } else {
                None
            };
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await.map_err(ApiError::from)?;
        let data: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(parse_ranking_records(&data))
    }
}

/// 解析排行响应,非数组形态降级为空列表
fn parse_ranking_records(data: &Value) -> Vec<RankingRecord> {
    match data.as_array() {
        Some(items) => items.iter().map(parse_ranking_record).collect(),
        None => Vec::new(),
    }
}

/// 解析单条排行记录,兼容两代打分 schema
fn parse_ranking_record(item: &Value) -> RankingRecord {
    let articles = item["articles"]
        .as_array()
        .map(|titles| {
            titles
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    RankingRecord {
        id: id_field(item, "id"),
        keyword: str_field(item, "keyword"),
        rank: item["rank"].as_u64().unwrap_or(0) as u32,
        status: str_field(item, "status"),
        rank_change: item["rankChange"].as_i64().unwrap_or(0) as i32,
        score: opt_f64(item, "score"),
        score24h: opt_f64(item, "score24h"),
        score_recent: opt_f64(item, "scoreRecent"),
        score_prev: opt_f64(item, "scorePrev"),
        diff_score: opt_f64(item, "diffScore"),
        total_score: opt_f64(item, "totalScore"),
        recent_score: opt_f64(item, "recentScore"),
        trend_score: opt_f64(item, "trendScore"),
        articles,
    }
}

// ==================== 测试模块 ====================
