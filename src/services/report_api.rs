//! 数据报告 API 客户端
//!
//! 对接 {report_api}/data-report/* 系列端点:排行、时间序列、
//! 关联文章、关联关键词、关键词搜索。全部属于主内容,
//! 失败时向调用方传播类型化错误。

use reqwest::Client;
use serde_json::Value;

use crate::config::AppConfig;
use crate::models::{
    ApiError, KeywordSearchHit, RelatedArticle, RelatedKeyword, ReportRanking, TimeSeriesPoint,
};
use crate::services::common::{build_http_client, id_field, str_field, value_to_f64, KEYWORD_SEARCH_LIMIT};

/// 数据报告 API 客户端(不携带 API Key)
pub struct ReportApi {
    client: Client,
    base_url: String,
    dev: bool,
}

impl ReportApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: build_http_client(&config.http),
            base_url: config.report_base_url().trim_end_matches('/').to_string(),
            dev: !config.is_production(),
        }
    }

    /// 数据报告排行
    pub async fn fetch_ranking(&self) -> Result<Vec<ReportRanking>, ApiError> {
        let data = self.get_json("/data-report/ranking", &[]).await?;
        Ok(parse_array(&data, |item| ReportRanking {
            id: id_field(item, "id"),
            keyword: str_field(item, "normalizedText"),
            freq_sum: value_to_f64(&item["freqSum"]),
            score_sum: value_to_f64(&item["scoreSum"]),
        }))
    }

    /// 时间序列(后端按最新在前返回,调用方负责反转)
    pub async fn fetch_time_series(
        &self,
        keyword_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<TimeSeriesPoint>, ApiError> {
        let mut params = vec![("keywordId", keyword_id.to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let data = self.get_json("/data-report/time-series", &params).await?;
        Ok(parse_array(&data, |item| TimeSeriesPoint {
            bucket_time: str_field(item, "bucketTime"),
            freq_sum: value_to_f64(&item["freqSum"]),
            score_sum: value_to_f64(&item["scoreSum"]),
        }))
    }

    /// 关联文章
    pub async fn fetch_related_articles(
        &self,
        keyword_id: &str,
    ) -> Result<Vec<RelatedArticle>, ApiError> {
        let params = [("keywordId", keyword_id.to_string())];
        let data = self.get_json("/data-report/related-articles", &params).await?;
        Ok(parse_array(&data, |item| RelatedArticle {
            id: id_field(item, "id"),
            publisher: str_field(item, "publisher"),
            title: str_field(item, "title"),
            url: str_field(item, "url"),
            published_at: str_field(item, "publishedAt"),
            weight: value_to_f64(&item["weight"]),
        }))
    }

    /// 关联关键词
    pub async fn fetch_related_keywords(
        &self,
        keyword_id: &str,
    ) -> Result<Vec<RelatedKeyword>, ApiError> {
        let params = [("keywordId", keyword_id.to_string())];
        let data = self.get_json("/data-report/related-keywords", &params).await?;
        Ok(parse_array(&data, |item| RelatedKeyword {
            id: id_field(item, "id"),
            normalized_text: str_field(item, "normalizedText"),
            co_count: value_to_f64(&item["coCount"]),
            weight_sum: value_to_f64(&item["weightSum"]),
            association_score: value_to_f64(&item["associationScore"]),
        }))
    }

    /// 关键词搜索,limit 缺省为 20
    pub async fn search_keyword(
        &self,
        keyword: &str,
        limit: Option<u32>,
    ) -> Result<Vec<KeywordSearchHit>, ApiError> {
        let params = [
            ("keyword", keyword.to_string()),
            ("limit", limit.unwrap_or(KEYWORD_SEARCH_LIMIT).to_string()),
        ];
        let data = self.get_json("/data-report/search-keyword", &params).await?;
        Ok(parse_array(&data, |item| KeywordSearchHit {
            id: id_field(item, "id"),
            normalized_text: str_field(item, "normalizedText"),
        }))
    }

    /// 发起 GET 请求并解析 JSON
    ///
    /// 非 2xx 转为类型化错误;响应体无法解析时降级为 Null,
    /// 由上层的数组解析进一步降级为空列表。
    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("数据报告 API 调用: {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("数据报告 API 调用失败: {} HTTP {}", path, status.as_u16());
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
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }
}

/// 数组响应逐条解析,非数组形态降级为空列表
fn parse_array<T>(data: &Value, parse: impl Fn(&Value) -> T) -> Vec<T> {
    match data.as_array() {
        Some(items) => items.iter().map(parse).collect(),
        None => Vec::new(),
    }
}

// ==================== 测试模块 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.report_api.base_url = base_url.to_string();
        config
    }

    /// 测试排行解析(freqSum 以字符串编码)
    #[tokio::test]
    async fn test_fetch_ranking() {
        println!("\n========== 测试数据报告排行 ==========");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data-report/ranking"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 7, "normalizedText": "한덕수", "freqSum": "42", "scoreSum": 118.5}
            ])))
            .mount(&server)
            .await;

        let api = ReportApi::new(&test_config(&server.uri()));
        let ranking = api.fetch_ranking().await.unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].id, "7");
        assert_eq!(ranking[0].keyword, "한덕수");
        assert_eq!(ranking[0].freq_sum, 42.0);
        assert_eq!(ranking[0].score_sum, 118.5);
        println!("✅ 数据报告排行测试通过！");
    }

    /// 测试时间序列的请求参数
    #[tokio::test]
    async fn test_fetch_time_series_params() {
        println!("\n========== 测试时间序列参数 ==========");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data-report/time-series"))
            .and(query_param("keywordId", "7"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"bucketTime": "2025-01-02T09:00:00+09:00", "freqSum": 5, "scoreSum": 31.0},
                {"bucketTime": "2025-01-02T08:00:00+09:00", "freqSum": 3, "scoreSum": 22.0}
            ])))
            .mount(&server)
            .await;

        let api = ReportApi::new(&test_config(&server.uri()));
        let series = api.fetch_time_series("7", Some(20)).await.unwrap();
        assert_eq!(series.len(), 2);
        // 原样保留后端顺序(最新在前)
        assert_eq!(series[0].score_sum, 31.0);
        println!("✅ 时间序列参数测试通过！");
    }

    /// 测试关键词搜索的默认 limit
    #[tokio::test]
    async fn test_search_keyword_default_limit() {
        println!("\n========== 测试关键词搜索默认 limit ==========");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data-report/search-keyword"))
            .and(query_param("keyword", "한덕수"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "7", "normalizedText": "한덕수"},
                {"id": "8", "normalizedText": "한덕수 실형"}
            ])))
            .mount(&server)
            .await;

        let api = ReportApi::new(&test_config(&server.uri()));
        let hits = api.search_keyword("한덕수", None).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].normalized_text, "한덕수 실형");
        println!("✅ 关键词搜索默认 limit 测试通过！");
    }

    /// 测试主内容错误传播
    #[tokio::test]
    async fn test_related_articles_http_error() {
        println!("\n========== 测试关联文章错误传播 ==========");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data-report/related-articles"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = ReportApi::new(&test_config(&server.uri()));
        let error = api.fetch_related_articles("7").await.unwrap_err();
        assert_eq!(error.status(), Some(404));
        println!("✅ 关联文章错误传播测试通过！");
    }
}
