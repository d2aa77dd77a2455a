//! 新闻搜索 API 客户端
//!
//! 对接 {search_api}/articles/search。
//! 自动补全建议静默降级(任何失败返回空列表),
//! 搜索执行属于主内容,失败时传播类型化错误。

use reqwest::Client;
use serde_json::Value;

use crate::config::AppConfig;
use crate::models::{ApiError, SearchResult, SearchResultResponse, SearchSuggestion};
use crate::services::common::{build_http_client, opt_f64, str_field};

/// 建议条目里关键词字段的同义词,按优先级尝试
const KEYWORD_FIELDS: [&str; 6] = ["title", "keyword", "query", "text", "name", "label"];

/// 新闻搜索 API 客户端(不携带 API Key)
pub struct SearchApi {
    client: Client,
    base_url: String,
    dev: bool,
}

impl SearchApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: build_http_client(&config.http),
            base_url: config.search_api.base_url.trim_end_matches('/').to_string(),
            dev: !config.is_production(),
        }
    }

    /// 自动补全建议
    ///
    /// 空白输入立即返回空列表;传输失败、非 2xx、形态异常一律降级为空列表。
    pub async fn search_suggestions(&self, query: &str) -> Vec<SearchSuggestion> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let url = format!("{}/articles/search", self.base_url);
        log::debug!("建议 API 调用: {} query={}", url, query);

        let response = match self
            .client
            .get(&url)
            .query(&[("query", query)])
            .header("Content-Type", "application/json")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                log::warn!("建议 API 请求失败: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            log::warn!("建议 API 调用失败: HTTP {}", response.status().as_u16());
            return Vec::new();
        }

        let data: Value = match response.json().await {
            Ok(d) => d,
            Err(e) => {
                log::warn!("建议 API 响应解析失败: {}", e);
                return Vec::new();
            }
        };

        normalize_suggestions(&data)
    }

    /// 执行搜索(服务端分页)
    pub async fn search_articles(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchResultResponse, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResultResponse::empty(1, page_size));
        }

        let url = format!("{}/articles/search", self.base_url);
        log::debug!("搜索 API 调用: {} query={} page={}", url, query, page);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("page", &page.to_string()),
                ("size", &page_size.to_string()),
            ])
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("搜索 API 调用失败: HTTP {}", status.as_u16());
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
        Ok(parse_search_response(&data, page, page_size))
    }
}

// ==================== 建议响应归一化 ====================

/// 建议响应的几种已知形态
///
/// 端点历史上返回过裸数组、items/suggestions/results 包装对象
/// 和单对象四种结构,按固定优先级检测。
enum SuggestionShape<'a> {
    /// 裸数组
    Array(&'a [Value]),
    /// 对象包装的数组(items / suggestions / results)
    Wrapped(&'a [Value]),
    /// 单对象
    Single(&'a Value),
    /// 无法识别
    Unknown,
}

/// 形态检测:裸数组 → items → suggestions → results → 单对象
fn detect_shape(data: &Value) -> SuggestionShape<'_> {
    if let Some(items) = data.as_array() {
        return SuggestionShape::Array(items);
    }
    if data.is_object() {
        for key in ["items", "suggestions", "results"] {
            if let Some(items) = data[key].as_array() {
                return SuggestionShape::Wrapped(items);
            }
        }
        return SuggestionShape::Single(data);
    }
    SuggestionShape::Unknown
}

/// 从条目中提取关键词
///
/// 字符串条目原样返回;对象条目按同义字段优先级尝试,全部为空时返回空串。
fn extract_keyword(item: &Value) -> String {
    if let Some(s) = item.as_str() {
        return s.to_string();
    }
    if item.is_object() {
        for key in KEYWORD_FIELDS {
            if let Some(s) = item[key].as_str() {
                if !s.is_empty() {
                    return s.to_string();
                }
            }
        }
    }
    String::new()
}

/// 条目计数,count 缺失时回退到 score
fn extract_count(item: &Value) -> Option<f64> {
    opt_f64(item, "count").or_else(|| opt_f64(item, "score"))
}

/// 归一化建议响应,提取不到关键词的条目直接跳过
pub fn normalize_suggestions(data: &Value) -> Vec<SearchSuggestion> {
    let items: &[Value] = match detect_shape(data) {
        SuggestionShape::Array(items) | SuggestionShape::Wrapped(items) => items,
        SuggestionShape::Single(obj) => {
            let keyword = extract_keyword(obj);
            if keyword.is_empty() {
                return Vec::new();
            }
            return vec![SearchSuggestion {
                keyword,
                count: extract_count(obj),
            }];
        }
        SuggestionShape::Unknown => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| {
            let keyword = extract_keyword(item);
            if keyword.is_empty() {
                return None;
            }
            Some(SearchSuggestion {
                keyword,
                count: extract_count(item),
            })
        })
        .collect()
}

// ==================== 搜索响应解析 ====================

/// 解析分页搜索响应
///
/// total 回退到 items.len(),id/link 互为回退,
/// 非 {total, items} 形态降级为空响应。
fn parse_search_response(data: &Value, page: u32, page_size: u32) -> SearchResultResponse {
    let Some(items) = data["items"].as_array() else {
        return SearchResultResponse::empty(page, page_size);
    };

    let results: Vec<SearchResult> = items
        .iter()
        .map(|item| {
            let id = str_field(item, "id");
            let link = str_field(item, "link");
            SearchResult {
                id: if id.is_empty() { link.clone() } else { id.clone() },
                link: if link.is_empty() { id } else { link },
                title: str_field(item, "title"),
                press: str_field(item, "press"),
                pub_date: str_field(item, "pubDate"),
                description: str_field(item, "description"),
                category: str_field(item, "category"),
            }
        })
        .collect();

    SearchResultResponse {
        total: data["total"].as_u64().unwrap_or(results.len() as u64),
        items: results,
        page: data["page"].as_u64().unwrap_or(page as u64) as u32,
        page_size: data["size"].as_u64().unwrap_or(page_size as u64) as u32,
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
        config.search_api.base_url = base_url.to_string();
        config
    }

    /// 测试 items 包装对象的归一化
    #[test]
    fn test_normalize_wrapped_items() {
        println!("\n========== 测试 items 形态归一化 ==========");
        let data = json!({"items": [{"title": "한덕수"}], "total": 25});
        let suggestions = normalize_suggestions(&data);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].keyword, "한덕수");
        println!("✅ items 形态归一化测试通过！");
    }

    /// 测试裸数组(字符串条目)的归一化
    #[test]
    fn test_normalize_bare_array() {
        println!("\n========== 测试裸数组归一化 ==========");
        let data = json!(["a", "b"]);
        let suggestions = normalize_suggestions(&data);
        assert_eq!(
            suggestions,
            vec![
                SearchSuggestion { keyword: "a".to_string(), count: None },
                SearchSuggestion { keyword: "b".to_string(), count: None },
            ]
        );
        println!("✅ 裸数组归一化测试通过！");
    }

    /// 测试无法识别的形态返回空列表
    #[test]
    fn test_normalize_unknown_shape() {
        println!("\n========== 测试未知形态归一化 ==========");
        assert!(normalize_suggestions(&json!({})).is_empty());
        assert!(normalize_suggestions(&json!(42)).is_empty());
        println!("✅ 未知形态归一化测试通过！");
    }

    /// 测试同义字段优先级和空关键词跳过
    #[test]
    fn test_normalize_keyword_synonyms() {
        println!("\n========== 测试同义字段提取 ==========");
        let data = json!({"suggestions": [
            {"keyword": "실형", "count": 3},
            {"label": "총리", "score": 7},
            {"title": ""},
            {"irrelevant": "x"}
        ]});
        let suggestions = normalize_suggestions(&data);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].keyword, "실형");
        assert_eq!(suggestions[0].count, Some(3.0));
        assert_eq!(suggestions[1].keyword, "총리");
        assert_eq!(suggestions[1].count, Some(7.0));
        println!("✅ 同义字段提取测试通过！");
    }

    /// 测试单对象形态
    #[test]
    fn test_normalize_single_object() {
        println!("\n========== 测试单对象归一化 ==========");
        let suggestions = normalize_suggestions(&json!({"name": "한덕수"}));
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].keyword, "한덕수");
        println!("✅ 单对象归一化测试通过！");
    }

    /// 测试建议请求失败时静默降级
    #[tokio::test]
    async fn test_suggestions_swallow_http_error() {
        println!("\n========== 测试建议静默降级 ==========");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = SearchApi::new(&test_config(&server.uri()));
        let suggestions = api.search_suggestions("한덕수").await;
        assert!(suggestions.is_empty());
        println!("✅ 建议静默降级测试通过！");
    }

    /// 测试空白输入不发起请求
    #[tokio::test]
    async fn test_suggestions_blank_input() {
        println!("\n========== 测试空白输入 ==========");
        let api = SearchApi::new(&test_config("http://127.0.0.1:1"));
        assert!(api.search_suggestions("   ").await.is_empty());
        println!("✅ 空白输入测试通过！");
    }

    /// 测试搜索执行:查询参数编码与响应解析
    #[tokio::test]
    async fn test_search_articles() {
        println!("\n========== 测试搜索执行 ==========");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/search"))
            .and(query_param("query", "한덕수 실형"))
            .and(query_param("page", "2"))
            .and(query_param("size", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 25,
                "items": [
                    {"id": "a-1", "title": "기사 제목", "link": "https://news.example.com/a-1",
                     "press": "트렌드신문", "pubDate": "2025-01-02"},
                    {"title": "링크만 있는 기사", "link": "https://news.example.com/a-2"}
                ],
                "page": 2,
                "size": 10
            })))
            .mount(&server)
            .await;

        let api = SearchApi::new(&test_config(&server.uri()));
        let response = api.search_articles("한덕수 실형", 2, 10).await.unwrap();
        assert_eq!(response.total, 25);
        assert_eq!(response.page, 2);
        assert_eq!(response.items.len(), 2);
        // id 缺失时回退到 link
        assert_eq!(response.items[1].id, "https://news.example.com/a-2");
        println!("✅ 搜索执行测试通过！");
    }

    /// 测试搜索执行的错误传播
    #[tokio::test]
    async fn test_search_articles_http_error() {
        println!("\n========== 测试搜索错误传播 ==========");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/search"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let api = SearchApi::new(&test_config(&server.uri()));
        let error = api.search_articles("실형", 1, 10).await.unwrap_err();
        assert_eq!(error.status(), Some(502));
        println!("✅ 搜索错误传播测试通过！");
    }

    /// 测试异常形态的搜索响应降级为空
    #[tokio::test]
    async fn test_search_articles_unexpected_shape() {
        println!("\n========== 测试搜索异常形态降级 ==========");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["unexpected"])))
            .mount(&server)
            .await;

        let api = SearchApi::new(&test_config(&server.uri()));
        let response = api.search_articles("실형", 1, 10).await.unwrap();
        assert_eq!(response.total, 0);
        assert!(response.items.is_empty());
        println!("✅ 搜索异常形态降级测试通过！");
    }
}
