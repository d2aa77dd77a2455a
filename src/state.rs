//! 顶层视图状态容器
//!
//! 排行快照、选中详情等可变状态由组合根持有并显式下传,
//! 不设全局单例。单线程事件循环天然串行化所有写入,
//! 但过期检查(选择令牌)仍是必须的。

use chrono::DateTime;
use chrono_tz::Tz;

use crate::detail::{self, DetailFacets};
use crate::models::{Category, KeywordData, RankingRecord, TrendItem};
use crate::reconcile::reconcile;
use crate::services::common::{seoul_now, TIME_SERIES_LIMIT};
use crate::services::report_api::ReportApi;
use crate::services::trend_api::TrendApi;

// ==================== 趋势页状态 ====================

/// 趋势页状态: 排行快照 + 分类过滤
#[derive(Default)]
pub struct TrendState {
    records: Vec<RankingRecord>,
    category: Category,
    error: Option<String>,
    loading: bool,
}

impl TrendState {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            category: Category::all(),
            error: None,
            loading: true,
        }
    }

    /// 拉取排行并替换快照;失败时清空快照并记录错误
    pub async fn load(&mut self, api: &TrendApi) {
        self.loading = true;
        self.error = None;

        match api.fetch_ranking().await {
            Ok(records) => {
                log::info!("排行加载完成: {} 条", records.len());
                self.records = records;
            }
            Err(e) => {
                log::error!("排行加载失败: {}", e);
                self.records.clear();
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    /// 当前分类下的展示条目
    ///
    /// 加载中或出错时返回空列表,由视图渲染相应状态而非陈旧数据。
    pub fn items(&self) -> Vec<TrendItem> {
        if self.loading || self.error.is_some() {
            return Vec::new();
        }
        reconcile(&self.records, &self.category)
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }
}

// ==================== 数据报告页状态 ====================

/// 数据报告页状态: 关键词排行 + 选中详情
#[derive(Default)]
pub struct ReportState {
    keywords: Vec<KeywordData>,
    selected: Option<KeywordData>,
    /// 选择代际,迟到的详情结果按此判断是否过期
    selection_gen: u64,
    /// 关键词搜索的相似结果(首个命中之外的其余命中)
    similar: Vec<KeywordData>,
    not_found: bool,
    last_updated: Option<DateTime<Tz>>,
    error: Option<String>,
    loading: bool,
}

impl ReportState {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 只读视图 ====================

    pub fn keywords(&self) -> &[KeywordData] {
        &self.keywords
    }

    pub fn selected(&self) -> Option<&KeywordData> {
        self.selected.as_ref()
    }

    pub fn similar(&self) -> &[KeywordData] {
        &self.similar
    }

    pub fn not_found(&self) -> bool {
        self.not_found
    }

    pub fn last_updated(&self) -> Option<&DateTime<Tz>> {
        self.last_updated.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    // ==================== 加载与刷新 ====================

    /// 加载排行并为每个关键词并发补齐时间序列
    pub async fn load(&mut self, api: &ReportApi) {
        self.loading = true;
        self.error = None;

        match api.fetch_ranking().await {
            Ok(ranking) => {
                self.keywords = detail::hydrate_ranking(api, &ranking).await;
                self.last_updated = Some(seoul_now());
                log::info!("数据报告排行加载完成: {} 条", self.keywords.len());
            }
            Err(e) => {
                log::error!("数据报告排行加载失败: {}", e);
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    /// 手动刷新
    ///
    /// 重建排行快照;有选中关键词时按 id 在新快照中重解析详情,
    /// id 不在新快照中则保留旧详情不动。
    pub async fn refresh(&mut self, api: &ReportApi) {
        self.load(api).await;
        if self.error.is_some() {
            return;
        }

        let selected_id = match self.selected.as_ref().and_then(|k| k.id.clone()) {
            Some(id) => id,
            None => return,
        };

        match self
            .keywords
            .iter()
            .find(|k| k.id.as_deref() == Some(selected_id.as_str()))
            .cloned()
        {
            Some(updated) => {
                let token = self.begin_selection(updated);
                let facets = detail::load_facets(api, &selected_id, TIME_SERIES_LIMIT).await;
                self.apply_detail(token, facets);
            }
            None => {
                log::debug!("刷新后选中关键词已不在排行中,保留旧详情: id={}", selected_id);
            }
        }
    }

    // ==================== 选择与详情合并 ====================

    /// 开始一次选择(快路径): 立即展示摘要,返回本次选择的令牌
    ///
    /// 详情切面由调用方拉取后带令牌合并;期间发生的新选择
    /// 会使旧令牌过期,迟到的切面被丢弃。
    pub fn begin_selection(&mut self, base: KeywordData) -> u64 {
        self.selection_gen += 1;
        self.selected = Some(base);
        self.not_found = false;
        self.similar.clear();
        self.selection_gen
    }

    /// 合并详情切面;令牌过期时丢弃并返回 false
    pub fn apply_detail(&mut self, token: u64, facets: DetailFacets) -> bool {
        if token != self.selection_gen {
            log::debug!("丢弃过期的详情切面: token={}", token);
            return false;
        }
        match &self.selected {
            Some(base) => {
                self.selected = Some(detail::apply_facets(base, facets));
                true
            }
            None => false,
        }
    }

    /// 从排行中选择关键词(快路径)
    ///
    /// 摘要立即可见,三个切面并行拉取后合并。
    pub async fn select_from_ranking(&mut self, api: &ReportApi, keyword: KeywordData) {
        let id = keyword.id.clone();
        let token = self.begin_selection(keyword);
        if let Some(id) = id {
            let facets = detail::load_facets(api, &id, TIME_SERIES_LIMIT).await;
            self.apply_detail(token, facets);
        }
    }

    /// 关键词搜索(慢路径)
    ///
    /// 先在本地排行中找大小写不敏感的精确匹配;否则调用搜索 API,
    /// 首个命中合成详情,其余命中作为相似关键词各自补齐时间序列。
    pub async fn search(&mut self, api: &ReportApi, keyword: &str) {
        if let Some(found) = self
            .keywords
            .iter()
            .find(|k| k.keyword.to_lowercase() == keyword.to_lowercase())
            .cloned()
        {
            self.select_from_ranking(api, found).await;
            return;
        }

        self.loading = true;
        let outcome = api.search_keyword(keyword, None).await;
        self.loading = false;

        match outcome {
            Ok(hits) if !hits.is_empty() => {
                let first = hits[0].clone();
                let facets = detail::load_facets(api, &first.id, TIME_SERIES_LIMIT).await;

                self.selection_gen += 1;
                self.selected = Some(detail::keyword_from_search(&first, facets));
                self.not_found = false;
                self.similar = detail::hydrate_similar(api, &hits[1..]).await;
            }
            Ok(_) => {
                log::debug!("关键词搜索无结果: {}", keyword);
                self.mark_not_found();
            }
            Err(e) => {
                log::error!("关键词搜索失败: {}", e);
                self.mark_not_found();
            }
        }
    }

    fn mark_not_found(&mut self) {
        self.selection_gen += 1;
        self.not_found = true;
        self.similar.clear();
        self.selected = None;
    }
}

// ==================== 测试模块 ====================
