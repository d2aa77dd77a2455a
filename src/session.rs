//! 搜索会话控制器
//!
//! 管理一次逻辑搜索会话:输入建议、搜索执行、服务端分页。
//! 过期响应通过代际计数器丢弃("最后请求者胜出"),
//! 而不是传输层中断;驱动方在防抖延迟后携带票据发起拉取。

use std::time::Duration;

use crate::models::{ApiError, SearchResultResponse, SearchSuggestion};

/// 建议拉取的防抖延迟
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(300);
/// 搜索结果固定每页条数
pub const PAGE_SIZE: u32 = 10;

/// 建议请求票据
///
/// set_input 每次变化都会换发新票据,应用结果前必须核对 token。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionTicket {
    pub token: u64,
    pub query: String,
}

/// 搜索请求票据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub token: u64,
    pub query: String,
    pub page: u32,
    pub page_size: u32,
}

/// 建议面板的键盘事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// 搜索会话状态
///
/// 同一时刻只有一个逻辑查询;新的输入将之前的在途请求作废。
#[derive(Debug, Default)]
pub struct SearchSession {
    input: String,
    suggestions: Vec<SearchSuggestion>,
    panel_open: bool,
    /// 建议选择游标,-1 表示未选中,上限为 len-1
    cursor: isize,
    /// 建议代际(输入每次变化递增)
    suggestion_gen: u64,
    /// 搜索代际(每次执行/翻页递增)
    search_gen: u64,
    /// 当前已执行搜索的查询词
    query: String,
    page: u32,
    results: Option<SearchResultResponse>,
    /// 执行搜索时获得的第 1 页结果,回到第 1 页时复用
    first_page: Option<SearchResultResponse>,
    error: Option<String>,
    loading: bool,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            cursor: -1,
            page: 1,
            ..Default::default()
        }
    }

    // ==================== 只读视图 ====================

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[SearchSuggestion] {
        &self.suggestions
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn results(&self) -> Option<&SearchResultResponse> {
        self.results.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    // ==================== 输入与建议 ====================

    /// 输入变化
    ///
    /// 空白输入同步清空建议并关闭面板,不换发票据;
    /// 否则返回防抖延迟后应执行的建议票据。
    pub fn set_input(&mut self, value: &str) -> Option<SuggestionTicket> {
        self.input = value.to_string();
        self.cursor = -1;
        self.suggestion_gen += 1;

        if value.trim().is_empty() {
            self.suggestions.clear();
            self.panel_open = false;
            return None;
        }

        Some(SuggestionTicket {
            token: self.suggestion_gen,
            query: value.trim().to_string(),
        })
    }

    /// 应用建议结果
    ///
    /// 票据过期(输入已变化或搜索已执行)时丢弃并返回 false。
    pub fn apply_suggestions(&mut self, token: u64, items: Vec<SearchSuggestion>) -> bool {
        if token != self.suggestion_gen {
            log::debug!("丢弃过期的建议响应: token={}", token);
            return false;
        }

        self.panel_open = !items.is_empty();
        self.suggestions = items;
        if self.cursor >= self.suggestions.len() as isize {
            self.cursor = self.suggestions.len() as isize - 1;
        }
        true
    }

    /// 建议面板的键盘契约
    ///
    /// ArrowDown/ArrowUp 在 [-1, len-1] 内移动游标;
    /// Enter 确认选中项,未选中时直接搜索输入框文本;
    /// Escape 只关闭面板,不清空输入。
    pub fn handle_key(&mut self, key: SessionKey) -> Option<SearchTicket> {
        match key {
            SessionKey::ArrowDown => {
                if self.panel_open
                    && !self.suggestions.is_empty()
                    && self.cursor < self.suggestions.len() as isize - 1
                {
                    self.cursor += 1;
                }
                None
            }
            SessionKey::ArrowUp => {
                if self.panel_open && !self.suggestions.is_empty() && self.cursor > -1 {
                    self.cursor -= 1;
                }
                None
            }
            SessionKey::Escape => {
                self.panel_open = false;
                None
            }
            SessionKey::Enter => {
                let query = if self.cursor >= 0 {
                    self.suggestions
                        .get(self.cursor as usize)
                        .map(|s| s.keyword.clone())
                        .unwrap_or_default()
                } else {
                    self.input.trim().to_string()
                };
                if query.is_empty() {
                    return None;
                }
                // 确认建议时把关键词回填输入框
                if self.cursor >= 0 {
                    self.input = query.clone();
                }
                Some(self.begin_search(query))
            }
        }
    }

    /// 点击选择建议
    pub fn select_suggestion(&mut self, index: usize) -> Option<SearchTicket> {
        let keyword = self.suggestions.get(index)?.keyword.clone();
        self.input = keyword.clone();
        Some(self.begin_search(keyword))
    }

    // ==================== 搜索执行与分页 ====================

    /// 执行搜索
    ///
    /// 总是从第 1 页开始、固定每页 10 条;关闭建议面板并
    /// 作废在途建议请求。
    pub fn begin_search(&mut self, query: String) -> SearchTicket {
        self.suggestion_gen += 1; // 作废在途建议
        self.panel_open = false;
        self.cursor = -1;
        self.search_gen += 1;
        self.query = query.clone();
        self.page = 1;
        self.first_page = None;
        self.loading = true;
        self.error = None;

        SearchTicket {
            token: self.search_gen,
            query,
            page: 1,
            page_size: PAGE_SIZE,
        }
    }

    /// 翻页
    ///
    /// 回到第 1 页时复用执行搜索时获得的结果,不重复请求;
    /// 其余页换发票据重新发起搜索。
    pub fn goto_page(&mut self, page: u32) -> Option<SearchTicket> {
        if self.query.is_empty() || page == 0 || page == self.page {
            return None;
        }

        if page == 1 {
            if let Some(first) = self.first_page.clone() {
                self.page = 1;
                self.results = Some(first);
                return None;
            }
        }

        self.search_gen += 1;
        self.page = page;
        self.loading = true;

        Some(SearchTicket {
            token: self.search_gen,
            query: self.query.clone(),
            page,
            page_size: PAGE_SIZE,
        })
    }

    /// 应用搜索结果
    ///
    /// 令牌过期(更新的搜索/翻页已发出)时丢弃并返回 false;
    /// 第 1 页结果留档供 goto_page(1) 复用。
    pub fn apply_results(
        &mut self,
        token: u64,
        outcome: Result<SearchResultResponse, ApiError>,
    ) -> bool {
        if token != self.search_gen {
            log::debug!("丢弃过期的搜索响应: token={}", token);
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(response) => {
                if response.page <= 1 {
                    self.first_page = Some(response.clone());
                }
                self.results = Some(response);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// 重置会话(返回趋势页)
    ///
    /// 代际计数保留并递增,在途请求的迟到结果照常作废。
    pub fn reset(&mut self) {
        self.suggestion_gen += 1;
        self.search_gen += 1;
        self.input.clear();
        self.suggestions.clear();
        self.panel_open = false;
        self.cursor = -1;
        self.query.clear();
        self.page = 1;
        self.results = None;
        self.first_page = None;
        self.error = None;
        self.loading = false;
    }
}

// ==================== 分页窗口 ====================

/// 分页窗口条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// 计算分页按钮窗口
///
/// 页码按钮最多 5 个:总页数 ≤ 5 时全部展示;
/// 当前页 ≤ 3 时展示 1–4 + 省略号 + 末页;
/// 当前页 ≥ 总页数-2 时展示首页 + 省略号 + 末 4 页;
/// 其余情况首末页夹当前页前后各一页,两侧省略号。
pub fn page_window(total_pages: u32, current: u32) -> Vec<PageItem> {
    let mut pages = Vec::new();

    if total_pages <= 5 {
        for page in 1..=total_pages {
            pages.push(PageItem::Page(page));
        }
    } else if current <= 3 {
        for page in 1..=4 {
            pages.push(PageItem::Page(page));
        }
        pages.push(PageItem::Ellipsis);
        pages.push(PageItem::Page(total_pages));
    } else if current >= total_pages - 2 {
        pages.push(PageItem::Page(1));
        pages.push(PageItem::Ellipsis);
        for page in total_pages - 3..=total_pages {
            pages.push(PageItem::Page(page));
        }
    } else {
        pages.push(PageItem::Page(1));
        pages.push(PageItem::Ellipsis);
        for page in current - 1..=current + 1 {
            pages.push(PageItem::Page(page));
        }
        pages.push(PageItem::Ellipsis);
        pages.push(PageItem::Page(total_pages));
    }

    pages
}

// ==================== 测试模块 ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(keyword: &str) -> SearchSuggestion {
        SearchSuggestion {
            keyword: keyword.to_string(),
            count: None,
        }
    }

    fn response(total: u64, page: u32, marker: &str) -> SearchResultResponse {
        use crate::models::SearchResult;
        SearchResultResponse {
            total,
            items: vec![SearchResult {
                id: marker.to_string(),
                title: marker.to_string(),
                link: String::new(),
                press: String::new(),
                pub_date: String::new(),
                description: String::new(),
                category: String::new(),
            }],
            page,
            page_size: PAGE_SIZE,
        }
    }

    /// 测试过期建议响应被丢弃("a" 的响应晚于 "ab" 的响应到达)
    #[test]
    fn test_stale_suggestions_discarded() {
        println!("\n========== 测试建议过期丢弃 ==========");
        let mut session = SearchSession::new();

        let ticket_a = session.set_input("a").unwrap();
        let ticket_ab = session.set_input("ab").unwrap();

        // "ab" 的响应先到
        assert!(session.apply_suggestions(ticket_ab.token, vec![suggestion("ab건")]));
        // "a" 的响应迟到,必须丢弃
        assert!(!session.apply_suggestions(ticket_a.token, vec![suggestion("a건")]));

        assert_eq!(session.suggestions().len(), 1);
        assert_eq!(session.suggestions()[0].keyword, "ab건");
        println!("✅ 建议过期丢弃测试通过！");
    }

    /// 测试空白输入同步清空建议
    #[test]
    fn test_blank_input_clears_suggestions() {
        println!("\n========== 测试空白输入清空 ==========");
        let mut session = SearchSession::new();
        let ticket = session.set_input("한덕수").unwrap();
        session.apply_suggestions(ticket.token, vec![suggestion("한덕수")]);
        assert!(session.panel_open());

        assert!(session.set_input("   ").is_none());
        assert!(session.suggestions().is_empty());
        assert!(!session.panel_open());
        println!("✅ 空白输入清空测试通过！");
    }

    /// 测试键盘游标在 [-1, len-1] 内钳制
    #[test]
    fn test_cursor_clamping() {
        println!("\n========== 测试游标钳制 ==========");
        let mut session = SearchSession::new();
        let ticket = session.set_input("한").unwrap();
        session.apply_suggestions(ticket.token, vec![suggestion("한덕수"), suggestion("한파")]);

        assert_eq!(session.cursor(), -1);
        session.handle_key(SessionKey::ArrowUp);
        assert_eq!(session.cursor(), -1); // 上边界
        session.handle_key(SessionKey::ArrowDown);
        session.handle_key(SessionKey::ArrowDown);
        session.handle_key(SessionKey::ArrowDown);
        assert_eq!(session.cursor(), 1); // 下边界 len-1
        session.handle_key(SessionKey::ArrowUp);
        session.handle_key(SessionKey::ArrowUp);
        assert_eq!(session.cursor(), -1);
        println!("✅ 游标钳制测试通过！");
    }

    /// 测试 Enter: 选中建议时确认建议,未选中时搜索输入文本
    #[test]
    fn test_enter_confirms_highlight_or_input() {
        println!("\n========== 测试 Enter 语义 ==========");
        let mut session = SearchSession::new();
        let ticket = session.set_input("한").unwrap();
        session.apply_suggestions(ticket.token, vec![suggestion("한덕수"), suggestion("한파")]);

        // 未选中 → 搜索输入文本
        let direct = session.handle_key(SessionKey::Enter).unwrap();
        assert_eq!(direct.query, "한");
        assert_eq!(direct.page, 1);
        assert_eq!(direct.page_size, 10);
        assert!(!session.panel_open());

        // 选中第二项 → 确认建议并回填输入框
        let ticket = session.set_input("한").unwrap();
        session.apply_suggestions(ticket.token, vec![suggestion("한덕수"), suggestion("한파")]);
        session.handle_key(SessionKey::ArrowDown);
        session.handle_key(SessionKey::ArrowDown);
        let confirmed = session.handle_key(SessionKey::Enter).unwrap();
        assert_eq!(confirmed.query, "한파");
        assert_eq!(session.input(), "한파");
        println!("✅ Enter 语义测试通过！");
    }

    /// 测试 Escape 只关闭面板不清空输入
    #[test]
    fn test_escape_keeps_input() {
        println!("\n========== 测试 Escape 语义 ==========");
        let mut session = SearchSession::new();
        let ticket = session.set_input("한덕수").unwrap();
        session.apply_suggestions(ticket.token, vec![suggestion("한덕수")]);

        assert!(session.handle_key(SessionKey::Escape).is_none());
        assert!(!session.panel_open());
        assert_eq!(session.input(), "한덕수");
        println!("✅ Escape 语义测试通过！");
    }

    /// 测试执行搜索作废在途建议
    #[test]
    fn test_search_invalidates_pending_suggestions() {
        println!("\n========== 测试搜索作废在途建议 ==========");
        let mut session = SearchSession::new();
        let pending = session.set_input("한덕수").unwrap();

        let ticket = session.begin_search("한덕수".to_string());
        assert_eq!(ticket.page, 1);
        // 建议的迟到响应被作废
        assert!(!session.apply_suggestions(pending.token, vec![suggestion("한덕수")]));
        println!("✅ 搜索作废在途建议测试通过！");
    }

    /// 测试翻页: 第 1 页复用留档结果,其余页换发票据
    #[test]
    fn test_pagination_reuses_first_page() {
        println!("\n========== 测试翻页复用 ==========");
        let mut session = SearchSession::new();
        let ticket = session.begin_search("한덕수".to_string());
        assert!(session.apply_results(ticket.token, Ok(response(25, 1, "page-1"))));

        // 第 2 页重新请求
        let ticket = session.goto_page(2).unwrap();
        assert_eq!(ticket.page, 2);
        assert!(session.apply_results(ticket.token, Ok(response(25, 2, "page-2"))));
        assert_eq!(session.results().unwrap().items[0].id, "page-2");

        // 回到第 1 页不换发票据,直接复用留档
        assert!(session.goto_page(1).is_none());
        assert_eq!(session.page(), 1);
        assert_eq!(session.results().unwrap().items[0].id, "page-1");
        println!("✅ 翻页复用测试通过！");
    }

    /// 测试过期搜索响应被丢弃
    #[test]
    fn test_stale_search_results_discarded() {
        println!("\n========== 测试搜索过期丢弃 ==========");
        let mut session = SearchSession::new();
        let old_ticket = session.begin_search("한덕수".to_string());
        let new_ticket = session.begin_search("실형".to_string());

        assert!(session.apply_results(new_ticket.token, Ok(response(5, 1, "new"))));
        assert!(!session.apply_results(old_ticket.token, Ok(response(9, 1, "old"))));
        assert_eq!(session.results().unwrap().items[0].id, "new");
        println!("✅ 搜索过期丢弃测试通过！");
    }

    /// 测试搜索失败时记录错误
    #[test]
    fn test_search_error_recorded() {
        println!("\n========== 测试搜索错误记录 ==========");
        let mut session = SearchSession::new();
        let ticket = session.begin_search("한덕수".to_string());
        assert!(session.apply_results(
            ticket.token,
            Err(ApiError::Http {
                status: 502,
                message: None,
            })
        ));
        assert!(session.error().unwrap().contains("502"));
        assert!(session.results().is_none());
        println!("✅ 搜索错误记录测试通过！");
    }

    /// 测试分页窗口的四种形态
    #[test]
    fn test_page_window() {
        println!("\n========== 测试分页窗口 ==========");
        use PageItem::*;

        assert_eq!(
            page_window(12, 1),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(12)]
        );
        assert_eq!(
            page_window(12, 12),
            vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Page(12)]
        );
        assert_eq!(
            page_window(12, 6),
            vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Ellipsis, Page(12)]
        );
        assert_eq!(page_window(3, 2), vec![Page(1), Page(2), Page(3)]);
        println!("✅ 分页窗口测试通过！");
    }
}
