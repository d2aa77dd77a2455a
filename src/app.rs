//! 终端交互层(瘦视图胶水)
//!
//! 把用户命令翻译成状态容器和会话控制器的调用并渲染文本输出。
//! 不变式全部在被调用的模块里,这里只做编排和展示。

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::AppConfig;
use crate::detail;
use crate::models::{Category, KeywordData, TrendItem};
use crate::reconcile::search_query_for;
use crate::services::common::TIME_SERIES_LIMIT;
use crate::services::report_api::ReportApi;
use crate::services::search_api::SearchApi;
use crate::services::trend_api::TrendApi;
use crate::session::{
    page_window, PageItem, SearchSession, SearchTicket, SessionKey, SuggestionTicket,
    PAGE_SIZE, SUGGESTION_DEBOUNCE,
};
use crate::state::{ReportState, TrendState};

/// 应用:组合根持有全部客户端与视图状态
pub struct App {
    trend_api: TrendApi,
    search_api: SearchApi,
    report_api: ReportApi,
    trend: TrendState,
    report: ReportState,
    session: SearchSession,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            trend_api: TrendApi::new(config),
            search_api: SearchApi::new(config),
            report_api: ReportApi::new(config),
            trend: TrendState::new(),
            report: ReportState::new(),
            session: SearchSession::new(),
        }
    }

    /// 命令循环
    pub async fn run(&mut self) -> Result<()> {
        self.trend.load(&self.trend_api).await;
        self.render_trends();
        print_help();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (command, arg) = match line.split_once(' ') {
                Some((c, a)) => (c, a.trim()),
                None => (line, ""),
            };

            match command {
                "top" => {
                    self.session.reset();
                    self.render_trends();
                }
                "category" => self.change_category(arg),
                "open" => self.open_trend_item(arg).await,
                "input" => self.handle_input(arg).await,
                "down" => self.handle_key(SessionKey::ArrowDown).await,
                "up" => self.handle_key(SessionKey::ArrowUp).await,
                "enter" => self.handle_key(SessionKey::Enter).await,
                "esc" => self.handle_key(SessionKey::Escape).await,
                "pick" => self.pick_suggestion(arg).await,
                "search" => {
                    if arg.is_empty() {
                        println!("사용법: search <검색어>");
                    } else {
                        let ticket = self.session.begin_search(arg.to_string());
                        self.run_search(ticket).await;
                    }
                }
                "page" => self.change_page(arg).await,
                "report" => {
                    self.report.load(&self.report_api).await;
                    self.render_report();
                }
                "select" => self.select_report_keyword(arg).await,
                "find" => self.find_report_keyword(arg).await,
                "refresh" => {
                    self.report.refresh(&self.report_api).await;
                    self.render_report();
                    if self.report.selected().is_some() {
                        self.render_detail();
                    }
                }
                "help" => print_help(),
                "quit" | "exit" => break,
                _ => println!("알 수 없는 명령입니다: {} (help 입력)", command),
            }
        }

        Ok(())
    }

    // ==================== 趋势页 ====================

    fn change_category(&mut self, name: &str) {
        match Category::parse(name) {
            Some(category) => {
                self.trend.set_category(category);
                self.render_trends();
            }
            None => println!("지원하지 않는 카테고리입니다: {}", name),
        }
    }

    fn render_trends(&self) {
        println!("\n===== 트렌드 랭킹 ({}) =====", self.trend.category().0);
        if self.trend.loading() {
            println!("키워드 랭킹을 불러오는 중...");
            return;
        }
        if let Some(error) = self.trend.error() {
            println!("데이터를 불러올 수 없습니다: {}", error);
            return;
        }

        let items = self.trend.items();
        if items.is_empty() {
            println!("데이터가 없습니다.");
            return;
        }
        for item in &items {
            println!(
                "#{:<2} [{}] {} {}",
                item.rank,
                item.id,
                item.status.symbol(),
                item.keyword
            );
        }
        println!("(open <번호> 로 상세 보기)");
    }

    /// 打开趋势条目(详情 + 关联文章搜索第 1 页)
    async fn open_trend_item(&mut self, arg: &str) {
        let items = self.trend.items();
        let item = match arg.parse::<usize>().ok().and_then(|id| {
            items.iter().find(|i| i.id == id).cloned()
        }) {
            Some(item) => item,
            None => {
                println!("해당 번호의 키워드가 없습니다: {}", arg);
                return;
            }
        };

        render_trend_item(&item);

        // 详情里的关联文章搜索与搜索会话共用同一条执行路径
        let query = search_query_for(&item);
        let ticket = self.session.begin_search(query);
        self.run_search(ticket).await;
    }

    // ==================== 搜索会话 ====================

    /// 输入变化: 防抖后拉取建议,应用前核对票据
    async fn handle_input(&mut self, value: &str) {
        match self.session.set_input(value) {
            Some(ticket) => self.run_suggestions(ticket).await,
            None => println!("(제안이 지워졌습니다)"),
        }
    }

    async fn run_suggestions(&mut self, ticket: SuggestionTicket) {
        tokio::time::sleep(SUGGESTION_DEBOUNCE).await;
        let items = self.search_api.search_suggestions(&ticket.query).await;
        if self.session.apply_suggestions(ticket.token, items) {
            self.render_suggestions();
        }
    }

    async fn handle_key(&mut self, key: SessionKey) {
        match self.session.handle_key(key) {
            Some(ticket) => self.run_search(ticket).await,
            None => self.render_suggestions(),
        }
    }

    async fn pick_suggestion(&mut self, arg: &str) {
        let index = arg.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
        match index.and_then(|i| self.session.select_suggestion(i)) {
            Some(ticket) => self.run_search(ticket).await,
            None => println!("해당 번호의 제안이 없습니다: {}", arg),
        }
    }

    fn render_suggestions(&self) {
        if !self.session.panel_open() {
            return;
        }
        println!("\n----- 자동완성 -----");
        for (index, suggestion) in self.session.suggestions().iter().enumerate() {
            let marker = if self.session.cursor() == index as isize {
                ">"
            } else {
                " "
            };
            match suggestion.count {
                Some(count) => println!("{} {}. {} ({})", marker, index + 1, suggestion.keyword, count),
                None => println!("{} {}. {}", marker, index + 1, suggestion.keyword),
            }
        }
    }

    async fn run_search(&mut self, ticket: SearchTicket) {
        println!("검색 중...");
        let outcome = self
            .search_api
            .search_articles(&ticket.query, ticket.page, ticket.page_size)
            .await;
        if self.session.apply_results(ticket.token, outcome) {
            self.render_search_results();
        }
    }

    async fn change_page(&mut self, arg: &str) {
        let page = match arg.parse::<u32>() {
            Ok(page) => page,
            Err(_) => {
                println!("사용법: page <번호>");
                return;
            }
        };
        match self.session.goto_page(page) {
            Some(ticket) => self.run_search(ticket).await,
            None => self.render_search_results(),
        }
    }

    fn render_search_results(&self) {
        if let Some(error) = self.session.error() {
            println!("검색에 실패했습니다: {}", error);
            println!("(search <검색어> 로 다시 시도해보세요)");
            return;
        }
        let response = match self.session.results() {
            Some(r) => r,
            None => return,
        };

        println!("\n===== \"{}\" 검색 결과 =====", self.session.query());
        println!("총 {}개의 결과", response.total);
        if response.items.is_empty() {
            println!("\"{}\"에 대한 검색 결과가 없습니다.", self.session.query());
            println!("다른 키워드로 검색해보세요.");
            return;
        }

        for result in &response.items {
            println!("- {} ({} {})", result.title, result.press, result.pub_date);
            let description = crate::services::common::strip_html_tags(&result.description);
            if !description.is_empty() {
                println!("  {}", description);
            }
            println!("  {}", result.link);
        }

        let total_pages = response.total_pages();
        if total_pages > 1 {
            println!("{}", render_page_window(total_pages, self.session.page()));
        }
    }

    // ==================== 数据报告页 ====================

    fn render_report(&self) {
        println!("\n===== 데이터 리포트 =====");
        if let Some(updated) = self.report.last_updated() {
            println!("최종 업데이트: {}", updated.format("%H:%M"));
        }
        if self.report.loading() {
            println!("키워드 랭킹을 불러오는 중...");
            return;
        }
        if let Some(error) = self.report.error() {
            println!("데이터를 불러올 수 없습니다: {}", error);
            return;
        }
        if self.report.keywords().is_empty() {
            println!("데이터가 없습니다.");
            return;
        }

        for keyword in self.report.keywords() {
            println!(
                "#{:<2} {} {} {:+}%  Score: {:.1}",
                keyword.rank,
                keyword.status.symbol(),
                keyword.keyword,
                keyword.change,
                keyword.score
            );
        }
        println!("(select <순위> 또는 find <키워드>)");
    }

    /// 快路径: 摘要先渲染,切面合并后再渲染详情
    async fn select_report_keyword(&mut self, arg: &str) {
        let keyword = match arg.parse::<u32>().ok().and_then(|rank| {
            self.report
                .keywords()
                .iter()
                .find(|k| k.rank == rank)
                .cloned()
        }) {
            Some(k) => k,
            None => {
                println!("해당 순위의 키워드가 없습니다: {}", arg);
                return;
            }
        };

        render_keyword_summary(&keyword);
        self.report
            .select_from_ranking(&self.report_api, keyword)
            .await;
        self.render_detail();
    }

    /// 慢路径: 详情解析完成前保持加载提示
    async fn find_report_keyword(&mut self, arg: &str) {
        if arg.is_empty() {
            println!("사용법: find <키워드>");
            return;
        }
        println!("검색 중...");
        self.report.search(&self.report_api, arg).await;

        if self.report.not_found() {
            println!("\"{}\"에 대한 검색 결과가 없습니다.", arg);
            return;
        }
        self.render_detail();

        if !self.report.similar().is_empty() {
            println!("\n----- 유사 검색어 -----");
            for similar in self.report.similar() {
                println!("- {} (Score: {:.1})", similar.keyword, similar.score);
            }
        }
    }

    fn render_detail(&self) {
        let keyword = match self.report.selected() {
            Some(k) => k,
            None => return,
        };

        println!("\n===== #{} =====", keyword.keyword);
        println!(
            "Score: {:.1}  Rank: #{}  {} {:+}%",
            keyword.score,
            keyword.rank,
            keyword.status.symbol(),
            keyword.change
        );

        let points = detail::chart_points(keyword);
        let max = points.iter().map(|p| p.score).fold(0.0_f64, f64::max);
        println!("----- 시간대별 추이 (최근 {}건) -----", TIME_SERIES_LIMIT);
        for point in &points {
            let width = if max > 0.0 {
                ((point.score / max) * 30.0).round() as usize
            } else {
                0
            };
            println!("{:>6} | {} {:.1}", point.time, "#".repeat(width), point.score);
        }

        if !keyword.related_keywords.is_empty() {
            println!("----- 관련 키워드 -----");
            for related in &keyword.related_keywords {
                println!("- {}", related);
            }
        }
        if !keyword.articles.is_empty() {
            println!("----- 관련 기사 -----");
            for article in &keyword.articles {
                println!("- {} ({})", article.title, article.source);
                println!("  {}", article.url);
            }
        }
    }
}

// ==================== 渲染辅助 ====================

fn render_trend_item(item: &TrendItem) {
    println!("\n===== {} =====", item.keyword);
    println!("{}", item.description);
    if !item.articles.is_empty() {
        println!("----- 관련 뉴스 -----");
        for article in &item.articles {
            println!("- {} ({} · {})", article.title, article.source, article.date);
        }
    }
}

fn render_keyword_summary(keyword: &KeywordData) {
    println!(
        "\n#{} (Score: {:.1}, {:+}%) 상세 정보를 불러오는 중...",
        keyword.keyword, keyword.score, keyword.change
    );
}

/// 分页窗口渲染: 当前页加方括号,省略号原样
fn render_page_window(total_pages: u32, current: u32) -> String {
    let parts: Vec<String> = page_window(total_pages, current)
        .into_iter()
        .map(|item| match item {
            PageItem::Page(page) if page == current => format!("[{}]", page),
            PageItem::Page(page) => page.to_string(),
            PageItem::Ellipsis => "...".to_string(),
        })
        .collect();
    format!("페이지: {} (page <번호>, 페이지당 {}건)", parts.join(" "), PAGE_SIZE)
}

fn print_help() {
    println!("\n명령어:");
    println!("  top                트렌드 랭킹");
    println!("  category <이름>    카테고리 필터 (전체/기술/엔터/...)");
    println!("  open <번호>        트렌드 키워드 상세 + 관련 기사");
    println!("  input <텍스트>     검색어 입력 (자동완성)");
    println!("  down/up/enter/esc  자동완성 키보드 조작");
    println!("  pick <번호>        자동완성 항목 선택");
    println!("  search <검색어>    뉴스 기사 검색");
    println!("  page <번호>        검색 결과 페이지 이동");
    println!("  report             데이터 리포트 랭킹");
    println!("  select <순위>      리포트 키워드 상세");
    println!("  find <키워드>      리포트 키워드 검색");
    println!("  refresh            리포트 새로고침");
    println!("  quit               종료");
}

// ==================== 测试模块 ====================
