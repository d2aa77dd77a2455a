//! 趋势仪表盘客户端
//!
//! 拉取热门关键词排行、新闻搜索与数据报告,在终端内交互浏览。
//! 排名计算、打分、全文搜索、关键词关联全部由后端服务完成,
//! 本客户端只负责请求、整形、分页和渲染。

mod app;        // 终端交互层
mod config;     // 配置
mod detail;     // 详情增量加载
mod models;     // 数据模型定义
mod reconcile;  // 排行调和
mod services;   // API 客户端
mod session;    // 搜索会话控制器
mod state;      // 视图状态容器

use anyhow::Context;
use env_logger::Env;

use crate::config::AppConfig;

/// 应用程序入口
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统,默认日志级别为 info
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();
    // 生产环境下 Base URL 缺失或指向回环地址时快速失败
    config.validate().context("配置校验失败")?;

    log::info!("启动趋势仪表盘客户端 (环境: {})", config.environment);

    let mut app = app::App::new(&config);
    app.run().await
}
