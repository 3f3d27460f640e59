//! Manga Web Scrapper：漫画书架与阅读进度终端工具。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志/路径/章节号等基础设施
//! - `library`：书架记录、排序与本地存储
//! - `network_parser`：页面请求与远程文件下载
//! - `media`：章节图片处理
//! - `ui`：可复用控件（`SelectControl` 下拉框）与书架 TUI

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

mod base_system;
mod library;
mod media;
mod network_parser;
mod ui;

use base_system::config::load_or_create;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use library::store::LibraryStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "manga-web-scrapper")]
#[command(about = "Manga Web Scrapper (Rust TUI)")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,

    /// 数据目录路径（存放 config.yml、书架文件、logs 与下载的漫画）
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("Manga Web Scrapper v{}", VERSION);
        return Ok(());
    }

    let data_dir = cli.data_dir.as_deref();
    let _log = init_logging(cli.debug, data_dir)?;
    info!(target: "startup", "当前版本: v{}", VERSION);

    let config = load_or_create::<Config>(data_dir)
        .context("load config")?
        .with_data_dir(data_dir);
    let store = LibraryStore::load(&config.library_path()).context("load library")?;
    info!(
        target: "startup",
        "书架文件: {}（{} 部）",
        config.library_path().display(),
        store.manga().len()
    );

    ui::tui::run(config, store)
}

fn init_logging(debug: bool, base_dir: Option<&std::path::Path>) -> Result<LogSystem> {
    let opts = LogOptions {
        debug,
        use_color: true,
        archive_on_exit: true,
        console: false,
        broadcast_to_ui: true,
    };
    LogSystem::init_with_base(opts, base_dir).map_err(|e| anyhow!(e))
}
