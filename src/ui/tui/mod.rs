//! 书架 TUI。

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, ListState, Paragraph, Wrap};
use tracing::{info, warn};

mod library;

use crate::base_system::chapter_number::ChapterNumber;
use crate::base_system::completion::Completion;
use crate::base_system::context::Config;
use crate::base_system::logging::take_broadcast_rx;
use crate::base_system::manga_paths::latest_offline_chapter;
use crate::library::sorting::SortKey;
use crate::library::store::LibraryStore;
use crate::ui::widgets::{Dropdown, SelectControl};

const LOG_HEIGHT: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sort,
    List,
}

#[derive(Debug)]
enum WorkerMsg {
    SortChanged,
    OfflineChapter { id: u64, chapter: ChapterNumber },
    ScanFinished,
}

pub(super) struct App {
    config: Config,
    store: LibraryStore,
    sort: SelectControl<Dropdown>,
    sort_key: SortKey,
    focus: Focus,
    list_state: ListState,
    status: String,
    logs: Vec<String>,
    should_quit: bool,

    // worker
    worker_tx: Sender<WorkerMsg>,
    worker_rx: Receiver<WorkerMsg>,
    scan_done: Completion,

    // log
    log_rx: Option<crossbeam_channel::Receiver<String>>,
}

impl App {
    fn new(config: Config, store: LibraryStore) -> Result<Self> {
        let (worker_tx, worker_rx) = mpsc::channel();

        let sort_tx = worker_tx.clone();
        let sort = SelectControl::new(Dropdown::new("排序"), SortKey::labels(), move || {
            let _ = sort_tx.send(WorkerMsg::SortChanged);
        })
        .context("init sort selector")?;

        let mut list_state = ListState::default();
        if !store.manga().is_empty() {
            list_state.select(Some(0));
        }

        let mut app = Self {
            config,
            store,
            sort,
            sort_key: SortKey::ALL[0],
            focus: Focus::List,
            list_state,
            status: "Tab 切换焦点，Enter 展开排序，o 打开目录，b 打开网页，+ 标记已读，q 退出"
                .to_string(),
            logs: Vec::new(),
            should_quit: false,
            worker_tx,
            worker_rx,
            scan_done: Completion::new(),
            log_rx: take_broadcast_rx(),
        };
        app.sort_key.sort(app.store.manga_mut());
        Ok(app)
    }

    fn push_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.logs.push(msg.trim_end_matches(['\r', '\n']).to_string());
        if self.logs.len() > 200 {
            let overflow = self.logs.len() - 200;
            self.logs.drain(0..overflow);
        }
    }

    fn select_next(&mut self) {
        let len = self.store.manga().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let next = match self.list_state.selected() {
            Some(idx) if idx + 1 < len => idx + 1,
            _ => 0,
        };
        self.list_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        let len = self.store.manga().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let prev = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        };
        self.list_state.select(Some(prev));
    }

    fn selected_id(&self) -> Option<u64> {
        self.list_state
            .selected()
            .and_then(|idx| self.store.manga().get(idx))
            .map(|m| m.id)
    }

    /// 按下拉框当前选项重排，保持原先选中的那一部。
    fn apply_sort(&mut self) {
        let Some(key) = SortKey::from_index(self.sort.selected_index()) else {
            return;
        };
        let keep = self.selected_id();
        self.sort_key = key;
        key.sort(self.store.manga_mut());
        if let Some(id) = keep {
            let idx = self.store.manga().iter().position(|m| m.id == id);
            self.list_state.select(idx);
        }
        info!(target: "library", "书架排序: {}", key.label());
        self.status = format!("已切换排序: {}", key.label());
    }
}

pub fn run(config: Config, store: LibraryStore) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("init terminal")?;

    let result = run_loop(&mut terminal, config, store);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .ok();
    terminal.show_cursor().ok();

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    config: Config,
    store: LibraryStore,
) -> Result<()> {
    let mut app = App::new(config, store)?;
    start_offline_scan(&mut app);

    while !app.should_quit {
        poll_worker(&mut app);
        drain_log_channel(&mut app);

        terminal.draw(|f| library::draw_library(f, &mut app))?;

        if !event::poll(Duration::from_millis(200)).context("poll event")? {
            continue;
        }
        let evt = event::read().context("read event")?;
        library::handle_event_library(&mut app, evt)?;
    }

    Ok(())
}

/// 后台扫描每部漫画的本地最新章节。
fn start_offline_scan(app: &mut App) {
    let titles: Vec<(u64, String)> = app
        .store
        .manga()
        .iter()
        .map(|m| (m.id, m.title.clone()))
        .collect();
    let config = app.config.clone();
    let tx = app.worker_tx.clone();
    let done = app.scan_done.clone();

    let finished_tx = app.worker_tx.clone();
    app.scan_done.on_complete(move || {
        let _ = finished_tx.send(WorkerMsg::ScanFinished);
    });

    app.status = "正在扫描本地章节...".to_string();
    let spawned = thread::Builder::new()
        .name("offline-scan".to_string())
        .spawn(move || {
            for (id, title) in titles {
                let chapter = latest_offline_chapter(&config, &title);
                if tx.send(WorkerMsg::OfflineChapter { id, chapter }).is_err() {
                    break;
                }
            }
            done.complete();
        });
    if let Err(err) = spawned {
        warn!(target: "library", "无法启动扫描线程: {err}");
        app.scan_done.complete();
    }
}

fn poll_worker(app: &mut App) {
    while let Ok(msg) = app.worker_rx.try_recv() {
        match msg {
            WorkerMsg::SortChanged => app.apply_sort(),
            WorkerMsg::OfflineChapter { id, chapter } => {
                if let Some(m) = app.store.manga_mut().iter_mut().find(|m| m.id == id) {
                    m.offline_chapter = Some(chapter);
                }
            }
            WorkerMsg::ScanFinished => {
                let total = app.store.manga().len();
                info!(target: "library", "本地章节扫描完成，共 {} 部", total);
                app.status = format!("本地章节扫描完成（{total} 部）");
            }
        }
    }
}

fn drain_log_channel(app: &mut App) {
    let Some(rx) = app.log_rx.clone() else {
        return;
    };
    for line in rx.try_iter() {
        app.push_log(line);
    }
}

fn split_with_log(area: Rect) -> (Rect, Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(LOG_HEIGHT)])
        .split(area);
    (layout[0], layout[1])
}

fn render_log_box(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2).max(1) as usize;
    let lines: Vec<Line> = if app.logs.is_empty() {
        vec![Line::from("日志: 暂无")]
    } else {
        let skip = app.logs.len().saturating_sub(visible);
        app.logs[skip..].iter().map(|l| style_log_line(l)).collect()
    };

    let log = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("日志"));
    frame.render_widget(log, area);
}

/// 日志行格式为 `时间 级别 目标: 消息`，按级别着色。
fn style_log_line(line: &str) -> Line<'static> {
    let mut parts = line.split_whitespace();
    let ts = parts.next().unwrap_or("");
    let level = parts.next().unwrap_or("").to_ascii_uppercase();
    let rest = parts.collect::<Vec<_>>().join(" ");

    let color = match level.as_str() {
        "ERROR" => Color::Red,
        "WARN" => Color::Yellow,
        "INFO" => Color::Cyan,
        _ => Color::Gray,
    };

    let mut spans = vec![Span::styled(
        ts.to_string(),
        Style::default().fg(Color::DarkGray),
    )];
    if !level.is_empty() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            level,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    if !rest.is_empty() {
        spans.push(Span::raw(" "));
        spans.push(Span::raw(rest));
    }
    Line::from(spans)
}
