//! 书架页面：排序下拉框 + 漫画列表。

use super::*;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::{List, ListItem};

use crate::base_system::opener::{open_in_browser, open_manga_in_explorer};
use crate::library::models::Manga;
use crate::network_parser::network::search_url;
use crate::ui::widgets::DropdownOutcome;

pub(super) fn draw_library(frame: &mut ratatui::Frame, app: &mut App) {
    let (main, log_area) = split_with_log(frame.size());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(main);
    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(24)])
        .split(rows[0]);

    let scanning = if app.scan_done.is_complete() {
        ""
    } else {
        "  (扫描中)"
    };
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Manga Web Scrapper",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  共 {} 部{}", app.store.manga().len(), scanning)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, header[0]);

    let list_style = if app.focus == Focus::List {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let items: Vec<ListItem> = app.store.manga().iter().map(manga_line).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(list_style)
                .title(format!("书架 · {}", app.sort_key.label())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, rows[1], &mut app.list_state);

    let status = Paragraph::new(app.status.as_str())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("状态"));
    frame.render_widget(status, rows[2]);

    render_log_box(frame, log_area, app);

    // 最后绘制，展开的选项列表需要覆盖在书架之上
    let focused = app.focus == Focus::Sort;
    app.sort.widget_mut().render(frame, header[1], focused);
}

fn manga_line(manga: &Manga) -> ListItem<'static> {
    let offline = manga
        .offline_chapter
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let unread = manga.chapters_available();
    let unread_style = if unread > 0.0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    ListItem::new(Line::from(vec![
        Span::raw(manga.title.clone()),
        Span::raw(format!(
            "  已读 {}/{}",
            manga.chapters_read, manga.latest_chapter
        )),
        Span::styled(format!("  未读 {}", unread), unread_style),
        Span::styled(
            format!("  本地 {}", offline),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

pub(super) fn handle_event_library(app: &mut App, event: Event) -> Result<()> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        _ => Ok(()),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.code == KeyCode::Tab && !app.sort.widget().is_open() {
        app.focus = match app.focus {
            Focus::Sort => Focus::List,
            Focus::List => Focus::Sort,
        };
        return Ok(());
    }

    if app.focus == Focus::Sort {
        match app.sort.handle_key(key) {
            Ok(DropdownOutcome::Ignored) => {}
            Ok(_) => return Ok(()),
            Err(err) => {
                warn!(target: "select_control", "排序选择异常: {err}");
                app.status = format!("排序选择异常: {err}");
                return Ok(());
            }
        }
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up if app.focus == Focus::List => app.select_prev(),
        KeyCode::Down if app.focus == Focus::List => app.select_next(),
        KeyCode::Char('o') => open_selected_folder(app),
        KeyCode::Char('b') => open_selected_url(app),
        KeyCode::Char('+') => mark_next_chapter_read(app),
        _ => {}
    }
    Ok(())
}

fn selected_manga(app: &App) -> Option<&Manga> {
    app.list_state
        .selected()
        .and_then(|idx| app.store.manga().get(idx))
}

fn open_selected_folder(app: &mut App) {
    let Some(title) = selected_manga(app).map(|m| m.title.clone()) else {
        return;
    };
    app.status = match open_manga_in_explorer(&app.config, &title) {
        Ok(()) => format!("已打开目录: {title}"),
        Err(err) => format!("打开目录失败: {err}"),
    };
    restore_terminal_modes();
}

fn open_selected_url(app: &mut App) {
    let Some(manga) = selected_manga(app) else {
        return;
    };
    // 没有记录地址时退回到站点搜索页
    let url = if manga.url.trim().is_empty() {
        search_url(&app.config.search_url, &manga.title)
    } else {
        manga.url.clone()
    };
    app.status = match open_in_browser(&url) {
        Ok(()) => format!("已尝试在浏览器打开: {url}"),
        Err(err) => format!("打开浏览器失败: {err}"),
    };
    restore_terminal_modes();
}

/// 外部程序可能改动控制台模式，重新进入 raw mode。
fn restore_terminal_modes() {
    if crossterm::terminal::is_raw_mode_enabled().unwrap_or(false) {
        let _ = enable_raw_mode();
        let _ = execute!(std::io::stdout(), EnableMouseCapture);
    }
}

fn mark_next_chapter_read(app: &mut App) {
    let Some((id, title, next)) =
        selected_manga(app).map(|m| (m.id, m.title.clone(), m.chapters_read.next()))
    else {
        return;
    };

    let result = app
        .store
        .mark_read(id, next)
        .and_then(|_| app.store.save());
    app.status = match result {
        Ok(()) => {
            let read = app
                .store
                .manga()
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.chapters_read)
                .unwrap_or(next);
            format!("{title} 已读至第 {read} 话")
        }
        Err(err) => {
            warn!(target: "library", "保存阅读进度失败: {err}");
            format!("保存阅读进度失败: {err}")
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use serde_json::json;
    use std::sync::mpsc::TryRecvError;

    fn press(app: &mut App, code: KeyCode) {
        handle_event_library(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE))).unwrap();
    }

    fn titles(app: &App) -> Vec<&str> {
        app.store.manga().iter().map(|m| m.title.as_str()).collect()
    }

    fn test_app(dir: &std::path::Path) -> App {
        let config = Config::default().with_data_dir(Some(dir));
        let mut store = LibraryStore::load(&config.library_path()).unwrap();
        for (title, latest, read) in [("Vinland Saga", 210, 200), ("Berserk", 375, 375), ("Akira", 120, 10)] {
            let values = json!({
                "title": title,
                "url": format!("https://example.org/{title}"),
                "latest_chapter": latest,
                "chapters_read": read,
            });
            store.insert(values.as_object().cloned().unwrap()).unwrap();
        }
        App::new(config, store).unwrap()
    }

    #[test]
    fn starts_sorted_by_first_option() {
        let tmp = tempfile::tempdir().unwrap();
        let app = test_app(tmp.path());
        assert_eq!(titles(&app), ["Akira", "Berserk", "Vinland Saga"]);
        assert_eq!(app.sort.selected_value(), SortKey::Title.label());
        assert!(matches!(app.worker_rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn sort_change_notifies_once_per_distinct_choice() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = test_app(tmp.path());

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.worker_rx.try_recv(), Ok(WorkerMsg::SortChanged)));
        app.apply_sort();
        assert_eq!(app.sort_key, SortKey::LatestChapter);
        assert_eq!(titles(&app), ["Berserk", "Vinland Saga", "Akira"]);

        // 重新确认同一选项不会再次通知
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.worker_rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn selection_follows_manga_across_resort() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = test_app(tmp.path());
        press(&mut app, KeyCode::Down);
        assert_eq!(selected_manga(&app).unwrap().title, "Berserk");

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        poll_worker(&mut app);
        assert_eq!(app.sort_key, SortKey::ChaptersAvailable);
        assert_eq!(titles(&app), ["Akira", "Vinland Saga", "Berserk"]);
        assert_eq!(selected_manga(&app).unwrap().title, "Berserk");
    }

    #[test]
    fn q_is_swallowed_while_dropdown_open() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = test_app(tmp.path());
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn plus_marks_next_chapter_and_saves() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = test_app(tmp.path());
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.store.manga()[0].chapters_read, ChapterNumber::from(11));

        let reloaded = LibraryStore::load(&app.config.library_path()).unwrap();
        let akira = reloaded.find_by_title("Akira").unwrap();
        assert_eq!(akira.chapters_read, ChapterNumber::from(11));
    }

    #[test]
    fn scan_fills_offline_chapters() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = test_app(tmp.path());
        let dir = crate::base_system::manga_paths::manga_dir(&app.config, "Akira");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Akira Chapter 42.0.pdf"), b"").unwrap();

        start_offline_scan(&mut app);
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !app.status.contains("扫描完成") && std::time::Instant::now() < deadline {
            poll_worker(&mut app);
            thread::sleep(Duration::from_millis(10));
        }

        assert!(app.scan_done.is_complete());
        let akira = app.store.find_by_title("Akira").unwrap();
        assert_eq!(akira.offline_chapter, Some(ChapterNumber::from(42)));
        let berserk = app.store.find_by_title("Berserk").unwrap();
        assert_eq!(berserk.offline_chapter, Some(ChapterNumber::ZERO));
    }

    #[test]
    fn draws_library_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = test_app(tmp.path());
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw_library(f, &mut app)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Manga Web Scrapper"));
        assert!(text.contains("Akira"));
        assert!(text.contains("Vinland Saga"));
    }
}
