//! TUI 下拉框：`SelectionWidget` 的 ratatui 实现。

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

use super::select_control::{SelectControl, SelectError, SelectionWidget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownOutcome {
    /// 按键与下拉框无关
    Ignored,
    /// 按键被消费（展开/收起/移动高亮）
    Consumed,
    /// 用户确认了一个选项（值可能与之前相同）
    Committed,
    /// 确认后值发生了变化且回调已执行；只由 `SelectControl` 产生
    Changed,
}

#[derive(Debug, Clone)]
pub struct Dropdown {
    title: String,
    options: Vec<String>,
    displayed: Option<usize>,
    open: bool,
    list_state: ListState,
}

impl Dropdown {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            options: Vec::new(),
            displayed: None,
            open: false,
            list_state: ListState::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DropdownOutcome {
        if key.kind != KeyEventKind::Press || self.options.is_empty() {
            return DropdownOutcome::Ignored;
        }

        if !self.open {
            return match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.open = true;
                    self.list_state.select(self.displayed.or(Some(0)));
                    DropdownOutcome::Consumed
                }
                _ => DropdownOutcome::Ignored,
            };
        }

        match key.code {
            KeyCode::Up => {
                let prev = match self.list_state.selected() {
                    Some(0) | None => self.options.len() - 1,
                    Some(idx) => idx - 1,
                };
                self.list_state.select(Some(prev));
                DropdownOutcome::Consumed
            }
            KeyCode::Down => {
                let next = match self.list_state.selected() {
                    Some(idx) if idx + 1 < self.options.len() => idx + 1,
                    _ => 0,
                };
                self.list_state.select(Some(next));
                DropdownOutcome::Consumed
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.open = false;
                if let Some(idx) = self.list_state.selected() {
                    self.displayed = Some(idx);
                }
                DropdownOutcome::Committed
            }
            KeyCode::Esc => {
                self.open = false;
                self.list_state.select(self.displayed);
                DropdownOutcome::Consumed
            }
            // 展开时吞掉其余按键，避免误触发列表快捷键
            _ => DropdownOutcome::Consumed,
        }
    }

    /// 绘制收起状态；展开时在 `area` 下方叠加选项列表。
    pub fn render(&mut self, frame: &mut ratatui::Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let value = self.displayed_value().unwrap_or("-").to_string();
        let arrow = if self.open { "▲" } else { "▼" };
        let line = Line::from(vec![
            Span::raw(value),
            Span::raw(" "),
            Span::styled(arrow, Style::default().fg(Color::DarkGray)),
        ]);
        let para = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(self.title.as_str()),
        );
        frame.render_widget(para, area);

        if !self.open {
            return;
        }

        let screen = frame.size();
        let top = area.y.saturating_add(area.height);
        let wanted = self.options.len() as u16 + 2;
        let height = wanted.min(screen.height.saturating_sub(top));
        if height < 3 {
            return;
        }
        let popup = Rect {
            x: area.x,
            y: top,
            width: area.width,
            height,
        };

        let items: Vec<ListItem> = self
            .options
            .iter()
            .map(|o| ListItem::new(o.as_str()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_widget(Clear, popup);
        frame.render_stateful_widget(list, popup, &mut self.list_state);
    }
}

impl SelectionWidget for Dropdown {
    fn set_options(&mut self, options: &[String]) {
        self.options = options.to_vec();
        self.displayed = None;
        self.list_state.select(None);
    }

    fn displayed_value(&self) -> Option<&str> {
        self.displayed
            .and_then(|idx| self.options.get(idx))
            .map(String::as_str)
    }

    fn show_index(&mut self, index: usize) {
        if index < self.options.len() {
            self.displayed = Some(index);
            self.list_state.select(Some(index));
        }
    }
}

impl SelectControl<Dropdown> {
    /// 把按键交给下拉框；确认选项时走一次选择事件处理。
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<DropdownOutcome, SelectError> {
        match self.widget_mut().handle_key(key) {
            DropdownOutcome::Committed => {
                if self.handle_selection_event()? {
                    Ok(DropdownOutcome::Changed)
                } else {
                    Ok(DropdownOutcome::Committed)
                }
            }
            other => Ok(other),
        }
    }
}
