//! 去重回调的单选下拉控件。
//!
//! `SelectControl` 不继承任何具体 UI 组件，而是通过 [`SelectionWidget`] 包装宿主框架的
//! 原生选择器：宿主在用户每次选中选项时调用 [`SelectControl::handle_selection_event`]，
//! 控件只在“显示值”与上一次通知的值不同时调用一次回调。

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("invalid select configuration: {0}")]
    InvalidConfiguration(String),
    #[error("displayed value not in options: {0:?}")]
    NotFound(Option<String>),
}

/// 宿主框架选择器需要提供的最小能力。
pub trait SelectionWidget {
    /// 用给定选项填充选择器。只在构造时调用一次。
    fn set_options(&mut self, options: &[String]);

    /// 当前显示的值；没有任何显示值时返回 `None`。
    fn displayed_value(&self) -> Option<&str>;

    /// 让选择器显示第 `index` 个选项（不会产生选择事件）。
    fn show_index(&mut self, index: usize);
}

pub struct SelectControl<W: SelectionWidget> {
    widget: W,
    options: Vec<String>,
    selected_index: usize,
    last_notified: String,
    on_change: Box<dyn FnMut()>,
}

impl<W: SelectionWidget> SelectControl<W> {
    /// 构造控件并选中第一个选项。构造过程不会触发回调。
    pub fn new<I, S, F>(mut widget: W, options: I, on_change: F) -> Result<Self, SelectError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut() + 'static,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let Some(first) = options.first().cloned() else {
            return Err(SelectError::InvalidConfiguration(
                "options cannot be empty".to_string(),
            ));
        };
        for (idx, opt) in options.iter().enumerate() {
            if options[..idx].contains(opt) {
                return Err(SelectError::InvalidConfiguration(format!(
                    "duplicate option {opt:?}"
                )));
            }
        }

        widget.set_options(&options);
        widget.show_index(0);

        Ok(Self {
            widget,
            options,
            selected_index: 0,
            last_notified: first,
            on_change: Box::new(on_change),
        })
    }

    /// 处理一次选择事件，返回是否调用了回调。
    ///
    /// 同一个值被重复选中（包括框架重复派发同一事件）时不会再次通知。
    pub fn handle_selection_event(&mut self) -> Result<bool, SelectError> {
        let Some(value) = self.widget.displayed_value() else {
            return Ok(false);
        };
        if value == self.last_notified {
            return Ok(false);
        }

        let Some(idx) = self.options.iter().position(|o| o == value) else {
            return Err(SelectError::NotFound(Some(value.to_string())));
        };

        self.last_notified = self.options[idx].clone();
        self.selected_index = idx;
        debug!(target: "select_control", "选项变更: {} (#{})", self.last_notified, idx);
        (self.on_change)();
        Ok(true)
    }

    /// 当前显示值在选项中的下标。
    pub fn current_index(&self) -> Result<usize, SelectError> {
        let displayed = self.widget.displayed_value();
        displayed
            .and_then(|v| self.options.iter().position(|o| o == v))
            .ok_or_else(|| SelectError::NotFound(displayed.map(str::to_string)))
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected_value(&self) -> &str {
        &self.last_notified
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// 只记录显示值的选择器，用来模拟宿主框架派发的事件。
    #[derive(Default)]
    struct FakeWidget {
        options: Vec<String>,
        displayed: Option<String>,
    }

    impl FakeWidget {
        fn pick(&mut self, index: usize) {
            self.displayed = self.options.get(index).cloned();
        }

        fn force_display(&mut self, value: &str) {
            self.displayed = Some(value.to_string());
        }
    }

    impl SelectionWidget for FakeWidget {
        fn set_options(&mut self, options: &[String]) {
            self.options = options.to_vec();
        }

        fn displayed_value(&self) -> Option<&str> {
            self.displayed.as_deref()
        }

        fn show_index(&mut self, index: usize) {
            self.pick(index);
        }
    }

    fn counting_control(options: &[&str]) -> (SelectControl<FakeWidget>, Rc<Cell<usize>>) {
        let fired = Rc::new(Cell::new(0));
        let sink = Rc::clone(&fired);
        let control = SelectControl::new(FakeWidget::default(), options.iter().copied(), move || {
            sink.set(sink.get() + 1);
        })
        .expect("non-empty options");
        (control, fired)
    }

    fn select(control: &mut SelectControl<FakeWidget>, index: usize) -> bool {
        control.widget_mut().pick(index);
        control.handle_selection_event().expect("value in options")
    }

    #[test]
    fn construction_never_fires() {
        let (control, seen) = counting_control(&["A", "B", "C"]);
        assert_eq!(seen.get(), 0);
        assert_eq!(control.selected_value(), "A");
        assert_eq!(control.current_index(), Ok(0));
    }

    #[test]
    fn empty_options_rejected() {
        let result = SelectControl::new(FakeWidget::default(), Vec::<String>::new(), || {});
        assert!(matches!(result, Err(SelectError::InvalidConfiguration(_))));
    }

    #[test]
    fn duplicate_options_rejected() {
        let result = SelectControl::new(FakeWidget::default(), ["A", "B", "A"], || {});
        assert!(matches!(result, Err(SelectError::InvalidConfiguration(_))));
    }

    #[test]
    fn repeated_selection_fires_once() {
        let (mut control, seen) = counting_control(&["A", "B", "C"]);
        assert!(select(&mut control, 1));
        for _ in 0..5 {
            assert!(!select(&mut control, 1));
        }
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn reselecting_initial_value_is_silent() {
        let (mut control, seen) = counting_control(&["A", "B"]);
        assert!(!select(&mut control, 0));
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn distinct_changes_fire_in_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let widget_values = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&order);
        let current = Rc::clone(&widget_values);
        let mut control =
            SelectControl::new(FakeWidget::default(), ["A", "B", "C", "D"], move || {
                sink.borrow_mut().push(current.borrow().clone());
            })
            .unwrap();

        for idx in [1, 2, 0, 3, 2] {
            *widget_values.borrow_mut() = control.options()[idx].clone();
            assert!(select(&mut control, idx));
        }
        assert_eq!(*order.borrow(), vec!["B", "C", "A", "D", "C"]);
    }

    #[test]
    fn returning_to_previous_value_notifies_again() {
        let (mut control, seen) = counting_control(&["A", "B"]);
        assert!(select(&mut control, 1));
        assert!(select(&mut control, 0));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn abc_scenario() {
        let (mut control, seen) = counting_control(&["A", "B", "C"]);
        assert_eq!(seen.get(), 0);

        select(&mut control, 1);
        assert_eq!(seen.get(), 1);
        assert_eq!(control.current_index(), Ok(1));

        select(&mut control, 1);
        assert_eq!(seen.get(), 1);

        select(&mut control, 2);
        assert_eq!(seen.get(), 2);
        assert_eq!(control.current_index(), Ok(2));
        assert_eq!(control.selected_index(), 2);
        assert_eq!(control.selected_value(), "C");
    }

    #[test]
    fn current_index_matches_last_notified_when_settled() {
        let (mut control, _) = counting_control(&["x", "y", "z"]);
        for idx in [2, 2, 0, 1, 1] {
            select(&mut control, idx);
            let i = control.current_index().unwrap();
            assert_eq!(control.options()[i], control.selected_value());
        }
    }

    #[test]
    fn unknown_displayed_value_is_not_found() {
        let (mut control, seen) = counting_control(&["A", "B"]);
        control.widget_mut().force_display("Z");
        assert_eq!(
            control.current_index(),
            Err(SelectError::NotFound(Some("Z".to_string())))
        );
        assert_eq!(
            control.handle_selection_event(),
            Err(SelectError::NotFound(Some("Z".to_string())))
        );
        assert_eq!(seen.get(), 0);
        assert_eq!(control.selected_value(), "A");
    }
}
