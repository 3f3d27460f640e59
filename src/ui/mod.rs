//! 交互层入口。
//!
//! `widgets` 为与具体界面无关的可复用控件，`tui` 为书架终端界面。

pub mod tui;
pub mod widgets;
