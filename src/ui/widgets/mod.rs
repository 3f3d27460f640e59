//! 可复用的交互控件。

pub mod dropdown;
pub mod select_control;

pub use dropdown::{Dropdown, DropdownOutcome};
pub use select_control::{SelectControl, SelectError, SelectionWidget};
