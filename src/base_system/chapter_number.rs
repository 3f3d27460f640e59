//! 章节号解析与规范化。
//!
//! 章节号可能是 `12`、`12.0` 或 `12.5`；整数值统一按整数显示。

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterNumber(f64);

impl ChapterNumber {
    pub const ZERO: ChapterNumber = ChapterNumber(0.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_whole(self) -> bool {
        self.0.fract() == 0.0
    }

    pub fn next(self) -> Self {
        Self(self.0.floor() + 1.0)
    }
}

impl Eq for ChapterNumber {}

impl PartialOrd for ChapterNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChapterNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for ChapterNumber {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse()?;
        Ok(Self(value))
    }
}

impl From<u32> for ChapterNumber {
    fn from(value: u32) -> Self {
        Self(value as f64)
    }
}

pub fn is_float(text: &str) -> bool {
    text.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// 把 `"7"`、`"7.0"` 规范成整数章节号；其余数字保持小数；非数字返回 `None`。
pub fn remove_trailing_zeros_if_zero(text: &str) -> Option<ChapterNumber> {
    if !is_float(text) {
        return None;
    }
    let text = text.trim();
    let value: f64 = text.parse().ok()?;
    if !text.contains('.') || text.ends_with(".0") {
        Some(ChapterNumber(value.trunc()))
    } else {
        Some(ChapterNumber(value))
    }
}
