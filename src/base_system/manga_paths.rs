//! 漫画保存目录与章节文件路径。

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::chapter_number::{ChapterNumber, remove_trailing_zeros_if_zero};
use crate::base_system::context::Config;

const NASTY_CHARS: &[char] = &[':', '\\', '/', '|', '*', '"', '>', '<', '?', '.', ','];

static RE_CHAPTER_FILE: OnceLock<Regex> = OnceLock::new();

fn re_chapter_file() -> &'static Regex {
    RE_CHAPTER_FILE
        .get_or_init(|| Regex::new(r"(?i)(?:^|\s)(\S+)\.pdf$").expect("compile RE_CHAPTER_FILE"))
}

/// 去掉路径片段中不允许出现的字符。
pub fn remove_nasty_chars(name: &str) -> String {
    name.chars().filter(|c| !NASTY_CHARS.contains(c)).collect()
}

pub fn manga_dir(config: &Config, title: &str) -> PathBuf {
    config.manga_save_dir().join(remove_nasty_chars(title))
}

pub fn chapter_file_name(title: &str, chapter: ChapterNumber) -> String {
    format!("{} Chapter {}.pdf", remove_nasty_chars(title), chapter)
}

/// `<save_dir>/<title>/<title> Chapter <n>.pdf`
pub fn chapter_save_location(config: &Config, title: &str, chapter: ChapterNumber) -> PathBuf {
    manga_dir(config, title).join(chapter_file_name(title, chapter))
}

/// 从文件名中取出章节号，例如 `One Piece Chapter 1001.pdf` -> 1001。
pub fn chapter_from_file_name(file_name: &str) -> Option<ChapterNumber> {
    let caps = re_chapter_file().captures(file_name.trim())?;
    remove_trailing_zeros_if_zero(caps.get(1)?.as_str())
}

/// 已离线保存的最新章节号；目录不存在或没有章节文件时为 0。
pub fn latest_offline_chapter(config: &Config, title: &str) -> ChapterNumber {
    let dir = manga_dir(config, title);
    let Ok(entries) = fs::read_dir(&dir) else {
        debug!(target: "library", "离线目录不存在: {}", dir.display());
        return ChapterNumber::ZERO;
    };

    entries
        .filter_map(Result::ok)
        .filter_map(|entry| chapter_from_file_name(&entry.file_name().to_string_lossy()))
        .max()
        .unwrap_or(ChapterNumber::ZERO)
}
