//! 用系统默认程序打开目录或链接。

use std::io;
use std::ffi::OsStr;
use std::process::Command;

use tracing::info;

use super::context::Config;
use super::manga_paths::manga_dir;

fn spawn_opener(target: &OsStr) -> io::Result<()> {
    if cfg!(target_os = "windows") {
        // 不经过 cmd.exe，避免改动控制台模式
        Command::new("explorer").arg(target).spawn()?;
        return Ok(());
    }
    if cfg!(target_os = "macos") {
        Command::new("open").arg(target).spawn()?;
        return Ok(());
    }
    Command::new("xdg-open").arg(target).spawn()?;
    Ok(())
}

/// 在文件管理器中打开漫画的保存目录。
pub fn open_manga_in_explorer(config: &Config, title: &str) -> io::Result<()> {
    let dir = manga_dir(config, title);
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("目录不存在: {}", dir.display()),
        ));
    }
    info!(target: "library", "打开目录: {}", dir.display());
    spawn_opener(dir.as_os_str())
}

pub fn open_in_browser(url: &str) -> io::Result<()> {
    if url.trim().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "链接为空"));
    }
    info!(target: "library", "在浏览器打开: {url}");
    spawn_opener(OsStr::new(url))
}
