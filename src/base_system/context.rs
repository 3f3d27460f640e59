//! 全局配置结构（Config）与默认值。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::{ConfigSpec, FieldMeta};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 路径配置
    #[serde(default)]
    pub save_path: String,
    #[serde(default = "default_library_file")]
    pub library_file: String,

    // 网络配置
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(skip)]
    data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: String::new(),
            library_file: default_library_file(),
            search_url: default_search_url(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            data_dir: None,
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 5] = [
            FieldMeta {
                name: "save_path",
                description: "漫画保存路径（留空则为当前目录下的 Manga）",
            },
            FieldMeta {
                name: "library_file",
                description: "阅读进度记录文件（相对路径基于数据目录）",
            },
            FieldMeta {
                name: "search_url",
                description: "搜索地址前缀，书名中的空格会替换为下划线",
            },
            FieldMeta {
                name: "request_timeout",
                description: "请求超时时间（秒）",
            },
            FieldMeta {
                name: "user_agent",
                description: "请求使用的 User-Agent",
            },
        ];
        &FIELDS
    }
}

impl Config {
    pub fn with_data_dir(mut self, dir: Option<&Path>) -> Self {
        self.data_dir = dir.map(Path::to_path_buf);
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// 漫画根目录；每部漫画占用其下一个子目录。
    pub fn manga_save_dir(&self) -> PathBuf {
        if self.save_path.trim().is_empty() {
            self.data_dir().join("Manga")
        } else {
            PathBuf::from(&self.save_path)
        }
    }

    pub fn library_path(&self) -> PathBuf {
        let file = Path::new(&self.library_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir().join(file)
        }
    }
}

fn default_library_file() -> String {
    "library.json".to_string()
}

fn default_search_url() -> String {
    "https://manganelo.com/search/story/".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_dir_defaults_under_data_dir() {
        let cfg = Config::default().with_data_dir(Some(Path::new("/srv/manga-data")));
        assert_eq!(cfg.manga_save_dir(), PathBuf::from("/srv/manga-data/Manga"));
        assert_eq!(
            cfg.library_path(),
            PathBuf::from("/srv/manga-data/library.json")
        );
    }

    #[test]
    fn explicit_paths_win() {
        let mut cfg = Config::default().with_data_dir(Some(Path::new("/data")));
        cfg.save_path = "/mnt/comics".to_string();
        cfg.library_file = "/var/lib/progress.json".to_string();
        assert_eq!(cfg.manga_save_dir(), PathBuf::from("/mnt/comics"));
        assert_eq!(cfg.library_path(), PathBuf::from("/var/lib/progress.json"));
    }
}
