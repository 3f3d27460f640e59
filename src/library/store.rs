//! 书架与阅读进度的本地存储（JSON 文件）。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use super::models::Manga;
use super::records::{TableSchema, all_fields_have_value, build_row, find_by_attr, non_pk_fields};
use crate::base_system::chapter_number::ChapterNumber;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid library file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{table}: missing fields {missing:?}")]
    MissingFields {
        table: &'static str,
        missing: Vec<&'static str>,
    },
    #[error("{table}: invalid row: {source}")]
    InvalidRow {
        table: &'static str,
        source: serde_json::Error,
    },
    #[error("manga already tracked: {0}")]
    Duplicate(String),
    #[error("no manga with id {0}")]
    UnknownId(u64),
}

#[derive(Debug)]
pub struct LibraryStore {
    path: PathBuf,
    manga: Vec<Manga>,
}

impl LibraryStore {
    /// 读取书架；文件不存在时得到空书架。
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let manga = match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        debug!(target: "library", "已加载 {} 部漫画: {}", manga.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            manga,
        })
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.manga).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        // 先写临时文件再替换，避免中途退出留下半个文件
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    pub fn manga(&self) -> &[Manga] {
        &self.manga
    }

    pub fn manga_mut(&mut self) -> &mut [Manga] {
        &mut self.manga
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Manga> {
        find_by_attr(&self.manga, title, |m| m.title.as_str()).map(|idx| &self.manga[idx])
    }

    /// 校验字段后插入一条记录，返回分配的 id。
    pub fn insert(&mut self, values: Map<String, Value>) -> Result<u64, StoreError> {
        let given: Vec<&str> = values.keys().map(String::as_str).collect();
        if !all_fields_have_value::<Manga, _>(&given, true) {
            let missing = non_pk_fields::<Manga>()
                .into_iter()
                .filter(|f| !given.contains(f))
                .collect();
            return Err(StoreError::MissingFields {
                table: Manga::TABLE_NAME,
                missing,
            });
        }

        let mut row = build_row::<Manga>(&values).map_err(|source| StoreError::InvalidRow {
            table: Manga::TABLE_NAME,
            source,
        })?;
        if self.find_by_title(&row.title).is_some() {
            return Err(StoreError::Duplicate(row.title));
        }

        row.id = self.manga.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        info!(target: "library", "添加漫画 #{}: {}", row.id, row.title);
        let id = row.id;
        self.manga.push(row);
        Ok(id)
    }

    pub fn mark_read(&mut self, id: u64, chapter: ChapterNumber) -> Result<(), StoreError> {
        let idx = find_by_attr(&self.manga, &id, |m| &m.id).ok_or(StoreError::UnknownId(id))?;
        let entry = &mut self.manga[idx];
        entry.chapters_read = chapter.min(entry.latest_chapter);
        debug!(target: "library", "{} 已读至 {}", entry.title, entry.chapters_read);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn dorohedoro() -> Map<String, Value> {
        values(json!({
            "title": "Dorohedoro",
            "url": "https://example.org/manga/dorohedoro",
            "latest_chapter": 167,
            "chapters_read": 40
        }))
    }

    #[test]
    fn missing_file_is_empty_library() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LibraryStore::load(&tmp.path().join("library.json")).unwrap();
        assert!(store.manga().is_empty());
    }

    #[test]
    fn insert_assigns_ids_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("library.json");
        let mut store = LibraryStore::load(&path).unwrap();
        assert_eq!(store.insert(dorohedoro()).unwrap(), 1);

        let mut second = dorohedoro();
        second.insert("title".into(), json!("Dungeon Meshi"));
        assert_eq!(store.insert(second).unwrap(), 2);
        store.save().unwrap();

        let reloaded = LibraryStore::load(&path).unwrap();
        assert_eq!(reloaded.manga().len(), 2);
        let meshi = reloaded.find_by_title("Dungeon Meshi").unwrap();
        assert_eq!(meshi.id, 2);
        assert_eq!(meshi.latest_chapter, ChapterNumber::from(167));
    }

    #[test]
    fn incomplete_or_bad_rows_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = LibraryStore::load(&tmp.path().join("library.json")).unwrap();

        let mut partial = dorohedoro();
        partial.remove("url");
        match store.insert(partial) {
            Err(StoreError::MissingFields { missing, .. }) => assert_eq!(missing, ["url"]),
            other => panic!("unexpected: {other:?}"),
        }

        let mut extra = dorohedoro();
        extra.insert("rating".into(), json!(5));
        assert!(matches!(store.insert(extra), Err(StoreError::InvalidRow { .. })));

        store.insert(dorohedoro()).unwrap();
        assert!(matches!(store.insert(dorohedoro()), Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn mark_read_clamps_to_latest() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = LibraryStore::load(&tmp.path().join("library.json")).unwrap();
        let id = store.insert(dorohedoro()).unwrap();

        store.mark_read(id, ChapterNumber::from(41)).unwrap();
        assert_eq!(store.manga()[0].chapters_read, ChapterNumber::from(41));
        store.mark_read(id, ChapterNumber::from(500)).unwrap();
        assert_eq!(store.manga()[0].chapters_read, ChapterNumber::from(167));
        assert!(matches!(
            store.mark_read(99, ChapterNumber::ZERO),
            Err(StoreError::UnknownId(99))
        ));
    }

    #[test]
    fn corrupt_file_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("library.json");
        fs::write(&path, "[{").unwrap();
        assert!(matches!(LibraryStore::load(&path), Err(StoreError::Parse { .. })));
    }
}
