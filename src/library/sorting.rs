//! 书架排序方式。

use std::cmp::Ordering;

use super::models::Manga;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Id,
    LatestChapter,
    ChaptersAvailable,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Title,
        SortKey::Id,
        SortKey::LatestChapter,
        SortKey::ChaptersAvailable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Title => "按标题",
            SortKey::Id => "按添加顺序",
            SortKey::LatestChapter => "按最新章节",
            SortKey::ChaptersAvailable => "按未读章节",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.label()).collect()
    }

    pub fn from_index(index: usize) -> Option<SortKey> {
        Self::ALL.get(index).copied()
    }

    pub fn sort(self, manga: &mut [Manga]) {
        match self {
            SortKey::Title => sort_manga_by_title(manga),
            SortKey::Id => sort_manga_by_id(manga),
            SortKey::LatestChapter => sort_manga_by_latest_chapter(manga),
            SortKey::ChaptersAvailable => sort_manga_by_chapters_available(manga),
        }
    }
}

pub fn sort_manga_by_title(manga: &mut [Manga]) {
    manga.sort_by(|a, b| a.title.cmp(&b.title));
}

pub fn sort_manga_by_id(manga: &mut [Manga]) {
    manga.sort_by_key(|m| m.id);
}

pub fn sort_manga_by_latest_chapter(manga: &mut [Manga]) {
    manga.sort_by(|a, b| b.latest_chapter.cmp(&a.latest_chapter));
}

pub fn sort_manga_by_chapters_available(manga: &mut [Manga]) {
    manga.sort_by(|a, b| {
        b.chapters_available()
            .partial_cmp(&a.chapters_available())
            .unwrap_or(Ordering::Equal)
    });
}
