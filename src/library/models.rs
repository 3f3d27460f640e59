//! 书架记录。

use serde::{Deserialize, Serialize};

use super::records::{ColumnMeta, TableSchema};
use crate::base_system::chapter_number::ChapterNumber;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manga {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub url: String,
    pub latest_chapter: ChapterNumber,
    pub chapters_read: ChapterNumber,
    /// 本地已保存的最新章节，启动时扫描得到，不写入文件
    #[serde(skip)]
    pub offline_chapter: Option<ChapterNumber>,
}

impl Manga {
    pub fn chapters_available(&self) -> f64 {
        self.latest_chapter.value() - self.chapters_read.value()
    }
}

impl TableSchema for Manga {
    const TABLE_NAME: &'static str = "manga";

    fn columns() -> &'static [ColumnMeta] {
        static COLUMNS: [ColumnMeta; 5] = [
            ColumnMeta {
                name: "id",
                primary_key: true,
            },
            ColumnMeta {
                name: "title",
                primary_key: false,
            },
            ColumnMeta {
                name: "url",
                primary_key: false,
            },
            ColumnMeta {
                name: "latest_chapter",
                primary_key: false,
            },
            ColumnMeta {
                name: "chapters_read",
                primary_key: false,
            },
        ];
        &COLUMNS
    }
}
