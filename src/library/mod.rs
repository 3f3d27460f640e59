//! 书架：漫画记录、排序与阅读进度存储。

pub mod models;
pub mod records;
pub mod sorting;
pub mod store;
