//! 章节图片处理。

#![allow(dead_code)]

pub(crate) mod image_utils;
