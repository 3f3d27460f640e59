#![allow(dead_code)]

pub mod chapter_number;
pub mod completion;
pub mod config;
pub mod context;
pub mod logging;
pub mod manga_paths;
pub mod opener;
