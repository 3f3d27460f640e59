//! 网络访问：页面请求与远程文件下载。

#![allow(dead_code)]

pub mod network;
