use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::base_system::context::Config;

#[derive(Debug, Clone)]
pub struct MangaWebConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
    pub search_url: String,
}

impl Default for MangaWebConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for MangaWebConfig {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout.max(1)),
            user_agent: config.user_agent.clone(),
            search_url: config.search_url.clone(),
        }
    }
}

pub struct MangaWebNetwork {
    client: Client,
    config: MangaWebConfig,
}

impl MangaWebNetwork {
    pub fn new(config: MangaWebConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        // reqwest 未启用 gzip 解码，要求原始字节
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or(HeaderValue::from_static("Mozilla/5.0")),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// 书名搜索地址，空格替换为下划线。
    pub fn search_url(&self, manga_title: &str) -> String {
        search_url(&self.config.search_url, manga_title)
    }

    /// GET 请求；传输失败或状态码不是 200 时返回 `None`。
    pub fn send_request(&self, url: &str) -> Option<Response> {
        if url.trim().is_empty() {
            return None;
        }
        match self.client.get(url).send() {
            Ok(resp) if resp.status() == StatusCode::OK => Some(resp),
            Ok(resp) => {
                warn!(target: "network", "请求 {} 返回状态码 {}", url, resp.status());
                None
            }
            Err(err) => {
                warn!(target: "network", "请求 {} 失败: {}", url, err);
                None
            }
        }
    }

    pub fn fetch_text(&self, url: &str) -> Option<String> {
        self.send_request(url)?.text().ok()
    }

    /// 把远程资源写入 `dst`。只有完整写入时返回 `true`，失败会删除残留文件。
    pub fn copy_url_to_file(&self, src_url: &str, dst: &Path) -> bool {
        let Some(mut resp) = self.send_request(src_url) else {
            return false;
        };

        match write_response(&mut resp, dst) {
            Ok(bytes) => {
                debug!(target: "network", "已保存 {} ({} bytes)", dst.display(), bytes);
                true
            }
            Err(err) => {
                warn!(target: "network", "保存 {} 失败: {}", dst.display(), err);
                let _ = fs::remove_file(dst);
                false
            }
        }
    }
}

fn write_response(resp: &mut Response, dst: &Path) -> io::Result<u64> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    let expected = resp.content_length();
    let mut file = File::create(dst)?;
    let bytes = resp
        .copy_to(&mut file)
        .map_err(io::Error::other)?;
    if let Some(expected) = expected
        && expected != bytes
    {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {expected} bytes, got {bytes}"),
        ));
    }
    file.flush()?;
    Ok(bytes)
}

pub fn search_url(base: &str, manga_title: &str) -> String {
    format!("{}{}", base, manga_title.trim().replace(' ', "_"))
}
