//! 图片尺寸探测。

use std::path::Path;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    /// 横向跨页（宽大于高）。
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// 读取图片宽高；文件不存在或不是可识别的图片时返回 `None`。
pub fn image_dimensions(path: &Path) -> Option<ImageDimensions> {
    match image::image_dimensions(path) {
        Ok((width, height)) => Some(ImageDimensions { width, height }),
        Err(err) => {
            debug!(target: "media", "无法读取图片尺寸 {}: {}", path.display(), err);
            None
        }
    }
}
