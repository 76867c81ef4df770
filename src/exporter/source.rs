//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 把“外部输入”和“流水线中间结果”解耦：
//! - `SourceContainer` 表示宿主渲染好的容器，导出时才去取矢量元素
//! - `VectorSource` 表示取到的 SVG 原文，只读
//! - `RasterSurface` 表示栅格化后的正方形 RGBA 画布，由单次编码独占
//! - `ExportArtifact` 表示最终交付物：字节 + 文件名 + MIME

use image::{RgbImage, RgbaImage};

use super::ExportError;

/// 矢量图原文（SVG 标记）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorSource {
    markup: String,
}

impl VectorSource {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    /// 序列化为文本，逐字节保持原样。
    pub fn serialize(&self) -> &str {
        &self.markup
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.markup.as_bytes()
    }
}

/// 宿主提供的矢量容器。
///
/// 每次导出调用时读取，不跨调用缓存。
pub trait SourceContainer: Send + Sync {
    /// 找不到矢量元素时返回 `None`。
    fn vector_source(&self) -> Option<VectorSource>;
}

impl SourceContainer for VectorSource {
    fn vector_source(&self) -> Option<VectorSource> {
        Some(self.clone())
    }
}

impl<T: SourceContainer> SourceContainer for Option<T> {
    fn vector_source(&self) -> Option<VectorSource> {
        self.as_ref().and_then(SourceContainer::vector_source)
    }
}

/// 包裹任意宿主标记的容器，取其中第一个 `<svg>` 元素（含嵌套子元素）。
///
/// # 示例
/// ```rust
/// use qr_export::exporter::{SourceContainer, SvgMarkupContainer};
///
/// let container = SvgMarkupContainer::new(r#"<div><svg viewBox="0 0 1 1"></svg></div>"#);
/// let source = container.vector_source().expect("svg element present");
/// assert_eq!(source.serialize(), r#"<svg viewBox="0 0 1 1"></svg>"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SvgMarkupContainer {
    markup: String,
}

impl SvgMarkupContainer {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

impl SourceContainer for SvgMarkupContainer {
    fn vector_source(&self) -> Option<VectorSource> {
        let start = find_svg_tag(&self.markup, "<svg")?;
        let end = find_element_end(&self.markup, start)?;
        Some(VectorSource::new(&self.markup[start..end]))
    }
}

/// 定位 `<svg` / `</svg` 标签，排除 `<svgfoo` 一类前缀相同的标签名。
fn find_svg_tag(markup: &str, prefix: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = markup[offset..].find(prefix) {
        let start = offset + found;
        let next = markup[start + prefix.len()..].chars().next();
        if matches!(next, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            return Some(start);
        }
        offset = start + prefix.len();
    }
    None
}

/// 从 `start` 处的开始标签出发，按嵌套深度找到与之配对的结束标签，返回其后的位置。
///
/// 同级的第二个 `<svg>` 不会被并入；`<svg .../>` 自闭合时只取标签本身。
fn find_element_end(markup: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut cursor = start;

    loop {
        let rest = &markup[cursor..];
        let open = find_svg_tag(rest, "<svg").map(|i| cursor + i);
        let close = find_svg_tag(rest, "</svg").map(|i| cursor + i);

        match (open, close) {
            (Some(open), close) if close.is_none_or(|close| open < close) => {
                let tag_end = open + markup[open..].find('>')?;
                cursor = tag_end + 1;
                if markup[..tag_end].ends_with('/') {
                    if depth == 0 {
                        return Some(cursor);
                    }
                } else {
                    depth += 1;
                }
            }
            (_, Some(close)) => {
                let tag_end = close + markup[close..].find('>')?;
                cursor = tag_end + 1;
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(cursor);
                }
            }
            _ => return None,
        }
    }
}

/// 栅格画布：边长 `side` 的正方形，底色为不透明白。
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    /// 由非预乘 RGBA 字节构造，长度必须是 `side * side * 4`。
    pub fn from_rgba(side: u32, bytes: Vec<u8>) -> Result<Self, ExportError> {
        let pixels = RgbaImage::from_raw(side, side, bytes).ok_or_else(|| {
            ExportError::Rasterization(format!("画布像素数据长度与 {}x{} 不符", side, side))
        })?;
        Ok(Self { pixels })
    }

    pub fn side(&self) -> u32 {
        self.pixels.width()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// 丢弃 alpha 通道（画布本就不透明）。
    pub fn to_rgb(&self) -> RgbImage {
        image::DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8()
    }
}

/// 最终交付物。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub payload: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

impl ExportArtifact {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
