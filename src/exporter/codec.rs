//! # 宿主能力抽象（ImageCodec）
//!
//! ## 设计思路
//!
//! 画布、二进制句柄、编码器这些“宿主相关”的原语统一收进 `ImageCodec`，
//! 每个目标平台一个实现（本 crate 自带 `NativeCodec`），编排逻辑与平台无关。
//!
//! 解码矢量时需要的临时句柄（内存 Blob 定位符）用 `BlobHandle` 表达：
//! 构造即登记，`Drop` 即释放，无论成功、失败还是 panic 都不会泄漏。
//! `BlobRegistry::live_handles` 可随时核对是否有遗留句柄。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::ExportError;
use super::format::RasterEncoding;
use super::source::{RasterSurface, VectorSource};

/// A4 纵向页面尺寸（毫米）。
pub const A4_PAGE_MM: (f32, f32) = (210.0, 297.0);

/// 文档页版面：图片为正方形，水平垂直居中。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub image_x_mm: f32,
    pub image_y_mm: f32,
    pub image_size_mm: f32,
}

impl PageLayout {
    /// A4 纵向，`x = (宽 - 边长) / 2`，`y = (高 - 边长) / 2`。
    ///
    /// `y` 以页面上边缘为原点。
    pub fn a4_centered(image_size_mm: f32) -> Self {
        let (page_width_mm, page_height_mm) = A4_PAGE_MM;
        Self {
            page_width_mm,
            page_height_mm,
            image_x_mm: (page_width_mm - image_size_mm) / 2.0,
            image_y_mm: (page_height_mm - image_size_mm) / 2.0,
            image_size_mm,
        }
    }
}

/// 平台相关的栅格化与编码能力。
#[async_trait]
pub trait ImageCodec: Send + Sync {
    /// 把矢量源绘制到 `resolution × resolution` 的白底画布上，内容铺满画布。
    async fn rasterize(
        &self,
        source: &VectorSource,
        resolution: u32,
    ) -> Result<RasterSurface, ExportError>;

    /// 按目标编码压缩画布。`quality` 为 `None` 表示无损格式。
    async fn encode_raster(
        &self,
        surface: RasterSurface,
        encoding: RasterEncoding,
        quality: Option<u8>,
    ) -> Result<Vec<u8>, ExportError>;

    /// 画布转无损中间栅格后嵌入单页文档。
    async fn compose_document(
        &self,
        surface: RasterSurface,
        layout: &PageLayout,
    ) -> Result<Vec<u8>, ExportError>;

    /// 宿主是否提供该编码原语。
    fn supports(&self, _encoding: RasterEncoding) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct BlobRegistryInner {
    live: AtomicUsize,
    next_id: AtomicU64,
}

/// 临时句柄登记表。
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    inner: Arc<BlobRegistryInner>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一段内存数据创建临时句柄。
    pub fn acquire(&self, mime_type: &'static str, bytes: Vec<u8>) -> BlobHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.live.fetch_add(1, Ordering::SeqCst);
        log::debug!("📎 创建临时句柄 blob:qr-export/{}（{} bytes）", id, bytes.len());

        BlobHandle {
            registry: Arc::clone(&self.inner),
            id,
            mime_type,
            bytes,
        }
    }

    /// 当前尚未释放的句柄数。
    pub fn live_handles(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }
}

/// 内存 Blob 的 RAII 句柄，`Drop` 时自动释放。
///
/// # 示例
/// ```rust
/// use qr_export::exporter::BlobRegistry;
///
/// let registry = BlobRegistry::new();
/// {
///     let blob = registry.acquire("image/svg+xml", b"<svg/>".to_vec());
///     assert_eq!(registry.live_handles(), 1);
///     assert!(blob.locator().starts_with("blob:"));
/// }
/// assert_eq!(registry.live_handles(), 0);
/// ```
#[derive(Debug)]
pub struct BlobHandle {
    registry: Arc<BlobRegistryInner>,
    id: u64,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl BlobHandle {
    pub fn locator(&self) -> String {
        format!("blob:qr-export/{}", self.id)
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        self.registry.live.fetch_sub(1, Ordering::SeqCst);
        log::debug!("🧹 释放临时句柄 blob:qr-export/{}", self.id);
    }
}
