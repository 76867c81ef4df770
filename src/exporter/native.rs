//! # 本地实现（NativeCodec）
//!
//! ## 设计思路
//!
//! 不依赖浏览器画布，直接在进程内完成全部宿主原语：
//! - 栅格化：`resvg`（`usvg` 解析 + `tiny-skia` 绘制）
//! - PNG / JPEG：`image`
//! - 有损 WebP：`webp`（libwebp）
//! - PDF：`lopdf` 组装单页文档，图片以 PNG 的 IDAT 数据（FlateDecode + PNG 预测器）嵌入
//!
//! ## 实现思路
//!
//! 所有 CPU 密集步骤都放进 `spawn_blocking`，不阻塞 async 运行时。
//! 栅格化前先校验分辨率，超过上限直接拒绝，不分配画布。
//! SVG 字节通过 `BlobHandle` 交给阻塞线程，闭包结束即释放。

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use resvg::{tiny_skia, usvg};

use super::codec::{BlobHandle, BlobRegistry, ImageCodec, PageLayout};
use super::format::RasterEncoding;
use super::source::{RasterSurface, VectorSource};
use super::{ExportError, MAX_RESOLUTION_CEILING};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// 进程内编解码实现。
///
/// 不保存任何可调配置：分辨率上限由编排器按配置快照把关，
/// 这里只拒绝 0 和超过 `MAX_RESOLUTION_CEILING` 的请求，防止超大画布分配。
#[derive(Debug, Clone, Default)]
pub struct NativeCodec {
    blobs: BlobRegistry,
}

impl NativeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// 临时句柄登记表，用于核对句柄是否全部释放。
    pub fn blob_registry(&self) -> &BlobRegistry {
        &self.blobs
    }

    fn validate_resolution(resolution: u32) -> Result<(), ExportError> {
        if resolution == 0 {
            return Err(ExportError::Rasterization("分辨率必须大于 0".to_string()));
        }
        if resolution > MAX_RESOLUTION_CEILING {
            return Err(ExportError::Rasterization(format!(
                "分辨率过大：{}px（硬上限：{}px）",
                resolution, MAX_RESOLUTION_CEILING
            )));
        }
        Ok(())
    }

    fn render_blob(blob: &BlobHandle, resolution: u32) -> Result<RasterSurface, ExportError> {
        let options = usvg::Options::default();
        let tree = usvg::Tree::from_data(blob.bytes(), &options)
            .map_err(|e| ExportError::Rasterization(format!("SVG 解析失败：{}", e)))?;

        let mut pixmap = tiny_skia::Pixmap::new(resolution, resolution).ok_or_else(|| {
            ExportError::Rasterization(format!("无法分配 {}x{} 画布", resolution, resolution))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            resolution as f32 / size.width(),
            resolution as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        // 白底不透明，预乘与非预乘数据一致
        RasterSurface::from_rgba(resolution, pixmap.take())
    }

    fn encode_png(rgb: &RgbImage) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive)
            .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| ExportError::Encoding(format!("PNG 编码失败：{}", e)))?;
        Ok(buffer)
    }

    fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality)
            .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| ExportError::Encoding(format!("JPEG 编码失败：{}", e)))?;
        Ok(buffer)
    }

    fn encode_webp(rgba: &RgbaImage, quality: u8) -> Result<Vec<u8>, ExportError> {
        let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode_simple(false, quality as f32)
            .map_err(|e| ExportError::Encoding(format!("WebP 编码失败：{:?}", e)))?;
        Ok(encoded.to_vec())
    }

    fn encode_surface(
        surface: &RasterSurface,
        encoding: RasterEncoding,
        quality: Option<u8>,
    ) -> Result<Vec<u8>, ExportError> {
        match encoding {
            RasterEncoding::Png => Self::encode_png(&surface.to_rgb()),
            RasterEncoding::Jpeg => {
                let quality = quality.ok_or_else(|| {
                    ExportError::Encoding("JPEG 编码缺少质量参数".to_string())
                })?;
                Self::encode_jpeg(&surface.to_rgb(), quality)
            }
            RasterEncoding::Webp => {
                let quality = quality.ok_or_else(|| {
                    ExportError::Encoding("WebP 编码缺少质量参数".to_string())
                })?;
                Self::encode_webp(surface.as_rgba(), quality)
            }
        }
    }

    /// 拼接 PNG 全部 IDAT 块，得到 zlib 压缩的带滤波字节流。
    fn extract_png_idat(png: &[u8]) -> Result<Vec<u8>, ExportError> {
        if png.len() < PNG_SIGNATURE.len() || png[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
            return Err(ExportError::Encoding("中间栅格不是 PNG 数据".to_string()));
        }

        let mut cursor = PNG_SIGNATURE.len();
        let mut data = Vec::new();
        while cursor + 8 <= png.len() {
            let length_bytes = <[u8; 4]>::try_from(&png[cursor..cursor + 4])
                .map_err(|_| ExportError::Encoding("PNG 块头损坏".to_string()))?;
            let length = u32::from_be_bytes(length_bytes) as usize;
            let kind = &png[cursor + 4..cursor + 8];

            let body_start = cursor + 8;
            let body_end = body_start
                .checked_add(length)
                .filter(|end| end + 4 <= png.len())
                .ok_or_else(|| ExportError::Encoding("PNG 块长度越界".to_string()))?;

            match kind {
                b"IDAT" => data.extend_from_slice(&png[body_start..body_end]),
                b"IEND" => break,
                _ => {}
            }
            cursor = body_end + 4;
        }

        if data.is_empty() {
            return Err(ExportError::Encoding("PNG 中没有图像数据".to_string()));
        }
        Ok(data)
    }

    fn build_pdf(surface: &RasterSurface, layout: &PageLayout) -> Result<Vec<u8>, ExportError> {
        let side = surface.side();
        let png = Self::encode_png(&surface.to_rgb())?;
        let idat = Self::extract_png_idat(&png)?;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => side as i64,
                "Height" => side as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
                "DecodeParms" => dictionary! {
                    "Predictor" => 15,
                    "Colors" => 3,
                    "BitsPerComponent" => 8,
                    "Columns" => side as i64,
                },
            },
            idat,
        ));

        let page_width = layout.page_width_mm * POINTS_PER_MM;
        let page_height = layout.page_height_mm * POINTS_PER_MM;
        let image_size = layout.image_size_mm * POINTS_PER_MM;
        let image_x = layout.image_x_mm * POINTS_PER_MM;
        // PDF 坐标原点在左下角
        let image_y = page_height - layout.image_y_mm * POINTS_PER_MM - image_size;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        image_size.into(),
                        0.into(),
                        0.into(),
                        image_size.into(),
                        image_x.into(),
                        image_y.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content
            .encode()
            .map_err(|e| ExportError::Encoding(format!("PDF 内容流编码失败：{}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

        let resources_id = doc.add_object(dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        });

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| ExportError::Encoding(format!("PDF 写出失败：{}", e)))?;
        Ok(buffer)
    }
}

#[async_trait]
impl ImageCodec for NativeCodec {
    async fn rasterize(
        &self,
        source: &VectorSource,
        resolution: u32,
    ) -> Result<RasterSurface, ExportError> {
        Self::validate_resolution(resolution)?;

        let blob = self
            .blobs
            .acquire("image/svg+xml;charset=utf-8", source.as_bytes().to_vec());

        tokio::task::spawn_blocking(move || {
            let surface = Self::render_blob(&blob, resolution);
            drop(blob);
            surface
        })
        .await
        .map_err(|e| ExportError::Rasterization(format!("栅格化线程执行失败：{}", e)))?
    }

    async fn encode_raster(
        &self,
        surface: RasterSurface,
        encoding: RasterEncoding,
        quality: Option<u8>,
    ) -> Result<Vec<u8>, ExportError> {
        tokio::task::spawn_blocking(move || Self::encode_surface(&surface, encoding, quality))
            .await
            .map_err(|e| ExportError::Encoding(format!("编码线程执行失败：{}", e)))?
    }

    async fn compose_document(
        &self,
        surface: RasterSurface,
        layout: &PageLayout,
    ) -> Result<Vec<u8>, ExportError> {
        let layout = *layout;
        tokio::task::spawn_blocking(move || Self::build_pdf(&surface, &layout))
            .await
            .map_err(|e| ExportError::Encoding(format!("PDF 线程执行失败：{}", e)))?
    }
}
