//! # 编码器
//!
//! ## 设计思路
//!
//! 按格式目录里登记的 `EncodeStrategy` 分派，三种路径：
//! 1. `Passthrough`：SVG 原文直出，忽略分辨率与质量
//! 2. `Raster`：栅格化 → 目标编码（PNG 无损，WebP / JPEG 有损）
//! 3. `Document`：栅格化 → 无损中间栅格 → 嵌入 A4 页面居中
//!
//! 要么返回完整产物，要么返回错误，不存在“半个文件”。
//! 产物字节会按内容嗅探一遍，与目录声明的 MIME 不符即视为编码失败。

use std::time::{Duration, Instant};

use super::codec::{ImageCodec, PageLayout};
use super::format::{EncodeStrategy, FormatDescriptor, describe};
use super::source::{ExportArtifact, VectorSource};
use super::{ExportConfig, ExportError, ExportOptions};

/// 编码结果及分阶段耗时。
#[derive(Debug)]
pub(crate) struct Encoded {
    pub artifact: ExportArtifact,
    /// 直出格式为零。
    pub rasterize: Duration,
    pub encode: Duration,
}

/// 把矢量源编码为请求格式的交付物。
pub(crate) async fn encode(
    codec: &dyn ImageCodec,
    source: &VectorSource,
    options: &ExportOptions,
    config: &ExportConfig,
) -> Result<Encoded, ExportError> {
    let descriptor = describe(options.format);
    let started = Instant::now();
    let mut rasterize = Duration::ZERO;

    let payload = match descriptor.strategy {
        EncodeStrategy::Passthrough => source.serialize().as_bytes().to_vec(),
        EncodeStrategy::Raster(encoding) => {
            if !codec.supports(encoding) {
                return Err(ExportError::Encoding(format!(
                    "宿主不支持 {} 编码",
                    encoding.mime_type()
                )));
            }
            let surface = codec.rasterize(source, options.resolution).await?;
            rasterize = started.elapsed();
            let payload = codec
                .encode_raster(surface, encoding, options.effective_quality())
                .await?;
            verify_signature(descriptor, &payload)?;
            payload
        }
        EncodeStrategy::Document => {
            let surface = codec.rasterize(source, options.resolution).await?;
            rasterize = started.elapsed();
            let layout = PageLayout::a4_centered(config.pdf_image_size_mm);
            let payload = codec.compose_document(surface, &layout).await?;
            verify_signature(descriptor, &payload)?;
            payload
        }
    };
    let encode = started.elapsed().saturating_sub(rasterize);

    log::debug!(
        "🎨 编码完成 - 格式: {} 分辨率: {} 大小: {} bytes rasterize={}ms encode={}ms",
        descriptor.format,
        options.resolution,
        payload.len(),
        rasterize.as_millis(),
        encode.as_millis()
    );

    Ok(Encoded {
        artifact: ExportArtifact {
            payload,
            file_name: options.artifact_file_name(&config.default_file_name),
            mime_type: descriptor.mime_type,
        },
        rasterize,
        encode,
    })
}

/// 嗅探产物类型，必须与格式目录声明一致。
fn verify_signature(descriptor: &FormatDescriptor, payload: &[u8]) -> Result<(), ExportError> {
    if payload.is_empty() {
        return Err(ExportError::Encoding(format!(
            "{} 编码结果为空",
            descriptor.display_label
        )));
    }

    match infer::get(payload) {
        Some(kind) if kind.mime_type() == descriptor.mime_type => Ok(()),
        Some(kind) => Err(ExportError::Encoding(format!(
            "{} 编码结果类型不符：{}",
            descriptor.display_label,
            kind.mime_type()
        ))),
        None => Err(ExportError::Encoding(format!(
            "{} 编码结果无法识别",
            descriptor.display_label
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::format::RasterEncoding;
    use crate::exporter::source::RasterSurface;
    use crate::exporter::{ExportFormat, NativeCodec};
    use async_trait::async_trait;

    const QR_LIKE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 21 21"><path d="M0 0h7v7H0z M14 0h7v7h-7z M0 14h7v7H0z"/></svg>"#;

    /// 永远返回 GIF 头的编解码器，用来验证类型嗅探。
    struct MislabelingCodec;

    #[async_trait]
    impl ImageCodec for MislabelingCodec {
        async fn rasterize(
            &self,
            _source: &VectorSource,
            resolution: u32,
        ) -> Result<RasterSurface, ExportError> {
            RasterSurface::from_rgba(resolution, vec![255; (resolution * resolution * 4) as usize])
        }

        async fn encode_raster(
            &self,
            _surface: RasterSurface,
            _encoding: RasterEncoding,
            _quality: Option<u8>,
        ) -> Result<Vec<u8>, ExportError> {
            Ok(b"GIF89a\x01\x00\x01\x00".to_vec())
        }

        async fn compose_document(
            &self,
            _surface: RasterSurface,
            _layout: &PageLayout,
        ) -> Result<Vec<u8>, ExportError> {
            Ok(Vec::new())
        }

        fn supports(&self, encoding: RasterEncoding) -> bool {
            encoding != RasterEncoding::Webp
        }
    }

    #[tokio::test]
    async fn svg_passthrough_is_byte_identical_regardless_of_options() {
        let codec = NativeCodec::new();
        let config = ExportConfig::default();
        let source = VectorSource::new(QR_LIKE);

        for (resolution, quality) in [(300, 1), (4000, 100), (0, 50)] {
            let options = ExportOptions::new(ExportFormat::Svg, "demo")
                .with_resolution(resolution)
                .with_quality(quality);
            let encoded = encode(&codec, &source, &options, &config)
                .await
                .expect("svg passthrough never rasterizes");
            assert_eq!(encoded.rasterize, Duration::ZERO);
            let artifact = encoded.artifact;

            assert_eq!(artifact.payload, QR_LIKE.as_bytes());
            assert_eq!(artifact.file_name, "demo.svg");
            assert_eq!(artifact.mime_type, "image/svg+xml");
        }
        assert_eq!(codec.blob_registry().live_handles(), 0);
    }

    #[tokio::test]
    async fn raster_and_document_formats_produce_declared_types() {
        let codec = NativeCodec::new();
        let config = ExportConfig::default();
        let source = VectorSource::new(QR_LIKE);

        for format in [ExportFormat::Png, ExportFormat::Pdf, ExportFormat::Webp, ExportFormat::Jpeg] {
            let options = ExportOptions::new(format, "demo").with_resolution(48);
            let artifact = encode(&codec, &source, &options, &config)
                .await
                .expect("encode should succeed")
                .artifact;

            let descriptor = describe(format);
            assert_eq!(artifact.mime_type, descriptor.mime_type);
            assert!(artifact.file_name.ends_with(&format!(".{}", descriptor.file_extension)));
            assert!(!artifact.is_empty());
        }
        assert_eq!(codec.blob_registry().live_handles(), 0);
    }

    #[tokio::test]
    async fn quality_does_not_affect_png_output() {
        let codec = NativeCodec::new();
        let config = ExportConfig::default();
        let source = VectorSource::new(QR_LIKE);

        let low = ExportOptions::new(ExportFormat::Png, "demo").with_resolution(40).with_quality(10);
        let high = low.clone().with_quality(100);

        let low = encode(&codec, &source, &low, &config).await.expect("png low");
        let high = encode(&codec, &source, &high, &config).await.expect("png high");
        assert_eq!(low.artifact.payload, high.artifact.payload);
    }

    #[tokio::test]
    async fn quality_does_not_affect_pdf_output() {
        let codec = NativeCodec::new();
        let config = ExportConfig::default();
        let source = VectorSource::new(QR_LIKE);

        let low = ExportOptions::new(ExportFormat::Pdf, "demo").with_resolution(40).with_quality(1);
        let high = low.clone().with_quality(100);

        let low = encode(&codec, &source, &low, &config).await.expect("pdf low");
        let high = encode(&codec, &source, &high, &config).await.expect("pdf high");
        assert_eq!(low.artifact.payload, high.artifact.payload);
    }

    #[tokio::test]
    async fn mislabeled_payload_is_rejected() {
        let config = ExportConfig::default();
        let source = VectorSource::new(QR_LIKE);

        let png = ExportOptions::new(ExportFormat::Png, "demo").with_resolution(4);
        let result = encode(&MislabelingCodec, &source, &png, &config).await;
        assert!(matches!(result, Err(ExportError::Encoding(_))));

        let pdf = ExportOptions::new(ExportFormat::Pdf, "demo").with_resolution(4);
        let result = encode(&MislabelingCodec, &source, &pdf, &config).await;
        assert!(matches!(result, Err(ExportError::Encoding(_))));
    }

    #[tokio::test]
    async fn unsupported_encoding_fails_before_rasterizing() {
        let config = ExportConfig::default();
        let source = VectorSource::new(QR_LIKE);
        let webp = ExportOptions::new(ExportFormat::Webp, "demo").with_resolution(4);

        let result = encode(&MislabelingCodec, &source, &webp, &config).await;
        assert!(matches!(result, Err(ExportError::Encoding(_))));
    }

    #[tokio::test]
    async fn rasterization_failure_propagates_unchanged() {
        let codec = NativeCodec::new();
        let config = ExportConfig::default();
        let source = VectorSource::new("<svg not-closed");
        let options = ExportOptions::new(ExportFormat::Jpeg, "demo").with_resolution(16);

        let result = encode(&codec, &source, &options, &config).await;
        assert!(matches!(result, Err(ExportError::Rasterization(_))));
        assert_eq!(codec.blob_registry().live_handles(), 0);
    }
}
