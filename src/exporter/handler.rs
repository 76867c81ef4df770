//! # 核心编排模块（ExportOrchestrator）
//!
//! ## 设计思路
//!
//! 编排器只负责流程，不碰任何平台原语。单格式导出的链路固定为：
//! 1. 读取配置快照
//! 2. 从容器取矢量源（取不到即 `SourceNotFound`）
//! 3. 按格式目录的策略编码（必要时先栅格化）
//! 4. 交给 `Downloader`
//!
//! 批量导出按 `png → svg → pdf → webp → jpeg` 顺序逐个执行，严格串行，
//! 每次交付前经过 `DeliveryThrottle`，遇到第一个失败立即中止剩余格式。
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ExportConfig>>` 支持运行时调整
//! - 单次调用内使用同一配置快照，避免处理中途配置漂移
//! - 记录 `rasterize/encode/deliver/total` 阶段耗时
//! - 节流间隔与分辨率上限都取自快照，`set_config` 之后开始的调用立即生效

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::codec::ImageCodec;
use super::downloader::Downloader;
use super::encoder::{self, Encoded};
use super::format::{EncodeStrategy, describe};
use super::source::SourceContainer;
use super::throttle::DeliveryThrottle;
use super::{ExportConfig, ExportError, ExportFormat, ExportOptions};

/// 导出编排器。
pub struct ExportOrchestrator {
    config: Arc<RwLock<ExportConfig>>,
    codec: Arc<dyn ImageCodec>,
    downloader: Arc<dyn Downloader>,
    throttle: Arc<dyn DeliveryThrottle>,
}

impl ExportOrchestrator {
    /// 组装编排器，配置必须通过校验。
    pub fn new(
        config: ExportConfig,
        codec: Arc<dyn ImageCodec>,
        downloader: Arc<dyn Downloader>,
        throttle: Arc<dyn DeliveryThrottle>,
    ) -> Result<Self, ExportError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            codec,
            downloader,
            throttle,
        })
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<ExportConfig, ExportError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ExportError::InvalidConfig("配置读取锁已中毒".to_string()))
    }

    /// 校验后替换配置，对之后开始的导出调用生效。
    pub fn set_config(&self, config: ExportConfig) -> Result<(), ExportError> {
        config.validate()?;

        let mut current = self
            .config
            .write()
            .map_err(|_| ExportError::InvalidConfig("配置写入锁已中毒".to_string()))?;
        *current = config;

        log::info!(
            "⚙️ 导出配置已更新（max_resolution={}, min_delivery_interval_ms={}, pdf_image_size_mm={}）",
            current.max_resolution,
            current.min_delivery_interval_ms,
            current.pdf_image_size_mm
        );
        Ok(())
    }

    /// 单格式导出：取源 → 编码 → 交付。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use qr_export::exporter::{
    ///     ExportConfig, ExportFormat, ExportOptions, ExportOrchestrator, MemoryDownloader,
    ///     MinIntervalGate, NativeCodec, SvgMarkupContainer,
    /// };
    ///
    /// # async fn demo() -> Result<(), qr_export::exporter::ExportError> {
    /// let orchestrator = ExportOrchestrator::new(
    ///     ExportConfig::default(),
    ///     Arc::new(NativeCodec::new()),
    ///     Arc::new(MemoryDownloader::new()),
    ///     Arc::new(MinIntervalGate::new()),
    /// )?;
    /// let container = SvgMarkupContainer::new(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
    /// orchestrator
    ///     .export_one(&container, &ExportOptions::new(ExportFormat::Png, "demo"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn export_one(
        &self,
        container: &dyn SourceContainer,
        options: &ExportOptions,
    ) -> Result<(), ExportError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let encoded = self.produce(container, options, &config).await?;

        let deliver_start = Instant::now();
        let file_name = encoded.artifact.file_name.clone();
        self.downloader.deliver(encoded.artifact).await;
        let deliver_elapsed = deliver_start.elapsed();

        log::info!(
            "✅ 导出完成 - {} rasterize={}ms encode={}ms deliver={}ms total={}ms",
            file_name,
            encoded.rasterize.as_millis(),
            encoded.encode.as_millis(),
            deliver_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );
        Ok(())
    }

    /// 批量导出全部格式，顺序固定，严格串行，首个失败即中止。
    pub async fn export_all(
        &self,
        container: &dyn SourceContainer,
        file_name_base: &str,
        resolution: u32,
        quality: u8,
    ) -> Result<(), ExportError> {
        let config = self.config_snapshot()?;
        let min_interval = Duration::from_millis(config.min_delivery_interval_ms);
        let total_start = Instant::now();

        for (index, format) in ExportFormat::BATCH_ORDER.into_iter().enumerate() {
            let options = ExportOptions {
                format,
                resolution,
                quality,
                include_frame: true,
                include_logo: true,
                file_name: file_name_base.to_string(),
            };

            let encoded = match self.produce(container, &options, &config).await {
                Ok(encoded) => encoded,
                Err(err) => {
                    log::warn!(
                        "🛑 批量导出中止于第 {}/{} 个格式（{}）：{}",
                        index + 1,
                        ExportFormat::BATCH_ORDER.len(),
                        format,
                        err
                    );
                    return Err(err);
                }
            };

            log::debug!(
                "📦 {} rasterize={}ms encode={}ms",
                encoded.artifact.file_name,
                encoded.rasterize.as_millis(),
                encoded.encode.as_millis()
            );
            self.throttle.acquire(min_interval).await;
            self.downloader.deliver(encoded.artifact).await;
        }

        log::info!(
            "✅ 批量导出完成 - {} 个格式 base={} resolution={} total={}ms",
            ExportFormat::BATCH_ORDER.len(),
            file_name_base,
            resolution,
            total_start.elapsed().as_millis()
        );
        Ok(())
    }

    /// 取源并编码，不交付。
    async fn produce(
        &self,
        container: &dyn SourceContainer,
        options: &ExportOptions,
        config: &ExportConfig,
    ) -> Result<Encoded, ExportError> {
        let source = container.vector_source().ok_or(ExportError::SourceNotFound)?;

        let needs_raster = describe(options.format).strategy != EncodeStrategy::Passthrough;
        if needs_raster && options.resolution > config.max_resolution {
            return Err(ExportError::Rasterization(format!(
                "分辨率过大：{}px（限制：{}px）",
                options.resolution, config.max_resolution
            )));
        }

        encoder::encode(self.codec.as_ref(), &source, options, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::{MemoryDownloader, MinIntervalGate, NativeCodec, SvgMarkupContainer};

    const QR_LIKE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 21 21"><path d="M0 0h7v7H0z"/></svg>"#;

    fn orchestrator(downloader: Arc<MemoryDownloader>) -> ExportOrchestrator {
        ExportOrchestrator::new(
            ExportConfig::default(),
            Arc::new(NativeCodec::new()),
            downloader,
            Arc::new(MinIntervalGate::new()),
        )
        .expect("orchestrator init failed")
    }

    #[tokio::test]
    async fn export_one_delivers_single_artifact() {
        let downloader = Arc::new(MemoryDownloader::new());
        let orchestrator = orchestrator(Arc::clone(&downloader));
        let container = SvgMarkupContainer::new(format!("<div>{}</div>", QR_LIKE));

        orchestrator
            .export_one(&container, &ExportOptions::new(ExportFormat::Svg, "demo"))
            .await
            .expect("svg export should succeed");

        let deliveries = downloader.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].artifact.file_name, "demo.svg");
        assert_eq!(deliveries[0].artifact.payload, QR_LIKE.as_bytes());
    }

    #[tokio::test]
    async fn missing_source_produces_nothing() {
        let downloader = Arc::new(MemoryDownloader::new());
        let orchestrator = orchestrator(Arc::clone(&downloader));
        let container = SvgMarkupContainer::new("<div class=\"qr\"></div>");

        let options = ExportOptions::new(ExportFormat::Png, "demo").with_resolution(1000);
        let result = orchestrator.export_one(&container, &options).await;

        assert!(matches!(result, Err(ExportError::SourceNotFound)));
        assert!(downloader.deliveries().is_empty());
    }

    #[tokio::test]
    async fn resolution_above_configured_limit_is_rejected() {
        let downloader = Arc::new(MemoryDownloader::new());
        let orchestrator = orchestrator(Arc::clone(&downloader));
        orchestrator
            .set_config(ExportConfig {
                max_resolution: 256,
                ..ExportConfig::default()
            })
            .expect("valid config");

        let container = SvgMarkupContainer::new(QR_LIKE);
        let options = ExportOptions::new(ExportFormat::Jpeg, "demo").with_resolution(257);
        let result = orchestrator.export_one(&container, &options).await;
        assert!(matches!(result, Err(ExportError::Rasterization(_))));

        // SVG 不栅格化，不受分辨率上限约束
        let svg = ExportOptions::new(ExportFormat::Svg, "demo").with_resolution(100_000);
        orchestrator
            .export_one(&container, &svg)
            .await
            .expect("svg ignores resolution");
        assert_eq!(downloader.file_names(), vec!["demo.svg"]);
    }

    #[test]
    fn set_config_rejects_invalid_values() {
        let orchestrator = orchestrator(Arc::new(MemoryDownloader::new()));
        let result = orchestrator.set_config(ExportConfig {
            min_delivery_interval_ms: 50,
            ..ExportConfig::default()
        });
        assert!(matches!(result, Err(ExportError::InvalidConfig(_))));

        let current = orchestrator.config_snapshot().expect("snapshot");
        assert_eq!(current, ExportConfig::default());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let result = ExportOrchestrator::new(
            ExportConfig {
                max_resolution: 0,
                ..ExportConfig::default()
            },
            Arc::new(NativeCodec::new()),
            Arc::new(MemoryDownloader::new()),
            Arc::new(MinIntervalGate::new()),
        );
        assert!(matches!(result, Err(ExportError::InvalidConfig(_))));
    }
}
