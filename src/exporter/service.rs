//! # 服务层
//!
//! ## 设计思路
//!
//! `ExportService` 把本地实现（`NativeCodec`、`MinIntervalGate`）与交付方式装配好，
//! 宿主只需给出输出目录或自定义 `Downloader`。
//! 节流间隔、分辨率上限只保存在编排器的 `ExportConfig` 里，
//! 闸门与编解码器不持有配置副本，运行时调整后无需重建服务。

use std::path::PathBuf;
use std::sync::Arc;

use super::downloader::{DirectoryDownloader, Downloader};
use super::format::{FormatDescriptor, describe_all};
use super::source::SourceContainer;
use super::{
    ExportConfig, ExportError, ExportFormat, ExportOptions, ExportOrchestrator, MinIntervalGate,
    NativeCodec, estimate,
};

/// 导出服务。
pub struct ExportService {
    orchestrator: ExportOrchestrator,
}

impl ExportService {
    /// 导出到本地目录。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use qr_export::exporter::{ExportConfig, ExportService, SvgMarkupContainer};
    ///
    /// # async fn demo() -> Result<(), qr_export::exporter::ExportError> {
    /// let service = ExportService::to_directory("./exports", ExportConfig::default())?;
    /// let container = SvgMarkupContainer::new(std::fs::read_to_string("qr.svg").unwrap_or_default());
    /// service.export_all(&container, "zaplink-qr-code", 1000, 85).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_directory(
        directory: impl Into<PathBuf>,
        config: ExportConfig,
    ) -> Result<Self, ExportError> {
        Self::with_downloader(Arc::new(DirectoryDownloader::new(directory)), config)
    }

    /// 使用自定义交付方式。
    pub fn with_downloader(
        downloader: Arc<dyn Downloader>,
        config: ExportConfig,
    ) -> Result<Self, ExportError> {
        config.validate()?;

        let orchestrator = ExportOrchestrator::new(
            config,
            Arc::new(NativeCodec::new()),
            downloader,
            Arc::new(MinIntervalGate::new()),
        )?;

        Ok(Self { orchestrator })
    }

    pub async fn export_one(
        &self,
        container: &dyn SourceContainer,
        options: &ExportOptions,
    ) -> Result<(), ExportError> {
        self.orchestrator.export_one(container, options).await
    }

    pub async fn export_all(
        &self,
        container: &dyn SourceContainer,
        file_name_base: &str,
        resolution: u32,
        quality: u8,
    ) -> Result<(), ExportError> {
        self.orchestrator
            .export_all(container, file_name_base, resolution, quality)
            .await
    }

    /// 预估体积展示文本。
    pub fn estimate(&self, format: ExportFormat, resolution: u32, quality: u8) -> String {
        estimate(format, resolution, quality)
    }

    /// 支持的全部格式。
    pub fn formats(&self) -> &'static [FormatDescriptor] {
        describe_all()
    }

    pub fn orchestrator(&self) -> &ExportOrchestrator {
        &self.orchestrator
    }
}
