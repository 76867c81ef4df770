//! # 配置模块
//!
//! ## 设计思路
//!
//! 两类参数分开管理：
//! - `ExportConfig`：进程级策略（分辨率上限、批量节流间隔、默认文件名、PDF 版面），
//!   可运行时调整，单次导出使用快照
//! - `ExportOptions`：单次导出请求（格式、分辨率、质量、文件名）
//!
//! ## 实现思路
//!
//! - `Default` 给出可直接使用的配置
//! - `validate` 集中做区间校验，`set_config` 前必须通过
//! - `quality` 对无损格式“接受但忽略”，对有损格式夹到 `[1, 100]`

use serde::{Deserialize, Serialize};

use super::format::describe;
use super::{ExportError, ExportFormat};

/// 批量导出两次交付之间的最小间隔下限（毫秒）。
pub const MIN_DELIVERY_INTERVAL_FLOOR_MS: u64 = 300;

/// `max_resolution` 可配置的最大值（像素），也是本地栅格化的硬上限。
pub const MAX_RESOLUTION_CEILING: u32 = 16_384;

/// A4 纸宽（毫米），内嵌图边长不得超过它。
const A4_WIDTH_MM: f32 = 210.0;

/// 导出策略配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// 栅格化边长上限（像素），超出直接拒绝，不分配画布。
    pub max_resolution: u32,
    /// 批量导出相邻两次交付的最小间隔（毫秒），不得低于 300。
    pub min_delivery_interval_ms: u64,
    /// 请求文件名为空时使用的基础名。
    pub default_file_name: String,
    /// PDF 页面上二维码方块的边长（毫米）。
    pub pdf_image_size_mm: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_resolution: 8192,
            min_delivery_interval_ms: MIN_DELIVERY_INTERVAL_FLOOR_MS,
            default_file_name: "qr-code".to_string(),
            pdf_image_size_mm: 100.0,
        }
    }
}

impl ExportConfig {
    /// 校验各字段区间。
    pub fn validate(&self) -> Result<(), ExportError> {
        if !(1..=MAX_RESOLUTION_CEILING).contains(&self.max_resolution) {
            return Err(ExportError::InvalidConfig(format!(
                "max_resolution 必须在 1~{} 像素之间",
                MAX_RESOLUTION_CEILING
            )));
        }
        if self.min_delivery_interval_ms < MIN_DELIVERY_INTERVAL_FLOOR_MS {
            return Err(ExportError::InvalidConfig(format!(
                "min_delivery_interval_ms 不能小于 {}ms",
                MIN_DELIVERY_INTERVAL_FLOOR_MS
            )));
        }
        if self.default_file_name.trim().is_empty() {
            return Err(ExportError::InvalidConfig("default_file_name 不能为空".to_string()));
        }
        if !(self.pdf_image_size_mm > 0.0 && self.pdf_image_size_mm <= A4_WIDTH_MM) {
            return Err(ExportError::InvalidConfig(format!(
                "pdf_image_size_mm 必须在 (0, {}] 毫米之间",
                A4_WIDTH_MM
            )));
        }
        Ok(())
    }
}

/// 单次导出请求。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// 栅格边长（像素），常见 300~4000。
    pub resolution: u32,
    /// 1~100，仅对有损格式生效。
    pub quality: u8,
    pub include_frame: bool,
    pub include_logo: bool,
    /// 不含扩展名的文件名。
    pub file_name: String,
}

impl ExportOptions {
    /// 以界面默认值（1000px、质量 85）构造请求。
    pub fn new(format: ExportFormat, file_name: impl Into<String>) -> Self {
        Self {
            format,
            resolution: 1000,
            quality: 85,
            include_frame: true,
            include_logo: true,
            file_name: file_name.into(),
        }
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// 实际生效的质量：无损格式返回 `None`。
    pub fn effective_quality(&self) -> Option<u8> {
        if describe(self.format).is_lossy {
            Some(self.quality.clamp(1, 100))
        } else {
            None
        }
    }

    /// `"{base}.{ext}"`，扩展名取自格式目录。
    pub fn artifact_file_name(&self, fallback_base: &str) -> String {
        let trimmed = self.file_name.trim();
        let base = if trimmed.is_empty() { fallback_base } else { trimmed };
        format!("{}.{}", base, describe(self.format).file_extension)
    }
}
