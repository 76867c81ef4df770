//! # 格式目录（FormatCatalog）
//!
//! ## 设计思路
//!
//! 支持的导出格式是一个封闭集合，每种格式的展示名、扩展名、MIME、是否有损、
//! 以及“怎么编码”都登记在一张静态表里。
//! 编排器只查表拿 `EncodeStrategy`，新增格式只改表，不改控制流。
//!
//! ## 实现思路
//!
//! - `CATALOG` 按批量导出顺序排列：png → svg → pdf → webp → jpeg
//! - `describe` 是枚举上的全函数，通过 `match` 取下标，不存在查不到的情况
//! - 分辨率预设仅供界面选择，不约束实际分辨率

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ExportError;

/// 导出格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
    Pdf,
    Webp,
    Jpeg,
}

impl ExportFormat {
    /// 批量导出的固定顺序。
    pub const BATCH_ORDER: [ExportFormat; 5] = [
        ExportFormat::Png,
        ExportFormat::Svg,
        ExportFormat::Pdf,
        ExportFormat::Webp,
        ExportFormat::Jpeg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Webp => "webp",
            Self::Jpeg => "jpeg",
        }
    }

    /// 便捷访问：本格式在目录中的描述。
    pub fn descriptor(self) -> &'static FormatDescriptor {
        describe(self)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    /// 大小写不敏感；`jpg` 视为 `jpeg`。
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "webp" => Ok(Self::Webp),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(ExportError::UnsupportedFormat(format!(
                "{}（可选：png / svg / pdf / webp / jpeg）",
                other
            ))),
        }
    }
}

/// 栅格编码目标。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterEncoding {
    /// 无损。
    Png,
    /// 有损，质量 `quality / 100`。
    Webp,
    /// 有损，无透明通道。
    Jpeg,
}

impl RasterEncoding {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn is_lossy(self) -> bool {
        !matches!(self, Self::Png)
    }
}

/// 编码策略：格式 → 编码器的映射项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStrategy {
    /// 矢量原文直出，不经过栅格化。
    Passthrough,
    /// 先栅格化，再按目标编码。
    Raster(RasterEncoding),
    /// 先栅格化，转无损中间栅格，再嵌入 A4 文档页。
    Document,
}

/// 格式描述，进程内只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub format: ExportFormat,
    pub display_label: &'static str,
    pub description: &'static str,
    pub file_extension: &'static str,
    pub mime_type: &'static str,
    /// 仅 webp / jpeg 为 `true`。
    pub is_lossy: bool,
    pub strategy: EncodeStrategy,
}

static CATALOG: [FormatDescriptor; 5] = [
    FormatDescriptor {
        format: ExportFormat::Png,
        display_label: "PNG",
        description: "Best for general use — crisp, lossless",
        file_extension: "png",
        mime_type: "image/png",
        is_lossy: false,
        strategy: EncodeStrategy::Raster(RasterEncoding::Png),
    },
    FormatDescriptor {
        format: ExportFormat::Svg,
        display_label: "SVG",
        description: "Scalable vector — perfect for print",
        file_extension: "svg",
        mime_type: "image/svg+xml",
        is_lossy: false,
        strategy: EncodeStrategy::Passthrough,
    },
    FormatDescriptor {
        format: ExportFormat::Pdf,
        display_label: "PDF",
        description: "Print-ready A4 document",
        file_extension: "pdf",
        mime_type: "application/pdf",
        is_lossy: false,
        strategy: EncodeStrategy::Document,
    },
    FormatDescriptor {
        format: ExportFormat::Webp,
        display_label: "WebP",
        description: "Modern web format — smaller file size",
        file_extension: "webp",
        mime_type: "image/webp",
        is_lossy: true,
        strategy: EncodeStrategy::Raster(RasterEncoding::Webp),
    },
    FormatDescriptor {
        format: ExportFormat::Jpeg,
        display_label: "JPEG",
        description: "Universal compatibility",
        file_extension: "jpeg",
        mime_type: "image/jpeg",
        is_lossy: true,
        strategy: EncodeStrategy::Raster(RasterEncoding::Jpeg),
    },
];

/// 查询单个格式的描述。
pub fn describe(format: ExportFormat) -> &'static FormatDescriptor {
    let index = match format {
        ExportFormat::Png => 0,
        ExportFormat::Svg => 1,
        ExportFormat::Pdf => 2,
        ExportFormat::Webp => 3,
        ExportFormat::Jpeg => 4,
    };
    &CATALOG[index]
}

/// 全部格式描述，顺序与批量导出一致。
pub fn describe_all() -> &'static [FormatDescriptor] {
    &CATALOG
}

/// 分辨率预设（界面便捷项）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionPreset {
    pub label: &'static str,
    pub pixel_value: u32,
    pub tag: &'static str,
}

pub const RESOLUTION_PRESETS: [ResolutionPreset; 4] = [
    ResolutionPreset { label: "Low (300px)", pixel_value: 300, tag: "Web" },
    ResolutionPreset { label: "Medium (1000px)", pixel_value: 1000, tag: "Social" },
    ResolutionPreset { label: "High (2000px)", pixel_value: 2000, tag: "Print" },
    ResolutionPreset { label: "Ultra (4000px)", pixel_value: 4000, tag: "Banner" },
];
