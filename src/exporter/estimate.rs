//! # 体积预估
//!
//! 纯函数，只用于界面提示，不参与任何正确性判断。
//!
//! | 格式 | 估算（KB） |
//! |------|-----------|
//! | svg  | 固定 5 |
//! | pdf  | `100 + 分辨率 / 1000 * 60` |
//! | png  | `(分辨率 / 300)^2 * 50` |
//! | webp | `png * 质量 / 100 * 0.4` |
//! | jpeg | `png * 质量 / 100 * 0.6` |
//!
//! 展示规则：≥ 1024 KB 以 MB 显示（一位小数），否则取整显示 KB，统一带 `~` 前缀。

use super::ExportFormat;

/// SVG 体积落在 3~7 KB 区间，取中值。
const SVG_ESTIMATE_KB: f64 = 5.0;

/// 估算体积（KB）。
pub fn estimate_kb(format: ExportFormat, resolution: u32, quality: u8) -> f64 {
    let resolution = f64::from(resolution);
    let quality_ratio = f64::from(quality) / 100.0;
    let png_kb = (resolution / 300.0).powi(2) * 50.0;

    match format {
        ExportFormat::Svg => SVG_ESTIMATE_KB,
        ExportFormat::Pdf => 100.0 + (resolution / 1000.0) * 60.0,
        ExportFormat::Png => png_kb,
        ExportFormat::Webp => png_kb * quality_ratio * 0.4,
        ExportFormat::Jpeg => png_kb * quality_ratio * 0.6,
    }
}

/// 估算体积并格式化为展示文本。
///
/// # 示例
/// ```rust
/// use qr_export::exporter::{ExportFormat, estimate};
///
/// assert_eq!(estimate(ExportFormat::Png, 300, 100), "~50 KB");
/// assert_eq!(estimate(ExportFormat::Pdf, 1000, 100), "~160 KB");
/// ```
pub fn estimate(format: ExportFormat, resolution: u32, quality: u8) -> String {
    format_size(estimate_kb(format, resolution, quality))
}

fn format_size(size_kb: f64) -> String {
    if size_kb >= 1024.0 {
        format!("~{:.1} MB", size_kb / 1024.0)
    } else {
        format!("~{} KB", size_kb.round() as u64)
    }
}
