//! 命令行参数
//!
//! `qr-export <svg-file> [output-dir] --resolution 1000 --quality 85`

use std::path::PathBuf;

use clap::Parser;

use crate::exporter::MAX_RESOLUTION_CEILING;

/// 把 SVG 二维码按 png → svg → pdf → webp → jpeg 顺序全部导出到目录
#[derive(Parser, Debug)]
#[command(name = "qr-export")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// 矢量二维码文件（SVG 或包含 `<svg>` 的 HTML 片段）
    pub svg_path: PathBuf,

    /// 输出目录，缺省为 ./exports，不存在时自动创建
    pub output_dir: Option<String>,

    /// 栅格边长（像素）
    #[arg(
        short,
        long,
        default_value_t = 1000,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RESOLUTION_CEILING))
    )]
    pub resolution: u32,

    /// 有损格式质量（1~100）
    #[arg(short, long, default_value_t = 85, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// 导出配置 JSON 文件
    #[arg(short, long, env = "QR_EXPORT_SETTINGS")]
    pub settings: Option<PathBuf>,
}
