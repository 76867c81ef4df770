//! # 二维码导出：命令行入口
//!
//! 读取 SVG 二维码，按固定顺序导出全部五种格式到输出目录。
//! 参数定义见 `qr_export::cli`。

use std::process::ExitCode;

use clap::Parser;
use qr_export::cli::Cli;
use qr_export::error::AppError;
use qr_export::exporter::{ExportConfig, ExportService, SvgMarkupContainer, describe_all, estimate};
use qr_export::{settings, storage};

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.settings {
        Some(path) => settings::load_export_config(path)?,
        None => ExportConfig::default(),
    };

    let output_dir = storage::resolve_output_dir(cli.output_dir)?;
    let markup = tokio::fs::read_to_string(&cli.svg_path).await?;
    let base_name = cli
        .svg_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| config.default_file_name.clone());

    for descriptor in describe_all() {
        log::info!(
            "📦 {} 预估 {}",
            descriptor.display_label,
            estimate(descriptor.format, cli.resolution, cli.quality)
        );
    }

    let service = ExportService::to_directory(output_dir.clone(), config)?;
    service
        .export_all(
            &SvgMarkupContainer::new(markup),
            &base_name,
            cli.resolution,
            cli.quality,
        )
        .await?;

    log::info!("📁 已导出到 {}", output_dir.display());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ 导出失败: {err}");
            ExitCode::FAILURE
        }
    }
}
