use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::exporter::ExportConfig;

/// 从 JSON 设置文件读取导出配置。
///
/// 文件不存在时返回默认配置；缺省字段取默认值。
pub fn load_export_config(path: &Path) -> Result<ExportConfig, AppError> {
    if !path.exists() {
        log::debug!("设置文件 {} 不存在，使用默认导出配置", path.display());
        return Ok(ExportConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str::<ExportConfig>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    config.validate()?;
    Ok(config)
}

/// 把导出配置写回 JSON 设置文件。
pub fn save_export_config(path: &Path, config: &ExportConfig) -> Result<(), AppError> {
    config.validate()?;

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::ExportError;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_export_config(&dir.path().join("settings.json")).expect("defaults");
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let config = ExportConfig {
            max_resolution: 4096,
            min_delivery_interval_ms: 500,
            ..ExportConfig::default()
        };

        save_export_config(&path, &config).expect("save");
        assert_eq!(load_export_config(&path).expect("load"), config);
    }

    #[test]
    fn rejects_malformed_and_invalid_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");

        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(load_export_config(&path), Err(AppError::Settings(_))));

        fs::write(&path, r#"{ "min_delivery_interval_ms": 100 }"#).expect("write");
        assert!(matches!(
            load_export_config(&path),
            Err(AppError::Export(ExportError::InvalidConfig(_)))
        ));
    }
}
