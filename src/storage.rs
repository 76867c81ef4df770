//! 输出目录管理模块
//!
//! # 设计思路
//!
//! 统一管理导出文件的落盘目录，支持调用方自定义，
//! 并在目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 优先使用调用方给出的目录。
//! - 未给出时回退到当前工作目录下的 `exports` 子目录。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::PathBuf;

use crate::error::AppError;

/// 默认输出子目录名。
pub const DEFAULT_EXPORT_DIR: &str = "exports";

/// 获取输出目录
///
/// # 参数
/// * `custom_dir` - 自定义目录（可选）
///
/// # 返回
/// - `Ok(PathBuf)`：可用的输出目录
/// - `Err(AppError::Storage)`：无法获取或创建目录
pub fn resolve_output_dir(custom_dir: Option<String>) -> Result<PathBuf, AppError> {
    let path = match custom_dir {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => std::env::current_dir()
            .map_err(|e| AppError::Storage(format!("获取当前目录失败: {}", e)))?
            .join(DEFAULT_EXPORT_DIR),
    };

    if path.exists() && !path.is_dir() {
        return Err(AppError::Storage(format!("'{}' 不是目录", path.display())));
    }

    if !path.exists() {
        fs::create_dir_all(&path).map_err(|e| {
            AppError::Storage(format!("创建目录 '{}' 失败: {}", path.display(), e))
        })?;
    }

    Ok(path)
}
