//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 导出流水线内部使用 `ExportError`，宿主侧（设置文件、输出目录、命令行入口）
//! 另有自己的失败来源。`AppError` 把两者合并成宿主可直接展示的一种错误。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ExportError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，宿主可原样转发给前端。

use serde::Serialize;

use crate::exporter::ExportError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 导出流水线错误（取源 / 栅格化 / 编码）
    #[error("{0}")]
    Export(#[from] ExportError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件无法解析
    #[error("设置文件错误: {0}")]
    Settings(String),

    /// 输出目录不可用
    #[error("输出目录不可用: {0}")]
    Storage(String),
}

/// 序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
