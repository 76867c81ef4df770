//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 导出链路的所有失败都收敛到 `ExportError` 一个枚举里，调用侧可以按分支匹配，
//! 不需要解析字符串。
//!
//! - `SourceNotFound`：容器里找不到矢量元素
//! - `Rasterization`：矢量解析/绘制失败、分辨率非法、画布分配失败
//! - `Encoding`：目标格式编码失败，或编码产物与声明的 MIME 不符
//!
//! 另外两个分支只出现在外围：从文本解析格式名（`UnsupportedFormat`）
//! 与配置校验（`InvalidConfig`）。

/// 导出流水线统一错误类型。
///
/// 编排器不吞错，全部原样上抛给宿主，由宿主决定如何提示用户。
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("未找到二维码 SVG 元素")]
    SourceNotFound,

    #[error("栅格化错误：{0}")]
    Rasterization(String),

    #[error("编码错误：{0}")]
    Encoding(String),

    #[error("不支持的导出格式：{0}")]
    UnsupportedFormat(String),

    #[error("配置错误：{0}")]
    InvalidConfig(String),
}

impl ExportError {
    /// 稳定错误码，供宿主做分支提示或埋点。
    pub fn code(&self) -> &'static str {
        match self {
            Self::SourceNotFound => "E_SOURCE_NOT_FOUND",
            Self::Rasterization(_) => "E_RASTERIZE",
            Self::Encoding(_) => "E_ENCODE",
            Self::UnsupportedFormat(_) => "E_FORMAT",
            Self::InvalidConfig(_) => "E_CONFIG",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::SourceNotFound => "resolve",
            Self::Rasterization(_) => "rasterize",
            Self::Encoding(_) => "encode",
            Self::UnsupportedFormat(_) => "parse",
            Self::InvalidConfig(_) => "config",
        }
    }
}

impl From<ExportError> for String {
    fn from(error: ExportError) -> Self {
        error.to_string()
    }
}
