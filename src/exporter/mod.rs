//! # 二维码多格式导出模块（exporter）
//!
//! ## 设计思路
//!
//! 同一张矢量二维码，按调用方选择的分辨率与质量，输出五种格式：
//! SVG 直出、PNG / WebP / JPEG 栅格、A4 单页 PDF；另有批量导出一次交付全部格式。
//! 各阶段按职责拆分为子模块：
//!
//! - `format`：格式目录，格式 → 编码策略的静态表
//! - `source`：矢量源、容器、栅格画布、交付物
//! - `codec`：宿主能力抽象 `ImageCodec` + 临时句柄 RAII
//! - `native`：进程内实现（resvg / image / webp / lopdf）
//! - `encoder`：按策略分派的编码器
//! - `estimate`：体积预估
//! - `throttle`：批量交付节流
//! - `downloader`：交付到宿主
//! - `handler`：编排单格式与批量导出
//! - `service`：装配好的对外服务
//! - `config/error`：配置与错误
//!
//! ## 新同事快速上手
//!
//! ```text
//! 宿主（用户点击导出）
//!    ↓
//! service.rs（装配 NativeCodec + Downloader + 节流）
//!    ↓
//! handler.rs（配置快照 + 取源 + 阶段耗时日志）
//!    ├─ format.rs（查策略）
//!    ├─ encoder.rs（直出 / 栅格编码 / 文档嵌入）
//!    │     └─ native.rs（栅格化 + 各格式编码）
//!    ├─ throttle.rs（批量模式：交付前等待最小间隔）
//!    └─ downloader.rs（保存）
//!    ↓
//! 返回 ExportError 给宿主
//! ```

mod codec;
mod config;
mod downloader;
mod encoder;
mod error;
mod estimate;
mod format;
mod handler;
mod native;
mod service;
mod source;
mod throttle;

pub use codec::{A4_PAGE_MM, BlobHandle, BlobRegistry, ImageCodec, PageLayout};
pub use config::{
    ExportConfig, ExportOptions, MAX_RESOLUTION_CEILING, MIN_DELIVERY_INTERVAL_FLOOR_MS,
};
pub use downloader::{Delivery, DirectoryDownloader, Downloader, MemoryDownloader};
pub use error::ExportError;
pub use estimate::{estimate, estimate_kb};
pub use format::{
    EncodeStrategy, ExportFormat, FormatDescriptor, RESOLUTION_PRESETS, RasterEncoding,
    ResolutionPreset, describe, describe_all,
};
pub use handler::ExportOrchestrator;
pub use native::NativeCodec;
pub use service::ExportService;
pub use source::{ExportArtifact, RasterSurface, SourceContainer, SvgMarkupContainer, VectorSource};
pub use throttle::{DeliveryThrottle, MinIntervalGate};
