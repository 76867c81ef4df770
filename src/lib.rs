//! # 二维码多格式导出：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              宿主（命令行 / 桌面壳 / 服务端）             │
//! │                                                          │
//! │  选择格式·分辨率·质量 ── 预估体积 ── 单个导出 / 全部导出   │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Result<(), AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ exporter ─── 格式目录 + 编码策略表                    │
//! │  │   ├─ native        resvg / image / webp / lopdf        │
//! │  │   ├─ estimate      体积预估                            │
//! │  │   ├─ throttle      批量交付节流                        │
//! │  │   └─ downloader    交付到目录 / 内存                   │
//! │  │                                                       │
//! │  ├─ cli               命令行参数                          │
//! │  ├─ settings          导出配置 JSON 读写                  │
//! │  └─ storage           输出目录 (返回 Result)              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`cli`] | 命令行参数（clap derive） |
//! | [`error`] | 统一错误类型 `AppError`，宿主入口的返回类型 |
//! | [`exporter`] | 矢量二维码 → SVG / PNG / WebP / JPEG / PDF，单个与批量导出 |
//! | [`settings`] | 从 JSON 文件读取、保存 `ExportConfig` |
//! | [`storage`] | 输出目录的获取与自动创建 |

pub mod cli;
pub mod error;
pub mod exporter;
pub mod settings;
pub mod storage;
