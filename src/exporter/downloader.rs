//! # 交付（Downloader）
//!
//! ## 设计思路
//!
//! 交付是流水线的最后一步：把产物交给宿主的“保存到磁盘”原语。
//! 从流水线视角看交付总是成功的，宿主层面的保存失败只记日志，不进入错误体系。
//!
//! - `DirectoryDownloader`：写入本地目录，文件名为 `"{基础名}.{扩展名}"`
//! - `MemoryDownloader`：保存在内存里，附带交付时刻，适合嵌入式宿主与测试

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use super::source::ExportArtifact;

/// 宿主保存原语。
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn deliver(&self, artifact: ExportArtifact);
}

/// 写入指定目录。
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    directory: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 只取最后一段路径，防止文件名里的目录分隔符写出目标目录。
    fn target_path(&self, file_name: &str) -> PathBuf {
        let name = Path::new(file_name)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "qr-code".into());
        self.directory.join(name)
    }
}

#[async_trait]
impl Downloader for DirectoryDownloader {
    async fn deliver(&self, artifact: ExportArtifact) {
        let path = self.target_path(&artifact.file_name);

        match tokio::fs::write(&path, &artifact.payload).await {
            Ok(()) => log::info!(
                "💾 已保存 {}（{}，{} bytes）",
                path.display(),
                artifact.mime_type,
                artifact.payload.len()
            ),
            Err(err) => log::warn!("⚠️ 保存 {} 失败：{}", path.display(), err),
        }
    }
}

/// 一次交付记录。
#[derive(Debug, Clone)]
pub struct Delivery {
    pub artifact: ExportArtifact,
    pub delivered_at: Instant,
}

/// 内存交付：按顺序保存全部产物。
#[derive(Debug, Default)]
pub struct MemoryDownloader {
    deliveries: Mutex<Vec<Delivery>>,
}

impl MemoryDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按交付顺序返回快照。
    pub fn deliveries(&self) -> Vec<Delivery> {
        match self.deliveries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn file_names(&self) -> Vec<String> {
        self.deliveries()
            .into_iter()
            .map(|delivery| delivery.artifact.file_name)
            .collect()
    }
}

#[async_trait]
impl Downloader for MemoryDownloader {
    async fn deliver(&self, artifact: ExportArtifact) {
        let delivery = Delivery {
            artifact,
            delivered_at: Instant::now(),
        };
        match self.deliveries.lock() {
            Ok(mut guard) => guard.push(delivery),
            Err(poisoned) => poisoned.into_inner().push(delivery),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(file_name: &str) -> ExportArtifact {
        ExportArtifact {
            payload: b"<svg/>".to_vec(),
            file_name: file_name.to_string(),
            mime_type: "image/svg+xml",
        }
    }

    #[tokio::test]
    async fn directory_downloader_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let downloader = DirectoryDownloader::new(dir.path());

        downloader.deliver(artifact("demo.svg")).await;

        let written = std::fs::read(dir.path().join("demo.svg")).expect("file should exist");
        assert_eq!(written, b"<svg/>");
    }

    #[tokio::test]
    async fn directory_downloader_strips_path_components() {
        let dir = tempfile::tempdir().expect("tempdir");
        let downloader = DirectoryDownloader::new(dir.path());

        downloader.deliver(artifact("../escape/demo.svg")).await;

        assert!(dir.path().join("demo.svg").exists());
    }

    #[tokio::test]
    async fn directory_downloader_swallows_host_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let downloader = DirectoryDownloader::new(dir.path().join("missing"));

        // 目录不存在：只记日志，不 panic
        downloader.deliver(artifact("demo.svg")).await;
        assert!(!dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn memory_downloader_keeps_order() {
        let downloader = MemoryDownloader::new();
        downloader.deliver(artifact("a.png")).await;
        downloader.deliver(artifact("b.svg")).await;

        assert_eq!(downloader.file_names(), vec!["a.png", "b.svg"]);
    }
}
