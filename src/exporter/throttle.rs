//! # 交付节流
//!
//! ## 设计思路
//!
//! 宿主对短时间内连续触发的下载有拦截策略，批量导出必须在两次交付之间留出间隔。
//! 节流策略抽象为 `DeliveryThrottle`，注入编排器，可单独测试、可替换。
//!
//! `MinIntervalGate`：两次放行之间至少间隔 `min_interval`，间隔是下限而不是精确值。
//! 间隔由调用方每次传入（编排器取自配置快照），闸门本身只记录上次放行时刻，
//! 运行时调整配置后下一次放行立即生效。

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// 交付前的放行闸门。
#[async_trait]
pub trait DeliveryThrottle: Send + Sync {
    /// 等到距上次放行至少 `min_interval` 为止。
    async fn acquire(&self, min_interval: Duration);
}

/// 最小间隔闸门。
#[derive(Debug, Default)]
pub struct MinIntervalGate {
    last_release: Mutex<Option<Instant>>,
}

impl MinIntervalGate {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryThrottle for MinIntervalGate {
    async fn acquire(&self, min_interval: Duration) {
        // 持锁等待，并发调用方按顺序依次放行
        let mut last_release = self.last_release.lock().await;

        if let Some(last) = *last_release {
            let deadline = last + min_interval;
            if deadline > Instant::now() {
                log::debug!(
                    "⏳ 交付节流：等待 {}ms",
                    deadline.saturating_duration_since(Instant::now()).as_millis()
                );
                tokio::time::sleep_until(deadline).await;
            }
        }

        *last_release = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const INTERVAL: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn first_acquire_is_immediate() {
        let gate = MinIntervalGate::new();
        let started = Instant::now();
        gate.acquire(INTERVAL).await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_acquires_are_spaced_by_interval() {
        let gate = MinIntervalGate::new();
        let mut releases = Vec::new();

        for _ in 0..4 {
            gate.acquire(INTERVAL).await;
            releases.push(Instant::now());
        }

        for pair in releases.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(300));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_work_counts_towards_interval() {
        let gate = MinIntervalGate::new();
        gate.acquire(INTERVAL).await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        let before = Instant::now();
        gate.acquire(INTERVAL).await;

        let waited = Instant::now() - before;
        assert!(waited >= Duration::from_millis(100));
        assert!(waited < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_serialized() {
        let gate = Arc::new(MinIntervalGate::new());
        let mut handles = Vec::new();

        for _ in 0..3 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.acquire(INTERVAL).await;
                Instant::now()
            }));
        }

        let mut releases = Vec::new();
        for handle in handles {
            releases.push(handle.await.expect("task should not panic"));
        }
        releases.sort();

        for pair in releases.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(300));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_applies_to_next_release() {
        let gate = MinIntervalGate::new();
        gate.acquire(INTERVAL).await;

        let before = Instant::now();
        gate.acquire(Duration::from_millis(2000)).await;
        assert!(Instant::now() - before >= Duration::from_millis(2000));

        let before = Instant::now();
        gate.acquire(INTERVAL).await;
        let waited = Instant::now() - before;
        assert!(waited >= INTERVAL);
        assert!(waited < Duration::from_millis(2000));
    }
}
