//! 工作池（WorkerPool）
//!
//! 有界的并发执行池：每个提交的任务在独立的 tokio 任务中运行，持有一个许可直到结束。
//! 许可耗尽时按 `SaturationPolicy` 处理：
//! - `Backpressure`：提交方等待空闲许可（派发循环暂停取队列，发布方不受影响）；
//! - `Reject`：立即拒绝，由提交方记录并丢弃。
//!
//! 池本身不处理任务内的错误；错误由提交方（派发循环）在任务内部捕获。
//!
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 默认并发上限
pub const DEFAULT_MAX_WORKERS: usize = 256;

/// 池满时的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaturationPolicy {
    #[default]
    Backpressure,
    Reject,
}

/// 可克隆的池句柄，可在多个通道间共享
#[derive(Clone, Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    max_workers: usize,
    saturation: SaturationPolicy,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::bounded(DEFAULT_MAX_WORKERS)
    }
}

impl WorkerPool {
    pub fn new(max_workers: usize, saturation: SaturationPolicy) -> Self {
        let max_workers = max_workers
            .clamp(1, u32::MAX as usize)
            .min(Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            saturation,
        }
    }

    pub fn bounded(max_workers: usize) -> Self {
        Self::new(max_workers, SaturationPolicy::Backpressure)
    }

    /// 调度一个任务并发执行；被拒绝（或池已关闭）时返回 false
    pub async fn execute<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permit = match self.saturation {
            SaturationPolicy::Backpressure => self.permits.clone().acquire_owned().await.ok(),
            SaturationPolicy::Reject => self.permits.clone().try_acquire_owned().ok(),
        };

        let Some(permit) = permit else {
            return false;
        };

        tokio::spawn(async move {
            let _permit = permit;
            task.await;
        });
        true
    }

    /// 正在运行的任务数
    pub fn active(&self) -> usize {
        self.max_workers - self.permits.available_permits()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn saturation(&self) -> SaturationPolicy {
        self.saturation
    }

    /// 等待所有在途任务结束
    pub async fn wait_idle(&self) {
        // 只有在所有许可都归还后才能一次拿齐
        let _all = self.permits.acquire_many(self.max_workers as u32).await;
    }
}
