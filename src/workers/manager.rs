// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::queue::intake::WorkQueue;
use crate::workers::worker::{ProcessOutcome, Worker};

/// 工作器池的处理汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub published: u64,
    pub skipped: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl PoolReport {
    pub fn record(&mut self, outcome: ProcessOutcome) {
        match outcome {
            ProcessOutcome::Published => self.published += 1,
            ProcessOutcome::Skipped => self.skipped += 1,
            ProcessOutcome::Rejected => self.rejected += 1,
            ProcessOutcome::Failed => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: PoolReport) {
        self.published += other.published;
        self.skipped += other.skipped;
        self.rejected += other.rejected;
        self.failed += other.failed;
    }

    /// 已处理的候选仓库总数
    pub fn total(&self) -> u64 {
        self.published + self.skipped + self.rejected + self.failed
    }
}

/// 工作管理器
///
/// 固定数量的工作器共享同一个工作队列，队列关闭并取空后全部退出
pub struct WorkerManager {
    workers: Vec<Arc<dyn Worker>>,
}

impl WorkerManager {
    pub fn new(workers: Vec<Arc<dyn Worker>>) -> Self {
        Self { workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// 运行工作器直到队列取空
    pub async fn run(&self, queue: WorkQueue) -> PoolReport {
        info!("Starting {} workers", self.workers.len());
        let mut tasks = JoinSet::new();
        for worker in &self.workers {
            let worker = worker.clone();
            let queue = queue.clone();
            tasks.spawn(async move {
                let mut report = PoolReport::default();
                while let Some(repository) = queue.next().await {
                    let outcome = worker.process(repository).await;
                    report.record(outcome);
                }
                debug!("{} finished: {:?}", worker.name(), report);
                report
            });
        }
        drop(queue);

        let mut total = PoolReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => total.merge(report),
                Err(e) => error!("Worker task failed: {}", e),
            }
        }
        info!(
            "Workers done: {} published, {} skipped, {} rejected, {} failed",
            total.published, total.skipped, total.rejected, total.failed
        );
        total
    }
}
