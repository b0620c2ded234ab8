// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::models::blacklist::BlacklistSnapshot;
use crate::infrastructure::metrics::{CounterSink, REPOSITORY_BLACKLISTED};
use crate::queue::intake::{IntakeReceiver, WorkSender};

/// 黑名单过滤器
///
/// 在过滤开始前取得黑名单快照，然后流式地把入口通道中的候选仓库
/// 分为两类：转发给工作器池，或记录其外部 id 以便从已发布索引中删除。
/// 同一克隆地址在一次运行中只转发一次（组织与用户两个入口可能列出同一批仓库）。
pub struct BlacklistFilter {
    snapshot: BlacklistSnapshot,
    counters: Arc<dyn CounterSink>,
}

impl BlacklistFilter {
    pub fn new(snapshot: BlacklistSnapshot, counters: Arc<dyn CounterSink>) -> Self {
        Self { snapshot, counters }
    }

    /// 取空入口通道，返回需要删除的外部 id（每个 id 只出现一次）
    ///
    /// 函数返回时 `work` 被释放，工作器在取空队列后退出
    pub async fn run(self, mut intake: IntakeReceiver, work: WorkSender) -> Vec<String> {
        let mut to_be_removed = Vec::new();
        let mut seen = HashSet::new();
        let mut forwarded_urls = HashSet::new();
        let mut forwarded = 0usize;
        let mut pool_closed = false;

        while let Some(repository) = intake.recv().await {
            if let Some(id) = self.snapshot.get(repository.git_clone_url.trim()) {
                warn!("Marked as blacklisted {} ({})", repository.git_clone_url, id);
                self.counters.increment(REPOSITORY_BLACKLISTED);
                if seen.insert(id.clone()) {
                    to_be_removed.push(id.clone());
                }
                continue;
            }

            if pool_closed {
                continue;
            }
            if !forwarded_urls.insert(repository.git_clone_url.trim().to_string()) {
                debug!("Skipping duplicate candidate {}", repository.git_clone_url);
                continue;
            }
            let name = repository.name.clone();
            if work.send(repository).await.is_err() {
                // Keep draining so every blacklisted candidate is still reported
                error!("Worker pool closed, dropping {} and the remaining candidates", name);
                pool_closed = true;
            } else {
                forwarded += 1;
            }
        }

        info!(
            "Blacklist filter forwarded {} candidates, {} marked for removal",
            forwarded,
            to_be_removed.len()
        );
        to_be_removed
    }
}
