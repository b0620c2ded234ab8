// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::application::context::CrawlerContext;
use crate::domain::models::blacklist::BlacklistSnapshot;
use crate::domain::models::publisher::Publisher;
use crate::queue::blacklist_filter::BlacklistFilter;
use crate::queue::intake::{intake_channel, work_channel, IntakeReceiver};
use crate::utils::errors::CrawlError;
use crate::workers::{PoolReport, RepositoryWorker, Worker, WorkerManager};

/// 一次爬取的结果汇总
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// 工作器池的处理汇总
    pub report: PoolReport,
    /// 需要从已发布索引中删除的外部标识（黑名单命中）
    pub blacklisted: Vec<String>,
}

/// 爬取用例
///
/// 编排生产者、黑名单过滤器、工作器池和索引发布器。
/// 两个入口都在整条流水线（包括刷新与别名更新）完成后才返回。
pub struct CrawlUseCase {
    context: Arc<CrawlerContext>,
}

impl CrawlUseCase {
    pub fn new(context: Arc<CrawlerContext>) -> Self {
        Self { context }
    }

    fn worker_pool(&self) -> WorkerManager {
        let count = self.context.settings.crawler.workers.max(1);
        let workers = (0..count)
            .map(|id| Arc::new(RepositoryWorker::new(self.context.clone(), id)) as Arc<dyn Worker>)
            .collect();
        WorkerManager::new(workers)
    }

    /// 爬取单个仓库
    ///
    /// 不经过黑名单：用空快照运行过滤器，保持与批量爬取相同的流水线
    #[instrument(skip(self, publisher), fields(publisher = %publisher.name))]
    pub async fn crawl_single_repository(
        &self,
        repo_url: &str,
        publisher: Publisher,
    ) -> Result<CrawlSummary, CrawlError> {
        let (intake_tx, intake_rx) = intake_channel();
        self.context
            .producer()
            .produce_single(repo_url, Arc::new(publisher), intake_tx)
            .await?;

        let summary = self.drain(BlacklistSnapshot::new(), intake_rx).await?;
        self.context.publisher.finalize().await?;
        Ok(summary)
    }

    /// 爬取所有发布者
    ///
    /// 黑名单快照在过滤开始前读取一次。返回命中黑名单的外部标识，
    /// 由调用方决定何时从已发布索引中删除
    #[instrument(skip_all, fields(publishers = publishers.len()))]
    pub async fn crawl_publishers(
        &self,
        publishers: Vec<Publisher>,
    ) -> Result<CrawlSummary, CrawlError> {
        let snapshot = self.context.blacklist.list_blacklisted().await?;
        info!("{} blacklisted repositories loaded", snapshot.len());

        let (intake_tx, intake_rx) = intake_channel();
        let producer = self.context.producer();
        let publishers = publishers.into_iter().map(Arc::new).collect();
        let producing =
            tokio::spawn(async move { producer.produce_publishers(publishers, intake_tx).await });

        let summary = self.drain(snapshot, intake_rx).await;
        // The producer owns the intake sender, so it has finished once the filter returned
        producing.await?;
        let summary = summary?;

        self.context.publisher.finalize().await?;
        Ok(summary)
    }

    /// 过滤入口通道并运行工作器池，直到工作通道取空
    async fn drain(
        &self,
        snapshot: BlacklistSnapshot,
        intake: IntakeReceiver,
    ) -> Result<CrawlSummary, CrawlError> {
        let capacity = self.context.settings.crawler.work_queue_capacity;
        let (work_tx, queue) = work_channel(capacity);
        let filter = BlacklistFilter::new(snapshot, self.context.counters.clone());
        let filtering = tokio::spawn(filter.run(intake, work_tx));

        let report = self.worker_pool().run(queue).await;
        let blacklisted = filtering.await?;

        let stats = self.context.publisher.stats();
        info!(
            "Crawl finished: {} candidates processed, {} documents staged, {} blacklisted",
            report.total(),
            stats.staged,
            blacklisted.len()
        );
        Ok(CrawlSummary {
            report,
            blacklisted,
        })
    }
}
