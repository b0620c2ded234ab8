// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::domain::models::publisher::Publisher;
use crate::domain::services::pagination_service::PaginationService;
use crate::infrastructure::hosting::{DomainRegistry, HostingError, KnownDomain};
use crate::queue::intake::IntakeSender;

/// 仓库生产者
///
/// 为每个发布者启动一个并发任务，遍历其组织与直接列出的仓库，
/// 把候选仓库推送到入口通道。所有任务结束后才释放入口通道的发送端。
#[derive(Clone)]
pub struct RepositoryProducer {
    registry: Arc<DomainRegistry>,
    pagination: Arc<PaginationService>,
}

impl RepositoryProducer {
    pub fn new(registry: Arc<DomainRegistry>, pagination: Arc<PaginationService>) -> Self {
        Self {
            registry,
            pagination,
        }
    }

    /// 推送单个仓库，完成后入口通道随 `intake` 一起关闭
    pub async fn produce_single(
        &self,
        repo_url: &str,
        publisher: Arc<Publisher>,
        intake: IntakeSender,
    ) -> Result<(), HostingError> {
        info!("Processing repository: {}", repo_url);
        let known = self.registry.resolve(repo_url)?;
        self.pagination
            .process_single_repository(known, repo_url, &publisher, &intake)
            .await
    }

    /// 并发处理所有发布者
    ///
    /// 每个发布者对应 `JoinSet` 中的一个任务；全部任务结束后才释放 `intake`
    pub async fn produce_publishers(&self, publishers: Vec<Arc<Publisher>>, intake: IntakeSender) {
        let org_count: usize = publishers.iter().map(|p| p.organizations.len()).sum();
        info!(
            "{} organizations belonging to {} publishers are going to be scanned",
            org_count,
            publishers.len()
        );

        let mut tasks = JoinSet::new();
        for publisher in publishers {
            let producer = self.clone();
            let intake = intake.clone();
            tasks.spawn(async move { producer.crawl_publisher(publisher, &intake).await });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Publisher task failed: {}", e);
            }
        }
        drop(intake);
        debug!("All publishers processed, intake closed");
    }

    /// 处理一个发布者的全部组织与仓库
    pub async fn crawl_publisher(&self, publisher: Arc<Publisher>, intake: &IntakeSender) {
        info!("Processing publisher: {}", publisher.name);

        for org_url in &publisher.organizations {
            match self.registry.resolve(org_url) {
                Ok(known) => self.crawl_org(known, org_url, &publisher, intake).await,
                Err(e) => error!("Skipping organization {}: {}", org_url, e),
            }
        }

        for repo_url in &publisher.repositories {
            let known = match self.registry.resolve(repo_url) {
                Ok(known) => known,
                Err(e) => {
                    error!("Skipping repository {}: {}", repo_url, e);
                    continue;
                }
            };
            if let Err(e) = self
                .pagination
                .process_single_repository(known, repo_url, &publisher, intake)
                .await
            {
                error!("Error reading repository {}: {}", repo_url, e);
            }
        }
    }

    /// 遍历一个组织的所有起始地址，每个起始地址独立分页直到结束
    ///
    /// 某个起始地址出错只放弃该地址的剩余页，不影响其他起始地址
    pub async fn crawl_org(
        &self,
        known: &KnownDomain,
        org_url: &str,
        publisher: &Arc<Publisher>,
        intake: &IntakeSender,
    ) {
        let seeds = match self.pagination.generate_api_urls(known, org_url) {
            Ok(seeds) => seeds,
            Err(e) => {
                error!("Could not generate API urls for {}: {}", org_url, e);
                return;
            }
        };

        for seed in seeds {
            let mut page_url = seed;
            loop {
                match self
                    .pagination
                    .process_and_get_next_url(known, &page_url, publisher, intake)
                    .await
                {
                    Ok(Some(next)) if next != page_url => page_url = next,
                    Ok(_) => break,
                    Err(HostingError::IntakeClosed) => {
                        error!("Intake closed while crawling {}", org_url);
                        return;
                    }
                    Err(e) => {
                        error!("Error reading {} repository list: {}", page_url, e);
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "producer_test.rs"]
mod tests;
