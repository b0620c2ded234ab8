// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::application::context::CrawlerContext;
use crate::domain::models::activity::ActivityRecord;
use crate::domain::models::repository::Repository;
use crate::domain::services::activity_service::ActivityCalculator;
use crate::domain::services::manifest_service::{
    raw_document, validate_ipa, ManifestError, ParseContext,
};
use crate::infrastructure::metrics::{
    REPOSITORY_CLONED, REPOSITORY_PROCESSED, REPOSITORY_REJECTED, REPOSITORY_SKIPPED,
};
use crate::workers::worker::{ProcessOutcome, Worker};

/// 仓库工作器
///
/// 对每个候选仓库依次执行：获取清单 → 校验 → 克隆 → 计算活跃度 → 发布。
/// 单个仓库的任何失败都不会中断工作器。
pub struct RepositoryWorker {
    context: Arc<CrawlerContext>,
    calculator: ActivityCalculator,
    name: String,
}

impl RepositoryWorker {
    pub fn new(context: Arc<CrawlerContext>, id: usize) -> Self {
        let crawler = &context.settings.crawler;
        let calculator =
            ActivityCalculator::new(crawler.activity_window(), crawler.vitality_bucket_days);
        Self {
            context,
            calculator,
            name: format!("repository-worker-{}", id),
        }
    }

    /// 获取清单，非 2xx 或传输错误返回 `None`
    async fn fetch_manifest(&self, repository: &Repository) -> Option<Vec<u8>> {
        match self
            .context
            .http
            .get(&repository.file_raw_url, &repository.headers)
            .await
        {
            Ok(response) if response.is_success() => Some(response.body),
            Ok(response) => {
                debug!("No manifest (status {})", response.status_code);
                None
            }
            Err(e) => {
                debug!("Could not fetch manifest: {}", e);
                None
            }
        }
    }

    /// 解析清单并比对 IPA 编码
    async fn validate(
        &self,
        repository: &Repository,
        content: &[u8],
    ) -> Result<serde_json::Value, ManifestError> {
        let crawler = &self.context.settings.crawler;
        let ctx = ParseContext {
            base_url: crawler.manifest_base_url(&repository.file_raw_url),
            domain: &repository.domain,
        };
        let manifest = self.context.parser.parse(content, &ctx).await?;
        validate_ipa(&repository.publisher, &manifest)?;
        Ok(manifest.document)
    }

    async fn reject(&self, repository: &Repository, reason: &ManifestError, content: &[u8]) {
        error!("Invalid manifest: {}", reason);
        if let Err(e) = self
            .context
            .dead_letters
            .record(&repository.file_raw_url, &reason.to_string(), content)
            .await
        {
            error!("Could not record dead letter: {}", e);
        }
        self.context.counters.increment(REPOSITORY_REJECTED);
    }

    async fn activity(&self, repository: &Repository) -> ActivityRecord {
        let git = &self.context.git;
        let local_path = match git.clone_or_update(repository).await {
            Ok(path) => {
                self.context.counters.increment(REPOSITORY_CLONED);
                path
            }
            Err(e) => {
                // Fall back to whatever an earlier run left on disk
                error!("Error while cloning: {}", e);
                git.local_path(repository)
            }
        };

        let window = self.calculator.window_days();
        match git.commit_timestamps(&local_path, window).await {
            Ok(timestamps) => {
                let record = self.calculator.calculate(&timestamps, Utc::now());
                info!(
                    "Activity index in the last {} days: {:.2}",
                    window, record.activity_index
                );
                record
            }
            Err(e) => {
                error!("Error calculating activity index: {}", e);
                ActivityRecord::empty(self.calculator.bucket_count())
            }
        }
    }
}

#[async_trait]
impl Worker for RepositoryWorker {
    #[instrument(
        skip(self, repository),
        fields(worker = %self.name, repository = %repository.name, manifest_url = %repository.file_raw_url)
    )]
    async fn process(&self, repository: Repository) -> ProcessOutcome {
        let counters = &self.context.counters;
        counters.increment(REPOSITORY_PROCESSED);

        let Some(content) = self.fetch_manifest(&repository).await else {
            counters.increment(REPOSITORY_SKIPPED);
            return ProcessOutcome::Skipped;
        };
        info!("Manifest found");

        let manifest = if repository.publisher.unknown_ipa {
            warn!("unknownIPA is set, whitelist validation skipped");
            raw_document(&content)
        } else {
            match self.validate(&repository, &content).await {
                Ok(document) => document,
                Err(e) => {
                    self.reject(&repository, &e, &content).await;
                    return ProcessOutcome::Rejected;
                }
            }
        };

        let activity = self.activity(&repository).await;

        match self
            .context
            .publisher
            .publish(&repository, &activity, manifest, &content)
            .await
        {
            Ok(_) => ProcessOutcome::Published,
            Err(e) => {
                error!("Error saving to the index: {}", e);
                ProcessOutcome::Failed
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "repository_worker_test.rs"]
mod tests;
