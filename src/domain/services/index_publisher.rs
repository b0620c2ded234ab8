// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::settings::ElasticSettings;
use crate::domain::models::activity::ActivityRecord;
use crate::domain::models::index_document::{document_key, CatalogDocument, PublisherDocument};
use crate::domain::models::repository::Repository;
use crate::domain::repositories::index_repository::{IndexError, IndexRepository};
use crate::infrastructure::metrics::{CounterSink, REPOSITORY_FILE_INDEXED};

const REMOVE_CONCURRENCY: usize = 8;

/// 发布统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub staged: u64,
    pub failed: u64,
}

/// 索引发布器
///
/// 多个 worker 并发调用 `publish`，爬取结束后由编排方调用一次 `finalize`：
/// 先刷新缓冲，再把新索引加入别名。别名只做追加（`add` 动作），挂载是读者看到新数据的唯一时刻。
pub struct IndexPublisher {
    index: Arc<dyn IndexRepository>,
    counters: Arc<dyn CounterSink>,
    publiccode_index: String,
    publishers_index: String,
    alias: String,
    stats: Mutex<PublishStats>,
}

impl IndexPublisher {
    pub fn new(
        index: Arc<dyn IndexRepository>,
        counters: Arc<dyn CounterSink>,
        settings: &ElasticSettings,
    ) -> Self {
        Self {
            index,
            counters,
            publiccode_index: settings.publiccode_index.clone(),
            publishers_index: settings.publishers_index.clone(),
            alias: settings.alias.clone(),
            stats: Mutex::new(PublishStats::default()),
        }
    }

    /// 确保两个索引存在，启动阶段调用
    pub async fn ensure_indexes(&self) -> Result<(), IndexError> {
        self.index.ensure_index(&self.publiccode_index).await?;
        self.index.ensure_index(&self.publishers_index).await
    }

    /// 暂存一个仓库的文档，返回文档键
    ///
    /// 键由克隆地址决定，重复爬取同一仓库会覆盖而不是新增
    pub async fn publish(
        &self,
        repository: &Repository,
        activity: &ActivityRecord,
        manifest: serde_json::Value,
        manifest_raw: &[u8],
    ) -> Result<String, IndexError> {
        let key = document_key(&repository.git_clone_url);
        let document = CatalogDocument {
            name: repository.name.clone(),
            hostname: repository.hostname.clone(),
            domain_id: repository.domain.id.clone(),
            file_raw_url: repository.file_raw_url.clone(),
            git_clone_url: repository.git_clone_url.clone(),
            publisher_ipa: repository.publisher.codice_ipa.clone(),
            publisher_name: repository.publisher.name.clone(),
            activity_index: activity.activity_index,
            vitality: activity.vitality.clone(),
            manifest,
            manifest_raw: String::from_utf8_lossy(manifest_raw).into_owned(),
            metadata: repository.metadata.clone(),
            crawled_at: Utc::now(),
        };

        let result = self.stage_all(&key, &document, repository).await;
        let mut stats = self.stats.lock();
        match result {
            Ok(()) => {
                stats.staged += 1;
                self.counters.increment(REPOSITORY_FILE_INDEXED);
                debug!("Staged {} as {}", repository.name, key);
                Ok(key)
            }
            Err(e) => {
                stats.failed += 1;
                Err(e)
            }
        }
    }

    async fn stage_all(
        &self,
        key: &str,
        document: &CatalogDocument,
        repository: &Repository,
    ) -> Result<(), IndexError> {
        self.index
            .stage(&self.publiccode_index, key, serde_json::to_value(document)?)
            .await?;

        // The catalog document is already buffered; a publisher upsert failure only degrades it
        if let Err(e) = self.stage_publisher(repository).await {
            warn!(
                "Could not upsert publisher for {} into {}: {}",
                repository.name, self.publishers_index, e
            );
        }
        Ok(())
    }

    async fn stage_publisher(&self, repository: &Repository) -> Result<(), IndexError> {
        let publisher = &repository.publisher;
        let ipa = publisher.codice_ipa.trim();
        if ipa.is_empty() {
            return Ok(());
        }
        let publisher_document = PublisherDocument {
            codice_ipa: ipa.to_string(),
            name: publisher.name.clone(),
            organizations: publisher.organizations.clone(),
        };
        self.index
            .stage(
                &self.publishers_index,
                &ipa.to_lowercase(),
                serde_json::to_value(&publisher_document)?,
            )
            .await
    }

    /// 刷新缓冲并把别名挂到新索引
    ///
    /// 刷新失败时不更新别名，已暂存的文档保留在未挂别名的索引中
    pub async fn finalize(&self) -> Result<(), IndexError> {
        self.index.flush(&self.publiccode_index).await?;
        self.index.flush(&self.publishers_index).await?;

        self.index
            .update_alias(&self.alias, &self.publishers_index)
            .await?;
        self.index
            .update_alias(&self.alias, &self.publiccode_index)
            .await?;

        let stats = self.stats();
        info!(
            "Published {} documents ({} failed), alias {} updated",
            stats.staged, stats.failed, self.alias
        );
        Ok(())
    }

    /// 从已发布的索引中删除文档，返回成功删除的数量
    pub async fn remove(&self, keys: &[String]) -> usize {
        let index = &self.publiccode_index;
        futures::stream::iter(keys)
            .map(|key| async move {
                match self.index.delete(index, key).await {
                    Ok(()) => 1,
                    Err(e) => {
                        warn!("Could not remove {} from {}: {}", key, index, e);
                        0
                    }
                }
            })
            .buffer_unordered(REMOVE_CONCURRENCY)
            .fold(0, |removed, n| async move { removed + n })
            .await
    }

    pub fn stats(&self) -> PublishStats {
        *self.stats.lock()
    }
}

#[cfg(test)]
#[path = "index_publisher_test.rs"]
mod tests;
