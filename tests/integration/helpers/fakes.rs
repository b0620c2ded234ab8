// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use catalog_crawler::domain::models::blacklist::BlacklistSnapshot;
use catalog_crawler::domain::models::repository::Repository;
use catalog_crawler::domain::repositories::blacklist_repository::BlacklistRepository;
use catalog_crawler::domain::repositories::dead_letter_repository::DeadLetterRepository;
use catalog_crawler::domain::repositories::git_repository::{GitError, GitStore};
use catalog_crawler::domain::repositories::index_repository::{IndexError, IndexRepository};
use catalog_crawler::domain::repositories::storage_repository::StorageError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 内存索引：暂存的文档在 `flush` 之后才可见
#[derive(Default)]
pub struct InMemoryIndex {
    pending: Mutex<Vec<(String, String, serde_json::Value)>>,
    visible: Mutex<HashMap<(String, String), serde_json::Value>>,
    pub stage_calls: Mutex<Vec<(String, String)>>,
    pub aliases: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl InMemoryIndex {
    /// 某个索引中可见的文档键
    pub fn keys(&self, index: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .visible
            .lock()
            .keys()
            .filter(|(i, _)| i == index)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn document(&self, index: &str, key: &str) -> Option<serde_json::Value> {
        self.visible
            .lock()
            .get(&(index.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl IndexRepository for InMemoryIndex {
    async fn ensure_index(&self, _index: &str) -> Result<(), IndexError> {
        Ok(())
    }

    async fn stage(
        &self,
        index: &str,
        key: &str,
        document: serde_json::Value,
    ) -> Result<(), IndexError> {
        self.stage_calls
            .lock()
            .push((index.to_string(), key.to_string()));
        self.pending
            .lock()
            .push((index.to_string(), key.to_string(), document));
        Ok(())
    }

    async fn flush(&self, index: &str) -> Result<(), IndexError> {
        let mut pending = self.pending.lock();
        let mut visible = self.visible.lock();
        let (flushed, kept): (Vec<_>, Vec<_>) = pending.drain(..).partition(|(i, _, _)| i == index);
        *pending = kept;
        for (i, k, doc) in flushed {
            visible.insert((i, k), doc);
        }
        Ok(())
    }

    async fn update_alias(&self, alias: &str, index: &str) -> Result<(), IndexError> {
        self.aliases
            .lock()
            .push((alias.to_string(), index.to_string()));
        Ok(())
    }

    async fn delete(&self, index: &str, key: &str) -> Result<(), IndexError> {
        self.visible
            .lock()
            .remove(&(index.to_string(), key.to_string()));
        self.deleted
            .lock()
            .push((index.to_string(), key.to_string()));
        Ok(())
    }
}

/// 不访问网络的 git 存储：克隆总是成功，提交历史为空
#[derive(Default)]
pub struct StubGit {
    pub cloned: Mutex<Vec<String>>,
}

#[async_trait]
impl GitStore for StubGit {
    fn local_path(&self, repository: &Repository) -> PathBuf {
        PathBuf::from("/nonexistent").join(&repository.name)
    }

    async fn clone_or_update(&self, repository: &Repository) -> Result<PathBuf, GitError> {
        self.cloned.lock().push(repository.git_clone_url.clone());
        Ok(self.local_path(repository))
    }

    async fn commit_timestamps(
        &self,
        _local_path: &Path,
        _since_days: u32,
    ) -> Result<Vec<DateTime<Utc>>, GitError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct InMemoryDeadLetters {
    pub entries: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl DeadLetterRepository for InMemoryDeadLetters {
    async fn record(&self, url: &str, reason: &str, _content: &[u8]) -> Result<(), StorageError> {
        self.entries
            .lock()
            .push((url.to_string(), reason.to_string()));
        Ok(())
    }
}

pub struct StaticBlacklist(pub BlacklistSnapshot);

#[async_trait]
impl BlacklistRepository for StaticBlacklist {
    async fn list_blacklisted(&self) -> Result<BlacklistSnapshot, StorageError> {
        Ok(self.0.clone())
    }
}
