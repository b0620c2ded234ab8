// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::models::blacklist::{snapshot, BlacklistEntry, BlacklistSnapshot};
use crate::domain::repositories::blacklist_repository::BlacklistRepository;
use crate::domain::repositories::storage_repository::StorageError;

/// 从目录中的 YAML 文件读取黑名单
///
/// 目录下每个 `*.yml` / `*.yaml` 文件都是 `{ url, reason }` 列表；目录不存在时黑名单为空
#[derive(Debug, Clone)]
pub struct YamlBlacklistRepository {
    dir: PathBuf,
}

impl YamlBlacklistRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn is_yaml(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        )
    }

    async fn read_file(path: &Path) -> Result<Vec<BlacklistEntry>, StorageError> {
        let content = tokio::fs::read_to_string(path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str(&content).map_err(|source| StorageError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[async_trait]
impl BlacklistRepository for YamlBlacklistRepository {
    async fn list_blacklisted(&self) -> Result<BlacklistSnapshot, StorageError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No blacklist directory at {}", self.dir.display());
                return Ok(BlacklistSnapshot::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if Self::is_yaml(&path) {
                files.push(path);
            }
        }
        files.sort();

        let mut entries = Vec::new();
        for path in &files {
            entries.extend(Self::read_file(path).await?);
        }
        info!(
            "Loaded {} blacklisted repositories from {} files",
            entries.len(),
            files.len()
        );
        Ok(snapshot(entries))
    }
}
