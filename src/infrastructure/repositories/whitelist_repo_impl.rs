// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;
use tracing::info;
use validator::Validate;

use crate::domain::models::publisher::Publisher;
use crate::domain::repositories::storage_repository::StorageError;

/// 从一个或多个白名单文件加载发布者
///
/// 每个文件是发布者列表；任何一个发布者校验失败都会使加载失败
pub fn load_publishers<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Publisher>, StorageError> {
    let mut publishers = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let loaded: Vec<Publisher> =
            serde_yaml::from_str(&content).map_err(|source| StorageError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;

        for publisher in &loaded {
            publisher.validate().map_err(|e| {
                StorageError::Invalid(format!(
                    "publisher {:?} in {}: {}",
                    publisher.name,
                    path.display(),
                    e
                ))
            })?;
        }
        info!("Loaded {} publishers from {}", loaded.len(), path.display());
        publishers.extend(loaded);
    }
    Ok(publishers)
}

/// 查找声明了该仓库的发布者，找不到时返回跳过 IPA 校验的匿名发布者
pub fn publisher_for(publishers: &[Publisher], repo_url: &str) -> Publisher {
    publishers
        .iter()
        .find(|p| p.claims(repo_url))
        .cloned()
        .unwrap_or_else(|| Publisher::unknown(repo_url))
}
