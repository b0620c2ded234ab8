// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::models::blacklist::BlacklistSnapshot;
use crate::domain::repositories::storage_repository::StorageError;

/// 黑名单仓库特质
#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    /// 读取黑名单快照：克隆地址 → 外部标识
    async fn list_blacklisted(&self) -> Result<BlacklistSnapshot, StorageError>;
}
