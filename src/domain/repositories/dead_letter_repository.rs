// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::repositories::storage_repository::StorageError;

/// 死信仓库特质
///
/// 只追加写入，保存校验失败的原始内容以便人工排查
#[async_trait]
pub trait DeadLetterRepository: Send + Sync {
    /// 记录一条校验失败的内容
    async fn record(&self, url: &str, reason: &str, content: &[u8]) -> Result<(), StorageError>;
}
