// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 索引错误类型
#[derive(Error, Debug)]
pub enum IndexError {
    /// 请求失败
    #[error("index request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 服务端返回错误
    #[error("index returned {status}: {body}")]
    Status { status: u16, body: String },
    /// 文档序列化失败
    #[error("could not serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    /// 其他错误
    #[error("index error: {0}")]
    Other(String),
}

/// 索引仓库特质
///
/// 写入先进入缓冲区，`flush` 之后才对读者可见；
/// `update_alias` 把索引挂到稳定别名上（只追加）
#[async_trait]
pub trait IndexRepository: Send + Sync {
    /// 索引不存在时创建
    async fn ensure_index(&self, index: &str) -> Result<(), IndexError>;

    /// 以确定性的键暂存一个文档，相同键覆盖旧文档
    ///
    /// 返回 `Ok` 后文档不会被丢弃：批量写入失败时留在缓冲区，由 `flush` 重试
    async fn stage(
        &self,
        index: &str,
        key: &str,
        document: serde_json::Value,
    ) -> Result<(), IndexError>;

    /// 强制缓冲区中的写入生效并可见
    async fn flush(&self, index: &str) -> Result<(), IndexError>;

    /// 将目标索引加入别名，已挂载的其他索引保持不变
    async fn update_alias(&self, alias: &str, index: &str) -> Result<(), IndexError>;

    /// 删除文档
    async fn delete(&self, index: &str, key: &str) -> Result<(), IndexError>;
}
