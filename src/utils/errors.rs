// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::index_repository::IndexError;
use crate::domain::repositories::storage_repository::StorageError;
use crate::engines::traits::EngineError;
use crate::infrastructure::hosting::HostingError;

/// 爬取错误类型
///
/// 爬取用例返回给调用方的顶层错误。启动阶段的错误是致命的；
/// 刷新或别名更新失败也在这里返回，但不会撤销已暂存的文档。
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("托管平台错误: {0}")]
    Hosting(#[from] HostingError),

    #[error("索引错误: {0}")]
    Index(#[from] IndexError),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("传输错误: {0}")]
    Engine(#[from] EngineError),

    #[error("任务异常退出: {0}")]
    Join(#[from] tokio::task::JoinError),
}
