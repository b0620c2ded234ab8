// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::fmt;

use crate::domain::models::repository::Repository;

/// 单个候选仓库的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessOutcome {
    /// 文档已暂存到索引
    Published,
    /// 没有清单（非 2xx 或传输错误）
    Skipped,
    /// 清单校验失败，已写入死信
    Rejected,
    /// 暂存到索引失败
    Failed,
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessOutcome::Published => "published",
            ProcessOutcome::Skipped => "skipped",
            ProcessOutcome::Rejected => "rejected",
            ProcessOutcome::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Worker trait定义
///
/// 工作器每次完整处理一个候选仓库，然后才取下一个
#[async_trait]
pub trait Worker: Send + Sync {
    /// 处理一个候选仓库
    async fn process(&self, repository: Repository) -> ProcessOutcome;

    /// 获取工作器名称
    fn name(&self) -> &str;
}
