// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::repository::Repository;

/// git 操作错误
#[derive(Error, Debug)]
pub enum GitError {
    /// 命令无法启动
    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),
    /// 命令返回非零状态
    #[error("{operation} failed: {stderr}")]
    Failed { operation: String, stderr: String },
    /// 超时
    #[error("'git {0}' timed out")]
    Timeout(String),
    /// 输出无法解析
    #[error("unexpected git output: {0}")]
    Parse(String),
}

/// 本地 git 存储特质
///
/// 克隆是幂等的：已有克隆时执行更新而不是重复克隆
#[async_trait]
pub trait GitStore: Send + Sync {
    /// 候选仓库对应的本地路径（按域/主机/名称划分命名空间）
    fn local_path(&self, repository: &Repository) -> PathBuf;

    /// 克隆或更新仓库
    async fn clone_or_update(&self, repository: &Repository) -> Result<PathBuf, GitError>;

    /// 读取最近 `since_days` 天内的提交时间戳，可能为空
    async fn commit_timestamps(
        &self,
        local_path: &Path,
        since_days: u32,
    ) -> Result<Vec<DateTime<Utc>>, GitError>;
}
