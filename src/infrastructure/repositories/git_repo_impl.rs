// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::models::repository::Repository;
use crate::domain::repositories::git_repository::{GitError, GitStore};

const GIT_TIMEOUT: Duration = Duration::from_secs(300);

/// 基于 `git` 命令行的本地克隆存储
///
/// 本地路径为 `{root}/{domain id}/{hostname}/{name}`
#[derive(Debug, Clone)]
pub struct GitCliStore {
    root: PathBuf,
    timeout: Duration,
}

impl GitCliStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: GIT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, args: &[&str]) -> Result<Output, GitError> {
        let child = Command::new("git")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .spawn()?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(GitError::Timeout(args.join(" "))),
        }
    }

    async fn clone_fresh(&self, path: &Path, repository: &Repository) -> Result<(), GitError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let path_str = path_str(path)?;
        info!("Cloning {} into {}", repository.git_clone_url, path_str);

        let output = self
            .run(&[
                "clone",
                "--single-branch",
                "--no-tags",
                "--branch",
                &repository.git_branch,
                &repository.git_clone_url,
                path_str,
            ])
            .await?;
        check_git_output(&output, "git clone")
    }
}

fn path_str(path: &Path) -> Result<&str, GitError> {
    path.to_str()
        .ok_or_else(|| GitError::Parse(format!("non UTF-8 path {}", path.display())))
}

/// 把名称中的每一段作为一级目录，忽略 `..` 之类的特殊段
fn push_safe(path: &mut PathBuf, name: &str) {
    for component in Path::new(name).components() {
        if let Component::Normal(segment) = component {
            path.push(segment);
        }
    }
}

fn check_git_output(output: &Output, operation: &str) -> Result<(), GitError> {
    if output.status.success() {
        return Ok(());
    }
    Err(GitError::Failed {
        operation: operation.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// 解析 `git log --format=%ct` 的输出
fn parse_timestamps(stdout: &str) -> Result<Vec<DateTime<Utc>>, GitError> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or_else(|| GitError::Parse(line.to_string()))
        })
        .collect()
}

#[async_trait]
impl GitStore for GitCliStore {
    fn local_path(&self, repository: &Repository) -> PathBuf {
        let mut path = self.root.clone();
        push_safe(&mut path, &repository.domain.id);
        push_safe(&mut path, &repository.hostname);
        push_safe(&mut path, &repository.name);
        path
    }

    async fn clone_or_update(&self, repository: &Repository) -> Result<PathBuf, GitError> {
        let path = self.local_path(repository);

        if !path.exists() {
            self.clone_fresh(&path, repository).await?;
            return Ok(path);
        }

        if !path.join(".git").exists() {
            warn!("{} exists but is not a git repository, re-cloning", path.display());
            tokio::fs::remove_dir_all(&path).await?;
            self.clone_fresh(&path, repository).await?;
            return Ok(path);
        }

        let path_str = path_str(&path)?;
        let output = self
            .run(&[
                "-C",
                path_str,
                "fetch",
                "origin",
                &repository.git_branch,
                "--prune",
                "--force",
            ])
            .await?;
        if !output.status.success() {
            warn!(
                "git fetch failed for {} ({}), re-cloning",
                repository.name,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            tokio::fs::remove_dir_all(&path).await?;
            self.clone_fresh(&path, repository).await?;
            return Ok(path);
        }

        let output = self
            .run(&["-C", path_str, "reset", "--hard", "FETCH_HEAD"])
            .await?;
        check_git_output(&output, "git reset")?;
        debug!("Updated {}", path.display());
        Ok(path)
    }

    async fn commit_timestamps(
        &self,
        local_path: &Path,
        since_days: u32,
    ) -> Result<Vec<DateTime<Utc>>, GitError> {
        let path_str = path_str(local_path)?;
        let since = format!("--since={} days ago", since_days);
        let output = self
            .run(&["-C", path_str, "log", &since, "--format=%ct"])
            .await?;
        check_git_output(&output, "git log")?;
        parse_timestamps(&String::from_utf8_lossy(&output.stdout))
    }
}
