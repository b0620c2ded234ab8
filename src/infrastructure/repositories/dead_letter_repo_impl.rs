// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::repositories::dead_letter_repository::DeadLetterRepository;
use crate::domain::repositories::storage_repository::StorageError;

/// 死信记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub url: String,
    pub reason: String,
    pub content: String,
    pub recorded_at: DateTime<Utc>,
}

/// 以 JSON Lines 追加写入的死信文件
///
/// 并发的写入通过互斥锁串行化，保证每行完整
pub struct FileDeadLetterRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileDeadLetterRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// 读取全部死信记录
    pub async fn read_all(&self) -> Result<Vec<DeadLetter>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StorageError::from))
            .collect()
    }
}

#[async_trait]
impl DeadLetterRepository for FileDeadLetterRepository {
    async fn record(&self, url: &str, reason: &str, content: &[u8]) -> Result<(), StorageError> {
        let letter = DeadLetter {
            url: url.to_string(),
            reason: reason.to_string(),
            content: String::from_utf8_lossy(content).into_owned(),
            recorded_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&letter)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_record_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileDeadLetterRepository::new(dir.path().join("invalid.log"));

        repository
            .record("https://raw/a/publiccode.yml", "missing name", b"url: x")
            .await
            .unwrap();
        repository
            .record("https://raw/b/publiccode.yml", "codiceIPA mismatch", b"name: y")
            .await
            .unwrap();

        let letters = repository.read_all().await.unwrap();
        assert_eq!(letters.len(), 2);
        assert_eq!(letters[0].url, "https://raw/a/publiccode.yml");
        assert_eq!(letters[1].content, "name: y");
    }

    #[tokio::test]
    async fn test_concurrent_records_keep_lines_intact() {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(FileDeadLetterRepository::new(dir.path().join("invalid.log")));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..20 {
            let repository = repository.clone();
            tasks.spawn(async move {
                repository
                    .record(&format!("https://raw/{}", i), "bad", "x".repeat(4096).as_bytes())
                    .await
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        assert_eq!(repository.read_all().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileDeadLetterRepository::new(dir.path().join("none.log"));
        assert!(repository.read_all().await.unwrap().is_empty());
    }
}
