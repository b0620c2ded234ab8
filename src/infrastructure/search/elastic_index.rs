// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::settings::{ElasticSettings, HttpSettings};
use crate::domain::repositories::index_repository::{IndexError, IndexRepository};

type Batch = Vec<(String, Value)>;

/// Elasticsearch 索引存储
///
/// 通过 REST API 访问：文档先缓存在内存中，达到 `bulk_size` 后以 `_bulk` 批量写入，
/// `flush` 写入剩余文档并执行 `_refresh`。写入失败的批次会放回缓冲区，
/// 由下一次批量写入或 `flush` 重新发送。
pub struct ElasticIndexRepository {
    client: reqwest::Client,
    base_url: String,
    user: Option<String>,
    password: Option<String>,
    bulk_size: usize,
    pending: Mutex<HashMap<String, Batch>>,
}

impl ElasticIndexRepository {
    pub fn new(elastic: &ElasticSettings, http: &HttpSettings) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: elastic.url.trim_end_matches('/').to_string(),
            user: elastic.user.clone().filter(|u| !u.is_empty()),
            password: elastic.password.clone(),
            bulk_size: elastic.bulk_size.max(1),
            pending: Mutex::new(HashMap::new()),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path));
        match &self.user {
            Some(user) => builder.basic_auth(user, self.password.as_ref()),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response) -> Result<Value, IndexError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(IndexError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// 生成 `_bulk` 请求体（NDJSON）
    pub fn bulk_body(index: &str, batch: &[(String, Value)]) -> Result<String, IndexError> {
        let mut body = String::new();
        for (key, document) in batch {
            body.push_str(&serde_json::to_string(
                &json!({ "index": { "_index": index, "_id": key } }),
            )?);
            body.push('\n');
            body.push_str(&serde_json::to_string(document)?);
            body.push('\n');
        }
        Ok(body)
    }

    async fn send_bulk(&self, index: &str, batch: &[(String, Value)]) -> Result<(), IndexError> {
        if batch.is_empty() {
            return Ok(());
        }
        let count = batch.len();
        let body = Self::bulk_body(index, batch)?;
        let response = self
            .request(Method::POST, "_bulk")
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let result = Self::check(response).await?;

        if result.get("errors").and_then(Value::as_bool).unwrap_or(false) {
            let failed = result
                .get("items")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter(|item| item.pointer("/index/error").is_some())
                        .count()
                })
                .unwrap_or(0);
            return Err(IndexError::Other(format!(
                "{} of {} bulk items failed on {}",
                failed, count, index
            )));
        }
        debug!("Bulk indexed {} documents into {}", count, index);
        Ok(())
    }

    fn take_batch(&self, index: &str) -> Batch {
        self.pending.lock().remove(index).unwrap_or_default()
    }

    /// 把发送失败的批次放回缓冲区
    ///
    /// 失败期间又暂存了相同键的文档时保留较新的那份
    fn restore_batch(&self, index: &str, failed: Batch) {
        let mut pending = self.pending.lock();
        let batch = pending.entry(index.to_string()).or_default();
        let mut restored: Batch = failed
            .into_iter()
            .filter(|(key, _)| !batch.iter().any(|(newer, _)| newer == key))
            .collect();
        restored.append(batch);
        *batch = restored;
    }

    /// 发送一个批次，失败时放回缓冲区
    async fn send_or_restore(&self, index: &str, batch: Batch) -> Result<(), IndexError> {
        match self.send_bulk(index, &batch).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.restore_batch(index, batch);
                Err(e)
            }
        }
    }

    /// 缓冲区中等待写入的文档数
    pub fn pending_len(&self, index: &str) -> usize {
        self.pending.lock().get(index).map_or(0, Vec::len)
    }
}

#[async_trait]
impl IndexRepository for ElasticIndexRepository {
    async fn ensure_index(&self, index: &str) -> Result<(), IndexError> {
        let response = self.request(Method::HEAD, index).send().await?;
        if response.status().is_success() {
            debug!("Index {} already exists", index);
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(IndexError::Status {
                status: response.status().as_u16(),
                body: String::new(),
            });
        }

        let response = self
            .request(Method::PUT, index)
            .json(&json!({ "settings": { "index": { "number_of_shards": 1 } } }))
            .send()
            .await?;
        match Self::check(response).await {
            Ok(_) => {
                info!("Created index {}", index);
                Ok(())
            }
            // Another run created it in between
            Err(IndexError::Status { status: 400, body })
                if body.contains("resource_already_exists_exception") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn stage(&self, index: &str, key: &str, document: Value) -> Result<(), IndexError> {
        let ready = {
            let mut pending = self.pending.lock();
            let batch = pending.entry(index.to_string()).or_default();
            // Same key twice in one batch keeps only the latest document
            batch.retain(|(k, _)| k != key);
            batch.push((key.to_string(), document));
            if batch.len() >= self.bulk_size {
                std::mem::take(batch)
            } else {
                Vec::new()
            }
        };
        // The batch stays buffered on failure, so the document still counts as staged
        if let Err(e) = self.send_or_restore(index, ready).await {
            warn!("Bulk write to {} failed, batch kept for the next attempt: {}", index, e);
        }
        Ok(())
    }

    async fn flush(&self, index: &str) -> Result<(), IndexError> {
        let batch = self.take_batch(index);
        self.send_or_restore(index, batch).await?;

        let response = self
            .request(Method::POST, &format!("{}/_refresh", index))
            .send()
            .await?;
        Self::check(response).await?;
        debug!("Flushed index {}", index);
        Ok(())
    }

    async fn update_alias(&self, alias: &str, index: &str) -> Result<(), IndexError> {
        let response = self
            .request(Method::POST, "_aliases")
            .json(&json!({ "actions": [ { "add": { "index": index, "alias": alias } } ] }))
            .send()
            .await?;
        Self::check(response).await?;
        info!("Alias {} now includes {}", alias, index);
        Ok(())
    }

    async fn delete(&self, index: &str, key: &str) -> Result<(), IndexError> {
        if let Some(batch) = self.pending.lock().get_mut(index) {
            batch.retain(|(k, _)| k != key);
        }

        let response = self
            .request(Method::DELETE, &format!("{}/_doc/{}", index, key))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Document {} was not in {}", key, index);
            return Ok(());
        }
        Self::check(response).await?;
        info!("Deleted {} from {}", key, index);
        Ok(())
    }
}

#[cfg(test)]
#[path = "elastic_index_test.rs"]
mod tests;
