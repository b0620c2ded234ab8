// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::HttpSettings;
use crate::engines::traits::{EngineError, HttpClient, HttpResponse};
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// HTTP 引擎
///
/// 基于 reqwest 实现的 HTTP 客户端，负责超时与带抖动的指数退避重试
pub struct ReqwestEngine {
    client: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl ReqwestEngine {
    /// 根据配置创建引擎
    pub fn new(settings: &HttpSettings) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            retry_policy: RetryPolicy::with_max_retries(settings.max_retries),
        })
    }

    /// 替换重试策略
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, EngineError> {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|_| EngineError::InvalidHeader(k.clone()))?;
            let value =
                HeaderValue::from_str(v).map_err(|_| EngineError::InvalidHeader(k.clone()))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    async fn get_once(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, EngineError> {
        let response = self.client.get(url).headers(headers).send().await?;

        let status_code = response.status().as_u16();
        let mut response_headers = HashMap::new();
        for (k, v) in response.headers() {
            if let Ok(v_str) = v.to_str() {
                response_headers.insert(k.as_str().to_ascii_lowercase(), v_str.to_string());
            }
        }
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status_code,
            headers: response_headers,
            body,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestEngine {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponse, EngineError> {
        let header_map = Self::build_headers(headers)?;
        let mut attempt = 0;

        loop {
            let result = self.get_once(url, header_map.clone()).await;

            let retryable = match &result {
                Ok(response) => RetryPolicy::is_retryable_status(response.status_code),
                Err(e) => e.is_retryable(),
            };
            if !retryable || !self.retry_policy.should_retry(attempt) {
                return result;
            }

            attempt += 1;
            let backoff = self.retry_policy.calculate_backoff(attempt);
            match &result {
                Ok(response) => debug!(
                    "GET {} returned {}, retrying in {:?} (attempt {})",
                    url, response.status_code, backoff, attempt
                ),
                Err(e) => warn!(
                    "GET {} failed: {}, retrying in {:?} (attempt {})",
                    url, e, backoff, attempt
                ),
            }
            sleep(backoff).await;
        }
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
