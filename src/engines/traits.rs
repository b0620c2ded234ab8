// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// 引擎错误类型
///
/// 只表示传输层失败；非 2xx 状态码不是错误，而是正常的响应
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非法的请求头
    #[error("Invalid header {0}")]
    InvalidHeader(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// HTTP 响应
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应头（键为小写）
    pub headers: HashMap<String, String>,
    /// 响应体
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// 状态码是否为 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// 按名称读取响应头（大小写不敏感）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// HTTP 客户端特质
///
/// 阻塞式 GET 语义：调用方提供请求头，重试与超时由实现负责
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// 执行 GET 请求
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<HttpResponse, EngineError>;
}
