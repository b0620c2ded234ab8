// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 托管平台模块
///
/// 每个平台把组织地址转换为分页列表 API 请求，并把响应解码为候选仓库。
/// 解码是纯函数，网络请求与推送由分页服务负责。
pub mod bitbucket;
pub mod github;
pub mod gitlab;
pub mod registry;

use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::domain::models::hosting_domain::{HostingDomain, ProviderKind};
use crate::engines::traits::{EngineError, HttpResponse};

pub use registry::{DomainRegistry, KnownDomain};

/// 托管平台错误类型
#[derive(Error, Debug)]
pub enum HostingError {
    /// 没有任何托管域匹配该主机
    #[error("host {0} is not a known code hosting domain")]
    UnknownHost(String),
    /// 同一主机配置了多个托管域
    #[error("host {0} is configured more than once")]
    DuplicateHost(String),
    /// URL 无法解析或缺少必要的路径段
    #[error("invalid url {0}")]
    InvalidUrl(String),
    /// 传输失败
    #[error("transport error: {0}")]
    Transport(#[from] EngineError),
    /// 列表 API 返回非 2xx
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    /// 响应解码失败
    #[error("could not decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// 入口通道已关闭
    #[error("intake channel closed")]
    IntakeClosed,
}

/// 解码上下文
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    /// 所属托管域
    pub domain: &'a HostingDomain,
    /// 清单文件名
    pub crawled_filename: &'a str,
    /// 当前请求的地址
    pub page_url: &'a str,
}

/// 平台返回的一个仓库，尚未绑定托管域与发布者
#[derive(Debug, Clone, PartialEq)]
pub struct RepoListing {
    pub name: String,
    pub hostname: String,
    pub file_raw_url: String,
    pub git_clone_url: String,
    pub git_branch: String,
    pub metadata: Value,
}

/// 一页列表结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingPage {
    /// 本页的仓库
    pub repositories: Vec<RepoListing>,
    /// 下一页地址，`None` 表示没有更多页
    pub next: Option<String>,
}

/// 托管平台特质
pub trait HostingProvider: Send + Sync {
    /// 平台类型
    fn kind(&self) -> ProviderKind;

    /// 由组织地址生成一个或多个起始列表地址
    fn api_urls(&self, domain: &HostingDomain, org_url: &Url) -> Result<Vec<String>, HostingError>;

    /// 单个仓库的 API 地址
    fn repository_api_url(
        &self,
        domain: &HostingDomain,
        repo_url: &Url,
    ) -> Result<String, HostingError>;

    /// 解码一页列表响应
    fn decode_page(
        &self,
        ctx: &DecodeContext<'_>,
        response: &HttpResponse,
    ) -> Result<ListingPage, HostingError>;

    /// 解码单个仓库响应；私有仓库返回 `None`
    fn decode_repository(
        &self,
        ctx: &DecodeContext<'_>,
        response: &HttpResponse,
    ) -> Result<Option<RepoListing>, HostingError>;
}

/// 把响应体解码为 JSON
pub(crate) fn parse_json(url: &str, body: &[u8]) -> Result<Value, HostingError> {
    serde_json::from_slice(body).map_err(|source| HostingError::Decode {
        url: url.to_string(),
        source,
    })
}

/// 把 JSON 值解码为具体类型
pub(crate) fn from_value<T: serde::de::DeserializeOwned>(
    url: &str,
    value: Value,
) -> Result<T, HostingError> {
    serde_json::from_value(value).map_err(|source| HostingError::Decode {
        url: url.to_string(),
        source,
    })
}

/// 取出 URL 中指定数量的前置路径段
pub(crate) fn leading_segments(url: &Url, count: usize) -> Result<Vec<String>, HostingError> {
    let segments = crate::utils::url_utils::path_segments(url);
    if segments.len() < count {
        return Err(HostingError::InvalidUrl(url.to_string()));
    }
    Ok(segments.into_iter().take(count).collect())
}
