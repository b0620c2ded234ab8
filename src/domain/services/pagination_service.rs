// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::domain::models::hosting_domain::HostingDomain;
use crate::domain::models::publisher::Publisher;
use crate::domain::models::repository::Repository;
use crate::engines::traits::{HttpClient, HttpResponse};
use crate::infrastructure::hosting::{DecodeContext, HostingError, KnownDomain, RepoListing};
use crate::queue::intake::IntakeSender;
use crate::utils::random::RandomSource;

/// 分页服务
///
/// 驱动各托管平台的列表 API：发起请求、解码候选仓库、推送到入口通道，
/// 并返回下一页地址。远程错误以 `Err` 返回，由调用方决定放弃该组织的剩余页。
pub struct PaginationService {
    http: Arc<dyn HttpClient>,
    random: Arc<dyn RandomSource>,
    crawled_filename: String,
}

impl PaginationService {
    /// 创建新的分页服务
    pub fn new(
        http: Arc<dyn HttpClient>,
        random: Arc<dyn RandomSource>,
        crawled_filename: impl Into<String>,
    ) -> Self {
        Self {
            http,
            random,
            crawled_filename: crawled_filename.into(),
        }
    }

    /// 由组织地址生成起始列表地址（可能有多个）
    pub fn generate_api_urls(
        &self,
        known: &KnownDomain,
        org_url: &str,
    ) -> Result<Vec<String>, HostingError> {
        let parsed = Url::parse(org_url).map_err(|_| HostingError::InvalidUrl(org_url.to_string()))?;
        known.provider.api_urls(&known.domain, &parsed)
    }

    /// 请求并解码一页，不推送
    ///
    /// 同一地址、同一响应总是得到相同的候选集合与下一页地址
    pub async fn fetch_page(
        &self,
        known: &KnownDomain,
        page_url: &str,
        publisher: &Arc<Publisher>,
    ) -> Result<(Vec<Repository>, Option<String>), HostingError> {
        let response = self.fetch(&known.domain, page_url).await?;
        let ctx = DecodeContext {
            domain: &known.domain,
            crawled_filename: &self.crawled_filename,
            page_url,
        };
        let page = known.provider.decode_page(&ctx, &response)?;

        let repositories = page
            .repositories
            .into_iter()
            .map(|listing| self.build_repository(known, listing, publisher))
            .collect();
        Ok((repositories, page.next))
    }

    /// 处理一页并返回下一页地址，`None` 表示已到末尾
    pub async fn process_and_get_next_url(
        &self,
        known: &KnownDomain,
        page_url: &str,
        publisher: &Arc<Publisher>,
        intake: &IntakeSender,
    ) -> Result<Option<String>, HostingError> {
        let (repositories, next) = self.fetch_page(known, page_url, publisher).await?;
        debug!(
            "{} candidates on {} (next: {:?})",
            repositories.len(),
            page_url,
            next
        );

        for repository in repositories {
            intake
                .send(repository)
                .map_err(|_| HostingError::IntakeClosed)?;
        }
        Ok(next)
    }

    /// 处理单个仓库地址
    pub async fn process_single_repository(
        &self,
        known: &KnownDomain,
        repo_url: &str,
        publisher: &Arc<Publisher>,
        intake: &IntakeSender,
    ) -> Result<(), HostingError> {
        let parsed =
            Url::parse(repo_url).map_err(|_| HostingError::InvalidUrl(repo_url.to_string()))?;
        let api_url = known.provider.repository_api_url(&known.domain, &parsed)?;
        let response = self.fetch(&known.domain, &api_url).await?;

        let ctx = DecodeContext {
            domain: &known.domain,
            crawled_filename: &self.crawled_filename,
            page_url: &api_url,
        };
        match known.provider.decode_repository(&ctx, &response)? {
            Some(listing) => intake
                .send(self.build_repository(known, listing, publisher))
                .map_err(|_| HostingError::IntakeClosed),
            None => {
                debug!("Repository {} is not public, skipping", repo_url);
                Ok(())
            }
        }
    }

    async fn fetch(&self, domain: &HostingDomain, url: &str) -> Result<HttpResponse, HostingError> {
        let headers: HashMap<String, String> = domain
            .auth_header(self.random.as_ref())
            .into_iter()
            .collect();

        let response = self.http.get(url, &headers).await?;
        if !response.is_success() {
            return Err(HostingError::Status {
                url: url.to_string(),
                status: response.status_code,
            });
        }
        Ok(response)
    }

    fn build_repository(
        &self,
        known: &KnownDomain,
        listing: RepoListing,
        publisher: &Arc<Publisher>,
    ) -> Repository {
        let mut headers = HashMap::new();
        let raw_host = Url::parse(&listing.file_raw_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        if let Some(host) = raw_host {
            if known.domain.uses_token_for(&host) {
                headers.extend(known.domain.auth_header(self.random.as_ref()));
            }
        }

        Repository {
            name: listing.name,
            hostname: listing.hostname,
            file_raw_url: listing.file_raw_url,
            git_clone_url: listing.git_clone_url,
            git_branch: listing.git_branch,
            domain: known.domain.clone(),
            publisher: publisher.clone(),
            headers,
            metadata: listing.metadata,
        }
    }
}

#[cfg(test)]
#[path = "pagination_service_test.rs"]
mod tests;
