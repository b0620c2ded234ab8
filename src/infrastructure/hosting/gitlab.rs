// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{
    from_value, parse_json, DecodeContext, HostingError, HostingProvider, ListingPage, RepoListing,
};
use crate::domain::models::hosting_domain::{HostingDomain, ProviderKind};
use crate::engines::traits::HttpResponse;
use crate::utils::url_utils::{path_segments, with_query_param};

#[derive(Debug, Deserialize)]
struct GitlabProject {
    path_with_namespace: String,
    http_url_to_repo: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    visibility: Option<String>,
}

/// GitLab 列表 API (v4)
///
/// 组织地址可能是带子组的群组，也可能是用户名
#[derive(Debug, Default, Clone, Copy)]
pub struct GitlabProvider;

impl GitlabProvider {
    fn namespace(url: &Url) -> Result<String, HostingError> {
        let segments = path_segments(url);
        if segments.is_empty() {
            return Err(HostingError::InvalidUrl(url.to_string()));
        }
        Ok(segments.join("/"))
    }

    fn listing(ctx: &DecodeContext<'_>, value: Value) -> Result<Option<RepoListing>, HostingError> {
        let project: GitlabProject = from_value(ctx.page_url, value.clone())?;
        if project.visibility.as_deref() == Some("private") {
            return Ok(None);
        }
        let branch = project
            .default_branch
            .unwrap_or_else(|| "master".to_string());
        Ok(Some(RepoListing {
            file_raw_url: format!(
                "{}/{}/-/raw/{}/{}",
                ctx.domain.raw_base(),
                project.path_with_namespace,
                branch,
                ctx.crawled_filename
            ),
            name: project.path_with_namespace,
            hostname: ctx.domain.host.clone(),
            git_clone_url: project.http_url_to_repo,
            git_branch: branch,
            metadata: value,
        }))
    }
}

impl HostingProvider for GitlabProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gitlab
    }

    fn api_urls(&self, domain: &HostingDomain, org_url: &Url) -> Result<Vec<String>, HostingError> {
        let namespace = Self::namespace(org_url)?;
        let encoded = urlencoding::encode(&namespace);
        let api = domain.api_base();

        let mut urls = vec![format!(
            "{}/api/v4/groups/{}/projects?include_subgroups=true&per_page=100&page=1",
            api, encoded
        )];
        // Only a single path segment can name a user
        if !namespace.contains('/') {
            urls.push(format!(
                "{}/api/v4/users/{}/projects?per_page=100&page=1",
                api, encoded
            ));
        }
        Ok(urls)
    }

    fn repository_api_url(
        &self,
        domain: &HostingDomain,
        repo_url: &Url,
    ) -> Result<String, HostingError> {
        let namespace = Self::namespace(repo_url)?;
        if !namespace.contains('/') {
            return Err(HostingError::InvalidUrl(repo_url.to_string()));
        }
        Ok(format!(
            "{}/api/v4/projects/{}",
            domain.api_base(),
            urlencoding::encode(&namespace)
        ))
    }

    fn decode_page(
        &self,
        ctx: &DecodeContext<'_>,
        response: &HttpResponse,
    ) -> Result<ListingPage, HostingError> {
        let items: Vec<Value> = from_value(ctx.page_url, parse_json(ctx.page_url, &response.body)?)?;

        let mut repositories = Vec::with_capacity(items.len());
        for item in items {
            if let Some(listing) = Self::listing(ctx, item)? {
                repositories.push(listing);
            }
        }

        let next = match response.header("x-next-page").map(str::trim) {
            Some(page) if !page.is_empty() => Some(
                with_query_param(ctx.page_url, "page", page)
                    .map_err(|_| HostingError::InvalidUrl(ctx.page_url.to_string()))?,
            ),
            _ => None,
        };

        Ok(ListingPage { repositories, next })
    }

    fn decode_repository(
        &self,
        ctx: &DecodeContext<'_>,
        response: &HttpResponse,
    ) -> Result<Option<RepoListing>, HostingError> {
        Self::listing(ctx, parse_json(ctx.page_url, &response.body)?)
    }
}
