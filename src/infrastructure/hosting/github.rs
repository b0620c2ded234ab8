// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

use super::{
    from_value, leading_segments, parse_json, DecodeContext, HostingError, HostingProvider,
    ListingPage, RepoListing,
};
use crate::domain::models::hosting_domain::{HostingDomain, ProviderKind};
use crate::engines::traits::HttpResponse;

static NEXT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).expect("static regex"));

#[derive(Debug, Deserialize)]
struct GithubRepo {
    full_name: String,
    clone_url: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    private: bool,
}

/// GitHub 列表 API
///
/// 组织与用户使用不同的端点，因此每个组织地址生成两个起始地址
#[derive(Debug, Default, Clone, Copy)]
pub struct GithubProvider;

impl GithubProvider {
    fn listing(ctx: &DecodeContext<'_>, value: Value) -> Result<Option<RepoListing>, HostingError> {
        let repo: GithubRepo = from_value(ctx.page_url, value.clone())?;
        if repo.private {
            return Ok(None);
        }
        let branch = repo.default_branch.unwrap_or_else(|| "main".to_string());
        Ok(Some(RepoListing {
            file_raw_url: format!(
                "{}/{}/{}/{}",
                ctx.domain.raw_base(),
                repo.full_name,
                branch,
                ctx.crawled_filename
            ),
            name: repo.full_name,
            hostname: ctx.domain.host.clone(),
            git_clone_url: repo.clone_url,
            git_branch: branch,
            metadata: value,
        }))
    }

    /// 从 `Link` 头中提取下一页地址
    pub fn next_link(link_header: &str) -> Option<String> {
        NEXT_LINK
            .captures(link_header)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl HostingProvider for GithubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Github
    }

    fn api_urls(&self, domain: &HostingDomain, org_url: &Url) -> Result<Vec<String>, HostingError> {
        let org = leading_segments(org_url, 1)?.remove(0);
        let api = domain.api_base();
        Ok(vec![
            format!("{}/orgs/{}/repos?per_page=100", api, org),
            format!("{}/users/{}/repos?per_page=100", api, org),
        ])
    }

    fn repository_api_url(
        &self,
        domain: &HostingDomain,
        repo_url: &Url,
    ) -> Result<String, HostingError> {
        let segments = leading_segments(repo_url, 2)?;
        Ok(format!(
            "{}/repos/{}/{}",
            domain.api_base(),
            segments[0],
            segments[1]
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

        Ok(ListingPage {
            repositories,
            next: response.header("link").and_then(Self::next_link),
        })
    }

    fn decode_repository(
        &self,
        ctx: &DecodeContext<'_>,
        response: &HttpResponse,
    ) -> Result<Option<RepoListing>, HostingError> {
        Self::listing(ctx, parse_json(ctx.page_url, &response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn domain() -> HostingDomain {
        HostingDomain {
            id: "github.com".to_string(),
            description: String::new(),
            host: "github.com".to_string(),
            provider: ProviderKind::Github,
            api_base_url: None,
            raw_base_url: None,
            basic_auth: vec![],
            use_token_for: vec![],
        }
    }

    #[test]
    fn test_api_urls_cover_orgs_and_users() {
        let url = Url::parse("https://github.com/italia").unwrap();
        let urls = GithubProvider.api_urls(&domain(), &url).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://api.github.com/orgs/italia/repos?per_page=100",
                "https://api.github.com/users/italia/repos?per_page=100",
            ]
        );
    }

    #[test]
    fn test_api_urls_reject_bare_host() {
        let url = Url::parse("https://github.com/").unwrap();
        assert!(GithubProvider.api_urls(&domain(), &url).is_err());
    }

    #[test]
    fn test_next_link() {
        let header = r#"<https://api.github.com/organizations/1/repos?page=2>; rel="next", <https://api.github.com/organizations/1/repos?page=5>; rel="last""#;
        assert_eq!(
            GithubProvider::next_link(header).as_deref(),
            Some("https://api.github.com/organizations/1/repos?page=2")
        );
        assert_eq!(
            GithubProvider::next_link(r#"<https://x/?page=1>; rel="prev""#),
            None
        );
    }

    #[test]
    fn test_decode_page_skips_private_repositories() {
        let body = serde_json::json!([
            {"full_name": "italia/app", "clone_url": "https://github.com/italia/app.git", "default_branch": "develop"},
            {"full_name": "italia/secret", "clone_url": "https://github.com/italia/secret.git", "private": true}
        ]);
        let response = HttpResponse {
            status_code: 200,
            headers: HashMap::new(),
            body: serde_json::to_vec(&body).unwrap(),
        };
        let domain = domain();
        let ctx = DecodeContext {
            domain: &domain,
            crawled_filename: "publiccode.yml",
            page_url: "https://api.github.com/orgs/italia/repos",
        };

        let page = GithubProvider.decode_page(&ctx, &response).unwrap();
        assert_eq!(page.next, None);
        assert_eq!(page.repositories.len(), 1);
        let repo = &page.repositories[0];
        assert_eq!(repo.name, "italia/app");
        assert_eq!(repo.git_branch, "develop");
        assert_eq!(
            repo.file_raw_url,
            "https://raw.githubusercontent.com/italia/app/develop/publiccode.yml"
        );
        assert_eq!(repo.metadata["full_name"], "italia/app");
    }

    #[test]
    fn test_decode_page_rejects_garbage() {
        let response = HttpResponse {
            status_code: 200,
            headers: HashMap::new(),
            body: b"<html>".to_vec(),
        };
        let domain = domain();
        let ctx = DecodeContext {
            domain: &domain,
            crawled_filename: "publiccode.yml",
            page_url: "https://api.github.com/orgs/italia/repos",
        };
        assert!(matches!(
            GithubProvider.decode_page(&ctx, &response),
            Err(HostingError::Decode { .. })
        ));
    }
}
