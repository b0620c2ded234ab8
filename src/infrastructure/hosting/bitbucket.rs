// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{
    from_value, leading_segments, parse_json, DecodeContext, HostingError, HostingProvider,
    ListingPage, RepoListing,
};
use crate::domain::models::hosting_domain::{HostingDomain, ProviderKind};
use crate::engines::traits::HttpResponse;

#[derive(Debug, Deserialize)]
struct BitbucketPage {
    #[serde(default)]
    values: Vec<Value>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BitbucketRepo {
    full_name: String,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    mainbranch: Option<BitbucketBranch>,
    links: BitbucketLinks,
}

#[derive(Debug, Deserialize)]
struct BitbucketBranch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BitbucketLinks {
    #[serde(default)]
    clone: Vec<BitbucketCloneLink>,
}

#[derive(Debug, Deserialize)]
struct BitbucketCloneLink {
    name: String,
    href: String,
}

/// Bitbucket Cloud 列表 API (2.0)
#[derive(Debug, Default, Clone, Copy)]
pub struct BitbucketProvider;

impl BitbucketProvider {
    fn listing(ctx: &DecodeContext<'_>, value: Value) -> Result<Option<RepoListing>, HostingError> {
        let repo: BitbucketRepo = from_value(ctx.page_url, value.clone())?;
        if repo.is_private {
            return Ok(None);
        }
        let Some(clone) = repo.links.clone.into_iter().find(|l| l.name == "https") else {
            return Ok(None);
        };
        let branch = repo
            .mainbranch
            .map(|b| b.name)
            .unwrap_or_else(|| "master".to_string());

        Ok(Some(RepoListing {
            file_raw_url: format!(
                "{}/2.0/repositories/{}/src/{}/{}",
                ctx.domain.api_base(),
                repo.full_name,
                branch,
                ctx.crawled_filename
            ),
            name: repo.full_name,
            hostname: ctx.domain.host.clone(),
            git_clone_url: strip_userinfo(&clone.href),
            git_branch: branch,
            metadata: value,
        }))
    }
}

// Clone links carry the account name as userinfo
fn strip_userinfo(href: &str) -> String {
    match Url::parse(href) {
        Ok(mut url) => {
            let _ = url.set_username("");
            let _ = url.set_password(None);
            url.to_string()
        }
        Err(_) => href.to_string(),
    }
}

impl HostingProvider for BitbucketProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Bitbucket
    }

    fn api_urls(&self, domain: &HostingDomain, org_url: &Url) -> Result<Vec<String>, HostingError> {
        let workspace = leading_segments(org_url, 1)?.remove(0);
        Ok(vec![format!(
            "{}/2.0/repositories/{}?pagelen=100",
            domain.api_base(),
            workspace
        )])
    }

    fn repository_api_url(
        &self,
        domain: &HostingDomain,
        repo_url: &Url,
    ) -> Result<String, HostingError> {
        let segments = leading_segments(repo_url, 2)?;
        Ok(format!(
            "{}/2.0/repositories/{}/{}",
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
        let page: BitbucketPage =
            from_value(ctx.page_url, parse_json(ctx.page_url, &response.body)?)?;

        let mut repositories = Vec::with_capacity(page.values.len());
        for item in page.values {
            if let Some(listing) = Self::listing(ctx, item)? {
                repositories.push(listing);
            }
        }

        Ok(ListingPage {
            repositories,
            next: page.next.filter(|n| !n.is_empty()),
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
