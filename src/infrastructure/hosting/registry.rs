// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::bitbucket::BitbucketProvider;
use super::github::GithubProvider;
use super::gitlab::GitlabProvider;
use super::{HostingError, HostingProvider};
use crate::domain::models::hosting_domain::{HostingDomain, ProviderKind};
use crate::domain::repositories::storage_repository::StorageError;

/// 已知托管域：配置加上对应平台的实现
#[derive(Clone)]
pub struct KnownDomain {
    pub domain: Arc<HostingDomain>,
    pub provider: Arc<dyn HostingProvider>,
}

impl std::fmt::Debug for KnownDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnownDomain")
            .field("domain", &self.domain.id)
            .field("provider", &self.provider.kind())
            .finish()
    }
}

/// 根据平台类型创建实现
pub fn create_provider(kind: ProviderKind) -> Arc<dyn HostingProvider> {
    match kind {
        ProviderKind::Github => Arc::new(GithubProvider),
        ProviderKind::Gitlab => Arc::new(GitlabProvider),
        ProviderKind::Bitbucket => Arc::new(BitbucketProvider),
    }
}

/// 托管域注册表
///
/// 每个可爬取的 URL 必须恰好解析到一个托管域
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    domains: Vec<KnownDomain>,
}

impl DomainRegistry {
    /// 由托管域列表构建注册表，主机重复时报错
    pub fn new(domains: Vec<HostingDomain>) -> Result<Self, HostingError> {
        let mut known: Vec<KnownDomain> = Vec::with_capacity(domains.len());
        for domain in domains {
            if known.iter().any(|k| k.domain.matches_host(&domain.host)) {
                return Err(HostingError::DuplicateHost(domain.host));
            }
            known.push(KnownDomain {
                provider: create_provider(domain.provider),
                domain: Arc::new(domain),
            });
        }
        Ok(Self { domains: known })
    }

    /// 从 YAML 文件加载托管域
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = std::fs::read_to_string(path)?;
        let domains: Vec<HostingDomain> =
            serde_yaml::from_str(&content).map_err(|source| StorageError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded {} hosting domains from {}", domains.len(), path.display());
        Self::new(domains).map_err(|e| StorageError::Invalid(e.to_string()))
    }

    /// 按 URL 的主机名查找托管域
    pub fn resolve(&self, url: &str) -> Result<&KnownDomain, HostingError> {
        let parsed = Url::parse(url).map_err(|_| HostingError::InvalidUrl(url.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| HostingError::InvalidUrl(url.to_string()))?;

        self.domains
            .iter()
            .find(|k| k.domain.matches_host(host))
            .ok_or_else(|| HostingError::UnknownHost(host.to_string()))
    }

    /// 已配置的托管域数量
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn domain(host: &str, provider: ProviderKind) -> HostingDomain {
        HostingDomain {
            id: host.to_string(),
            description: String::new(),
            host: host.to_string(),
            provider,
            api_base_url: None,
            raw_base_url: None,
            basic_auth: vec![],
            use_token_for: vec![],
        }
    }

    #[test]
    fn test_resolve_known_and_unknown_hosts() {
        let registry = DomainRegistry::new(vec![
            domain("github.com", ProviderKind::Github),
            domain("gitlab.com", ProviderKind::Gitlab),
        ])
        .unwrap();

        let known = registry.resolve("https://GitLab.com/comune").unwrap();
        assert_eq!(known.provider.kind(), ProviderKind::Gitlab);

        assert!(matches!(
            registry.resolve("https://example.org/x"),
            Err(HostingError::UnknownHost(h)) if h == "example.org"
        ));
        assert!(matches!(
            registry.resolve("not a url"),
            Err(HostingError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_duplicate_hosts_are_rejected() {
        let result = DomainRegistry::new(vec![
            domain("github.com", ProviderKind::Github),
            domain("github.com", ProviderKind::Gitlab),
        ]);
        assert!(matches!(result, Err(HostingError::DuplicateHost(_))));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "- id: bitbucket.org\n  host: bitbucket.org\n  provider: bitbucket\n- id: github.com\n  host: github.com\n  provider: github\n  basic-auth: [\"a:b\"]"
        )
        .unwrap();

        let registry = DomainRegistry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_load_reports_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- id: [").unwrap();

        assert!(matches!(
            DomainRegistry::load(file.path()),
            Err(StorageError::Yaml { .. })
        ));
    }
}
