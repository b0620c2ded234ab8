// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::random::RandomSource;

/// 托管平台类型
///
/// 决定使用哪一种分页列表 API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// GitHub REST API
    Github,
    /// GitLab REST API v4
    Gitlab,
    /// Bitbucket Cloud API 2.0
    Bitbucket,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderKind::Github => write!(f, "github"),
            ProviderKind::Gitlab => write!(f, "gitlab"),
            ProviderKind::Bitbucket => write!(f, "bitbucket"),
        }
    }
}

/// 托管域
///
/// 描述一个代码托管平台：主机名、API 地址以及认证选择规则。
/// 加载后不可变，通过 URL 的主机名查找。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingDomain {
    /// 域标识，同时用于本地克隆目录的命名空间
    pub id: String,
    /// 描述
    #[serde(default)]
    pub description: String,
    /// 组织/仓库 URL 的主机名
    pub host: String,
    /// 平台类型
    pub provider: ProviderKind,
    /// 覆盖默认的 API 地址（自建实例）
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// 覆盖默认的原始文件地址
    #[serde(default)]
    pub raw_base_url: Option<String>,
    /// `user:token` 形式的凭据，每次请求随机选择一个
    #[serde(default, rename = "basic-auth")]
    pub basic_auth: Vec<String>,
    /// 需要携带凭据访问的主机列表
    #[serde(default, rename = "use-token-for")]
    pub use_token_for: Vec<String>,
}

impl HostingDomain {
    /// 判断主机名是否属于本域
    pub fn matches_host(&self, host: &str) -> bool {
        self.host.eq_ignore_ascii_case(host)
    }

    /// 判断访问某个主机时是否需要附带凭据
    pub fn uses_token_for(&self, host: &str) -> bool {
        self.use_token_for
            .iter()
            .any(|h| h.eq_ignore_ascii_case(host))
    }

    /// API 基础地址，末尾不带 `/`
    pub fn api_base(&self) -> String {
        let base = match (&self.api_base_url, self.provider) {
            (Some(url), _) => url.clone(),
            (None, ProviderKind::Github) => "https://api.github.com".to_string(),
            (None, ProviderKind::Gitlab) => format!("https://{}", self.host),
            (None, ProviderKind::Bitbucket) => "https://api.bitbucket.org".to_string(),
        };
        base.trim_end_matches('/').to_string()
    }

    /// 原始文件基础地址，末尾不带 `/`
    pub fn raw_base(&self) -> String {
        let base = match (&self.raw_base_url, self.provider) {
            (Some(url), _) => url.clone(),
            (None, ProviderKind::Github) => "https://raw.githubusercontent.com".to_string(),
            (None, _) => format!("https://{}", self.host),
        };
        base.trim_end_matches('/').to_string()
    }

    /// 随机选择一组凭据并生成 `Authorization` 头
    ///
    /// 未配置凭据时返回 `None`
    pub fn auth_header(&self, random: &dyn RandomSource) -> Option<(String, String)> {
        if self.basic_auth.is_empty() {
            return None;
        }
        let index = random.below(self.basic_auth.len());
        let credentials = self.basic_auth.get(index)?;
        Some((
            "Authorization".to_string(),
            format!("Basic {}", STANDARD.encode(credentials.as_bytes())),
        ))
    }
}
