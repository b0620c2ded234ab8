// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use url::Url;
use validator::{Validate, ValidationError};

/// 发布者（机构）
///
/// 白名单中的一条记录：IPA 编码、名称、需要扫描的组织地址和直接仓库地址。
/// 在爬取开始前加载，爬取期间只读。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Publisher {
    /// 白名单中的 IPA 编码
    #[serde(rename = "codiceIPA", default)]
    pub codice_ipa: String,
    /// 显示名称
    #[validate(length(min = 1))]
    pub name: String,
    /// 组织列表地址
    #[serde(default)]
    #[validate(custom(function = "validate_urls"))]
    pub organizations: Vec<String>,
    /// 直接仓库地址
    #[serde(default, rename = "repos")]
    #[validate(custom(function = "validate_urls"))]
    pub repositories: Vec<String>,
    /// 为 true 时跳过 IPA 编码比对
    #[serde(default, rename = "unknownIPA")]
    pub unknown_ipa: bool,
}

#[allow(clippy::ptr_arg)]
fn validate_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    for raw in urls {
        let valid = Url::parse(raw)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false);
        if !valid {
            let mut err = ValidationError::new("url");
            err.message = Some(format!("invalid url: {}", raw).into());
            return Err(err);
        }
    }
    Ok(())
}

impl Publisher {
    /// 为不在白名单中的仓库构造一个跳过 IPA 校验的发布者
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unknown_ipa: true,
            ..Default::default()
        }
    }

    /// 判断仓库地址是否属于本发布者（直接列出或位于某个组织之下）
    pub fn claims(&self, repo_url: &str) -> bool {
        let target = normalize(repo_url);
        self.repositories.iter().any(|r| normalize(r) == target)
            || self.organizations.iter().any(|org| {
                let prefix = format!("{}/", normalize(org));
                target.starts_with(&prefix)
            })
    }
}

fn normalize(url: &str) -> String {
    url.trim()
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .to_ascii_lowercase()
}
