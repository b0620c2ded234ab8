// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::domain::models::hosting_domain::HostingDomain;
use crate::domain::models::publisher::Publisher;
use crate::engines::traits::HttpClient;
use crate::utils::random::RandomSource;
use crate::utils::url_utils::resolve_url;

/// 清单错误类型
#[derive(Error, Debug)]
pub enum ManifestError {
    /// YAML 语法错误
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// 缺少必填字段
    #[error("missing required key {0}")]
    MissingKey(&'static str),

    /// 字段值非法
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    /// 引用的资源无法访问
    #[error("reference {url} is unreachable: {reason}")]
    UnreachableReference { url: String, reason: String },

    /// 清单声明的 IPA 代码与白名单不一致
    #[error("codiceIPA mismatch: manifest declares {found:?}, whitelist expects {expected:?}")]
    IpaMismatch { expected: String, found: String },
}

/// 解析上下文
///
/// 相对引用基于 `base_url` 解析；访问引用时按托管域选择凭据
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub base_url: &'a str,
    pub domain: &'a HostingDomain,
}

/// 解析后的清单
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub version: String,
    pub name: String,
    pub url: String,
    /// `it.riuso.codiceIPA`
    pub codice_ipa: Option<String>,
    /// 已解析为绝对地址的 logo
    pub logo: Option<String>,
    /// 已解析为绝对地址的截图
    pub screenshots: Vec<String>,
    /// 完整文档
    pub document: Value,
}

/// 清单解析器接口
#[async_trait]
pub trait ManifestParser: Send + Sync {
    async fn parse(&self, content: &[u8], ctx: &ParseContext<'_>) -> Result<Manifest, ManifestError>;
}

/// publiccode.yml 解析器
pub struct PubliccodeParser {
    http: Arc<dyn HttpClient>,
    random: Arc<dyn RandomSource>,
    verify_references: bool,
}

impl PubliccodeParser {
    pub fn new(
        http: Arc<dyn HttpClient>,
        random: Arc<dyn RandomSource>,
        verify_references: bool,
    ) -> Self {
        Self {
            http,
            random,
            verify_references,
        }
    }

    fn required_str(document: &Value, key: &'static str) -> Result<String, ManifestError> {
        match document.get(key) {
            None | Some(Value::Null) => Err(ManifestError::MissingKey(key)),
            Some(Value::String(s)) if s.trim().is_empty() => Err(ManifestError::MissingKey(key)),
            Some(Value::String(s)) => Ok(s.trim().to_string()),
            // `publiccodeYmlVersion: 0.2` is read by YAML as a number
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(ManifestError::InvalidValue {
                key,
                message: format!("expected a string, got {}", other),
            }),
        }
    }

    fn resolve(base: &Url, key: &'static str, reference: &str) -> Result<String, ManifestError> {
        resolve_url(base, reference.trim())
            .map(|u| u.to_string())
            .map_err(|e| ManifestError::InvalidValue {
                key,
                message: format!("{}: {}", reference, e),
            })
    }

    async fn verify(&self, reference: &str, domain: &HostingDomain) -> Result<(), ManifestError> {
        let unreachable = |reason: String| ManifestError::UnreachableReference {
            url: reference.to_string(),
            reason,
        };

        let host = Url::parse(reference)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        let mut headers = HashMap::new();
        if domain.uses_token_for(&host) {
            headers.extend(domain.auth_header(self.random.as_ref()));
        }

        let response = self
            .http
            .get(reference, &headers)
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        if !response.is_success() {
            return Err(unreachable(format!("status {}", response.status_code)));
        }
        debug!("Verified reference {}", reference);
        Ok(())
    }
}

#[async_trait]
impl ManifestParser for PubliccodeParser {
    async fn parse(&self, content: &[u8], ctx: &ParseContext<'_>) -> Result<Manifest, ManifestError> {
        let document: Value = serde_yaml::from_slice(content)?;
        if !document.is_object() {
            return Err(ManifestError::InvalidValue {
                key: "publiccodeYmlVersion",
                message: "document is not a mapping".to_string(),
            });
        }

        let version = Self::required_str(&document, "publiccodeYmlVersion")?;
        let name = Self::required_str(&document, "name")?;
        let url = Self::required_str(&document, "url")?;
        Url::parse(&url).map_err(|e| ManifestError::InvalidValue {
            key: "url",
            message: e.to_string(),
        })?;

        let codice_ipa = document
            .pointer("/it/riuso/codiceIPA")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let base = Url::parse(ctx.base_url).map_err(|e| ManifestError::InvalidValue {
            key: "logo",
            message: format!("bad base url {}: {}", ctx.base_url, e),
        })?;
        let logo = document
            .get("logo")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(|s| Self::resolve(&base, "logo", s))
            .transpose()?;
        let screenshots = document
            .pointer("/description")
            .and_then(Value::as_object)
            .map(|languages| {
                languages
                    .values()
                    .filter_map(|d| d.get("screenshots").and_then(Value::as_array))
                    .flatten()
                    .filter_map(Value::as_str)
                    .map(|s| Self::resolve(&base, "screenshots", s))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        if self.verify_references {
            for reference in logo.iter().chain(screenshots.iter()) {
                self.verify(reference, ctx.domain).await?;
            }
        }

        Ok(Manifest {
            version,
            name,
            url,
            codice_ipa,
            logo,
            screenshots,
            document,
        })
    }
}

/// 比较两个 IPA 代码：去除首尾空白后大小写不敏感相等
pub fn ipa_codes_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// 校验清单声明的 IPA 代码与发布者白名单一致
pub fn validate_ipa(publisher: &Publisher, manifest: &Manifest) -> Result<(), ManifestError> {
    let found = manifest.codice_ipa.as_deref().unwrap_or_default();
    if ipa_codes_match(&publisher.codice_ipa, found) {
        return Ok(());
    }
    Err(ManifestError::IpaMismatch {
        expected: publisher.codice_ipa.trim().to_string(),
        found: found.to_string(),
    })
}

/// 不做校验地读取清单，用于跳过白名单校验的发布者
///
/// 无法解析时返回 `Value::Null`
pub fn raw_document(content: &[u8]) -> Value {
    serde_yaml::from_slice(content).unwrap_or(Value::Null)
}

#[cfg(test)]
#[path = "manifest_service_test.rs"]
mod tests;
