// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 由克隆地址计算确定性的文档键
///
/// 同一仓库重复爬取时覆盖原文档而不是新增
pub fn document_key(git_clone_url: &str) -> String {
    hex::encode(Sha256::digest(git_clone_url.trim().as_bytes()))
}

/// 发布到清单索引中的文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub name: String,
    pub hostname: String,
    pub domain_id: String,
    pub file_raw_url: String,
    pub git_clone_url: String,
    pub publisher_ipa: String,
    pub publisher_name: String,
    pub activity_index: f64,
    pub vitality: Vec<u32>,
    /// 解析后的清单内容
    pub manifest: serde_json::Value,
    /// 清单原文
    pub manifest_raw: String,
    /// 托管平台返回的仓库信息
    pub metadata: serde_json::Value,
    pub crawled_at: DateTime<Utc>,
}

/// 发布者索引中的文档，以 IPA 编码为键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherDocument {
    pub codice_ipa: String,
    pub name: String,
    pub organizations: Vec<String>,
}
