// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::models::index_document::document_key;

/// 黑名单快照：克隆地址 → 需要从索引中删除的外部标识
pub type BlacklistSnapshot = HashMap<String, String>;

/// 黑名单条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// 仓库克隆地址
    pub url: String,
    /// 列入黑名单的原因
    #[serde(default)]
    pub reason: Option<String>,
}

impl BlacklistEntry {
    /// 已发布文档的标识，与发布时使用的文档键一致
    pub fn external_id(&self) -> String {
        document_key(&self.url)
    }
}

/// 将条目列表转换为快照
pub fn snapshot<I>(entries: I) -> BlacklistSnapshot
where
    I: IntoIterator<Item = BlacklistEntry>,
{
    entries
        .into_iter()
        .map(|entry| {
            let id = entry.external_id();
            (entry.url.trim().to_string(), id)
        })
        .collect()
}
