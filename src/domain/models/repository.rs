// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::models::hosting_domain::HostingDomain;
use crate::domain::models::publisher::Publisher;

/// 候选仓库
///
/// 由生产者在分页过程中创建，恰好被一个工作器消费一次，随后丢弃。
/// 该类型不实现 `Clone`，同一个值不可能同时出现在两个工作器中。
#[derive(Debug)]
pub struct Repository {
    /// 仓库名称（通常为 `owner/name`）
    pub name: String,
    /// 仓库所在主机名
    pub hostname: String,
    /// 清单文件的原始地址
    pub file_raw_url: String,
    /// git 克隆地址
    pub git_clone_url: String,
    /// 分支
    pub git_branch: String,
    /// 所属托管域
    pub domain: Arc<HostingDomain>,
    /// 所属发布者
    pub publisher: Arc<Publisher>,
    /// 获取清单时需要附带的请求头
    pub headers: HashMap<String, String>,
    /// 列表 API 返回的原始仓库信息
    pub metadata: serde_json::Value,
}
