// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 托管域（hosting_domain）：一个代码托管平台及其认证规则
/// - 发布者（publisher）：白名单中的组织/机构
/// - 候选仓库（repository）：流水线中的单个工作单元
/// - 活跃度（activity）：由提交历史派生的活跃度指数与活力序列
/// - 黑名单（blacklist）：需要从索引中移除的仓库
/// - 索引文档（index_document）：发布到搜索索引的文档结构
pub mod activity;
pub mod blacklist;
pub mod hosting_domain;
pub mod index_document;
pub mod publisher;
pub mod repository;
