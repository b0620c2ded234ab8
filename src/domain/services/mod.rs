// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含爬取流水线的核心业务逻辑：
/// - 分页服务（pagination_service）：驱动托管平台的列表 API 并推送候选仓库
/// - 清单服务（manifest_service）：解析 publiccode.yml 并校验 IPA 白名单
/// - 活跃度服务（activity_service）：由提交历史计算活跃度与分桶序列
/// - 索引发布器（index_publisher）：暂存文档、刷新缓冲并把别名挂到新索引
pub mod activity_service;
pub mod index_publisher;
pub mod manifest_service;
pub mod pagination_service;
