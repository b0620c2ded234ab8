// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 托管平台（hosting）：GitHub、GitLab、Bitbucket 列表 API 的解码
/// - 指标（metrics）：计数器与 Prometheus 导出
/// - 仓库实现（repositories）：git、黑名单、白名单与死信文件的具体实现
/// - 索引（search）：基于 Elasticsearch REST API 的索引存储
///
/// 基础设施层依赖于领域层的抽象接口，领域层不依赖具体技术实现。
pub mod hosting;
pub mod metrics;
pub mod repositories;
pub mod search;
