// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：托管域、发布者、候选仓库与索引文档
/// - 仓库接口（repositories）：索引、git、黑名单与死信的抽象接口
/// - 服务（services）：分页、清单校验、活跃度与索引发布
pub mod models;
pub mod repositories;
pub mod services;
