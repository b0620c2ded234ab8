// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 黑名单仓库（blacklist_repository）：读取黑名单快照
/// - 死信仓库（dead_letter_repository）：保存校验失败的清单
/// - git 仓库（git_repository）：本地克隆与提交历史
/// - 索引仓库（index_repository）：搜索索引的写入、刷新与别名更新
/// - 存储错误（storage_repository）：文件类仓库共用的错误类型
pub mod blacklist_repository;
pub mod dead_letter_repository;
pub mod git_repository;
pub mod index_repository;
pub mod storage_repository;
