// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的具体实现
pub mod blacklist_repo_impl;
pub mod dead_letter_repo_impl;
pub mod git_repo_impl;
pub mod whitelist_repo_impl;
