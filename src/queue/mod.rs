// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 生产者 → 无界入口通道 → 黑名单过滤器 → 有界工作通道 → 工作器池
pub mod blacklist_filter;
pub mod intake;
pub mod producer;
