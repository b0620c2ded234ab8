// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理爬虫、索引、HTTP 传输和指标导出的配置设置
pub mod settings;
