// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 显式构造的爬虫上下文与爬取用例，负责把各层组件编排成完整的流水线
pub mod context;
pub mod use_cases;

pub use context::{CrawlerContext, CrawlerContextBuilder};
pub use use_cases::crawl_use_case::{CrawlSummary, CrawlUseCase};
