// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 索引存储模块
///
/// 基于 Elasticsearch REST API 的索引实现
pub mod elastic_index;

pub use elastic_index::ElasticIndexRepository;
