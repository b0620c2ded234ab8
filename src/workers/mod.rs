// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 固定大小的工作器池从有界工作队列中取出候选仓库，
/// 每个工作器完整处理一个仓库后才取下一个
pub mod manager;
pub mod repository_worker;
pub mod worker;

pub use manager::{PoolReport, WorkerManager};
pub use repository_worker::RepositoryWorker;
pub use worker::{ProcessOutcome, Worker};
