// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 活跃度记录
///
/// 标量活跃度指数加上按时间分桶的提交数序列（最旧的桶在前）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// 活跃度指数，范围 `[0, 100)`
    pub activity_index: f64,
    /// 每个时间桶的提交数
    pub vitality: Vec<u32>,
}

impl ActivityRecord {
    /// 空历史对应的记录：指数为 0，所有桶为 0
    pub fn empty(bucket_count: usize) -> Self {
        Self {
            activity_index: 0.0,
            vitality: vec![0; bucket_count],
        }
    }

    /// 窗口内的提交总数
    pub fn total_commits(&self) -> u64 {
        self.vitality.iter().map(|&c| u64::from(c)).sum()
    }
}
