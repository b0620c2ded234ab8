// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};

use crate::domain::models::activity::ActivityRecord;

const SECONDS_PER_DAY: i64 = 86_400;

/// 活跃度计算器
///
/// 把窗口内的提交时间按固定大小分桶（最旧的桶在前），
/// 并计算按新近程度加权的活跃度指数。
#[derive(Debug, Clone, Copy)]
pub struct ActivityCalculator {
    window_days: u32,
    bucket_days: u32,
}

impl ActivityCalculator {
    /// 创建计算器，窗口与桶大小至少为 1 天
    pub fn new(window_days: u32, bucket_days: u32) -> Self {
        Self {
            window_days: window_days.max(1),
            bucket_days: bucket_days.max(1),
        }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// 桶的数量，最后一个桶可能不足 `bucket_days` 天
    pub fn bucket_count(&self) -> usize {
        self.window_days.div_ceil(self.bucket_days) as usize
    }

    /// 计算活跃度
    ///
    /// 只统计 `(now - window, now]` 内的提交；窗口外或晚于 `now` 的时间戳被忽略。
    /// 空历史得到指数 0 与全 0 的桶序列。
    pub fn calculate(&self, timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> ActivityRecord {
        let mut record = ActivityRecord::empty(self.bucket_count());
        let window_secs = i64::from(self.window_days) * SECONDS_PER_DAY;
        let bucket_secs = i64::from(self.bucket_days) * SECONDS_PER_DAY;
        let last = record.vitality.len() - 1;

        let mut score = 0.0_f64;
        for timestamp in timestamps {
            let age = (now - *timestamp).num_seconds();
            if age < 0 || age >= window_secs {
                continue;
            }
            let from_end = (age / bucket_secs) as usize;
            record.vitality[last - from_end] += 1;
            // Linear decay: a commit made now weighs 1, one at the window edge ~0
            score += 1.0 - age as f64 / window_secs as f64;
        }

        record.activity_index = Self::squash(score, self.reference_score());
        record
    }

    // One commit every other day, evenly spread, lands at ~63
    fn reference_score(&self) -> f64 {
        f64::from(self.window_days) / 4.0
    }

    fn squash(score: f64, reference: f64) -> f64 {
        if score <= 0.0 {
            return 0.0;
        }
        100.0 * (1.0 - (-score / reference).exp())
    }
}
