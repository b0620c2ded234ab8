// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rand::Rng;

/// 有界随机整数来源
///
/// 用于在多组凭据中挑选一组；测试中替换为固定值以保持确定性
pub trait RandomSource: Send + Sync {
    /// 返回 `[0, max)` 范围内的整数，`max` 为 0 时返回 0
    fn below(&self, max: usize) -> usize;
}

/// 基于线程本地 CSPRNG 的实现
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        rand::rng().random_range(0..max)
    }
}

/// 总是返回同一个值（对 `max` 取模）
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn below(&self, max: usize) -> usize {
        if max == 0 {
            0
        } else {
            self.0 % max
        }
    }
}
