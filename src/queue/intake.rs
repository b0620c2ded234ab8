// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::domain::models::repository::Repository;

/// 入口通道发送端（无界），由生产者持有
pub type IntakeSender = mpsc::UnboundedSender<Repository>;
/// 入口通道接收端，由黑名单过滤器独占
pub type IntakeReceiver = mpsc::UnboundedReceiver<Repository>;
/// 工作通道发送端（有界）
pub type WorkSender = mpsc::Sender<Repository>;

/// 创建入口通道
pub fn intake_channel() -> (IntakeSender, IntakeReceiver) {
    mpsc::unbounded_channel()
}

/// 创建有界工作通道
pub fn work_channel(capacity: usize) -> (WorkSender, WorkQueue) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, WorkQueue::new(rx))
}

/// 工作队列
///
/// 多个工作器共享同一个接收端；每个候选仓库只会被一个工作器取出。
/// 所有发送端释放且队列取空后 `next` 返回 `None`。
#[derive(Debug, Clone)]
pub struct WorkQueue {
    receiver: Arc<Mutex<mpsc::Receiver<Repository>>>,
}

impl WorkQueue {
    fn new(receiver: mpsc::Receiver<Repository>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// 取出下一个候选仓库
    pub async fn next(&self) -> Option<Repository> {
        self.receiver.lock().await.recv().await
    }
}
