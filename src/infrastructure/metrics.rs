// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

pub const REPOSITORY_PROCESSED: &str = "repository_processed";
pub const REPOSITORY_SKIPPED: &str = "repository_skipped";
pub const REPOSITORY_REJECTED: &str = "repository_rejected";
pub const REPOSITORY_CLONED: &str = "repository_cloned";
pub const REPOSITORY_FILE_INDEXED: &str = "repository_file_indexed";
pub const REPOSITORY_BLACKLISTED: &str = "repository_blacklisted";

/// 计数器接口
///
/// 只做累加，失败时不影响爬取
pub trait CounterSink: Send + Sync {
    fn increment(&self, name: &'static str);
}

/// 基于 `metrics` 宏的计数器，按索引名打标签
#[derive(Debug, Clone)]
pub struct PrometheusCounters {
    index: String,
}

impl PrometheusCounters {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
        }
    }
}

impl CounterSink for PrometheusCounters {
    fn increment(&self, name: &'static str) {
        metrics::counter!(name, "index" => self.index.clone()).increment(1);
    }
}

/// 内存计数器，用于测试与统计汇总
#[derive(Debug, Default)]
pub struct MemoryCounters {
    counts: Mutex<HashMap<&'static str, u64>>,
}

impl MemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }
}

impl CounterSink for MemoryCounters {
    fn increment(&self, name: &'static str) {
        *self.counts.lock().entry(name).or_insert(0) += 1;
    }
}

/// 初始化指标系统
///
/// 启用时安装 Prometheus 导出器并注册计数器说明
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen, e);
            return;
        }
    };

    // Address in use is not fatal for a crawl
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    describe_counter!(REPOSITORY_PROCESSED, "Number of repositories processed");
    describe_counter!(REPOSITORY_SKIPPED, "Number of repositories without a manifest");
    describe_counter!(REPOSITORY_REJECTED, "Number of manifests that failed validation");
    describe_counter!(REPOSITORY_CLONED, "Number of repositories cloned");
    describe_counter!(REPOSITORY_FILE_INDEXED, "Number of manifests indexed");
    describe_counter!(REPOSITORY_BLACKLISTED, "Number of blacklisted repositories");

    info!("Metrics exporter listening on {}", addr);
}
