// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// 应用程序配置设置
///
/// 包含爬虫、索引、HTTP 传输和指标导出等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 爬虫配置
    pub crawler: CrawlerSettings,
    /// Elasticsearch 配置
    pub elastic: ElasticSettings,
    /// HTTP 传输配置
    pub http: HttpSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 爬虫配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 数据目录，启动时必须存在
    pub data_dir: PathBuf,
    /// 仓库工作器数量
    pub workers: usize,
    /// 工作通道容量
    pub work_queue_capacity: usize,
    /// 活跃度统计窗口（天）
    pub activity_days: u32,
    /// 活力序列的分桶宽度（天）
    pub vitality_bucket_days: u32,
    /// 元数据清单文件名
    pub crawled_filename: String,
    /// 托管域配置文件
    pub domains_file: PathBuf,
    /// 黑名单目录
    pub blacklist_dir: PathBuf,
    /// 校验失败内容的死信文件（相对于数据目录）
    pub dead_letter_file: PathBuf,
    /// 是否校验清单中引用的远程资源
    pub verify_references: bool,
}

/// Elasticsearch 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ElasticSettings {
    /// 服务地址
    pub url: String,
    /// 用户名
    pub user: Option<String>,
    /// 密码
    pub password: Option<String>,
    /// 清单文档索引
    pub publiccode_index: String,
    /// 发布者索引
    pub publishers_index: String,
    /// 对外稳定别名
    pub alias: String,
    /// 批量写入阈值
    pub bulk_size: usize,
}

/// HTTP 传输配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 最大重试次数
    pub max_retries: u32,
    /// User-Agent
    pub user_agent: String,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 监听地址
    pub listen: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、配置文件和 `CRAWLER__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CRAWLER").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值构建配置（测试与嵌入场景）
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Crawler defaults
            .set_default("crawler.data_dir", "./data")?
            .set_default("crawler.workers", 5)?
            .set_default("crawler.work_queue_capacity", 1000)?
            .set_default("crawler.activity_days", 60)?
            .set_default("crawler.vitality_bucket_days", 1)?
            .set_default("crawler.crawled_filename", "publiccode.yml")?
            .set_default("crawler.domains_file", "domains.yml")?
            .set_default("crawler.blacklist_dir", "blacklists")?
            .set_default("crawler.dead_letter_file", "invalid_publiccode.log")?
            .set_default("crawler.verify_references", false)?
            // Elasticsearch defaults
            .set_default("elastic.url", "http://localhost:9200")?
            .set_default("elastic.publiccode_index", "publiccode")?
            .set_default("elastic.publishers_index", "publishers")?
            .set_default("elastic.alias", "catalog")?
            .set_default("elastic.bulk_size", 500)?
            // HTTP defaults
            .set_default("http.timeout_secs", 30)?
            .set_default("http.max_retries", 3)?
            .set_default(
                "http.user_agent",
                concat!("catalog-crawler/", env!("CARGO_PKG_VERSION")),
            )?
            // Metrics defaults
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen", "0.0.0.0:8081")
    }
}

impl CrawlerSettings {
    /// 检查数据目录是否存在
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        if self.data_dir.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::Message(format!(
                "the configured data directory ({}) does not exist",
                self.data_dir.display()
            )))
        }
    }

    /// 死信文件的完整路径
    pub fn dead_letter_path(&self) -> PathBuf {
        if self.dead_letter_file.is_absolute() {
            self.dead_letter_file.clone()
        } else {
            self.data_dir.join(&self.dead_letter_file)
        }
    }

    /// 本地克隆的根目录
    pub fn repos_root(&self) -> PathBuf {
        self.data_dir.join("repos")
    }

    /// 活跃度窗口，未设置或为 0 时回退到 60 天
    pub fn activity_window(&self) -> u32 {
        if self.activity_days == 0 {
            60
        } else {
            self.activity_days
        }
    }

    /// 以清单文件名为后缀，计算清单的远程基准地址
    pub fn manifest_base_url<'a>(&self, raw_url: &'a str) -> &'a str {
        raw_url
            .strip_suffix(self.crawled_filename.as_str())
            .unwrap_or(raw_url)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
