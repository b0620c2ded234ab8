// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::settings::Settings;
use crate::domain::repositories::blacklist_repository::BlacklistRepository;
use crate::domain::repositories::dead_letter_repository::DeadLetterRepository;
use crate::domain::repositories::git_repository::GitStore;
use crate::domain::repositories::index_repository::IndexRepository;
use crate::domain::services::index_publisher::IndexPublisher;
use crate::domain::services::manifest_service::{ManifestParser, PubliccodeParser};
use crate::domain::services::pagination_service::PaginationService;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::HttpClient;
use crate::infrastructure::hosting::DomainRegistry;
use crate::infrastructure::metrics::{CounterSink, PrometheusCounters};
use crate::infrastructure::repositories::blacklist_repo_impl::YamlBlacklistRepository;
use crate::infrastructure::repositories::dead_letter_repo_impl::FileDeadLetterRepository;
use crate::infrastructure::repositories::git_repo_impl::GitCliStore;
use crate::infrastructure::search::ElasticIndexRepository;
use crate::queue::producer::RepositoryProducer;
use crate::utils::errors::CrawlError;
use crate::utils::random::{RandomSource, ThreadRandom};

/// 爬虫上下文
///
/// 显式构造并传递给每个组件的协作者集合，不存在全局单例
pub struct CrawlerContext {
    pub settings: Settings,
    pub registry: Arc<DomainRegistry>,
    pub http: Arc<dyn HttpClient>,
    pub random: Arc<dyn RandomSource>,
    pub parser: Arc<dyn ManifestParser>,
    pub git: Arc<dyn GitStore>,
    pub publisher: Arc<IndexPublisher>,
    pub blacklist: Arc<dyn BlacklistRepository>,
    pub dead_letters: Arc<dyn DeadLetterRepository>,
    pub counters: Arc<dyn CounterSink>,
    pub pagination: Arc<PaginationService>,
}

/// 上下文构建器
///
/// 未显式提供的协作者在 `build` 时使用生产实现
pub struct CrawlerContextBuilder {
    settings: Settings,
    registry: Option<DomainRegistry>,
    http: Option<Arc<dyn HttpClient>>,
    random: Option<Arc<dyn RandomSource>>,
    parser: Option<Arc<dyn ManifestParser>>,
    git: Option<Arc<dyn GitStore>>,
    index: Option<Arc<dyn IndexRepository>>,
    blacklist: Option<Arc<dyn BlacklistRepository>>,
    dead_letters: Option<Arc<dyn DeadLetterRepository>>,
    counters: Option<Arc<dyn CounterSink>>,
}

impl CrawlerContextBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            registry: None,
            http: None,
            random: None,
            parser: None,
            git: None,
            index: None,
            blacklist: None,
            dead_letters: None,
            counters: None,
        }
    }

    pub fn registry(mut self, registry: DomainRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn http(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn parser(mut self, parser: Arc<dyn ManifestParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn git(mut self, git: Arc<dyn GitStore>) -> Self {
        self.git = Some(git);
        self
    }

    pub fn index(mut self, index: Arc<dyn IndexRepository>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn blacklist(mut self, blacklist: Arc<dyn BlacklistRepository>) -> Self {
        self.blacklist = Some(blacklist);
        self
    }

    pub fn dead_letters(mut self, dead_letters: Arc<dyn DeadLetterRepository>) -> Self {
        self.dead_letters = Some(dead_letters);
        self
    }

    pub fn counters(mut self, counters: Arc<dyn CounterSink>) -> Self {
        self.counters = Some(counters);
        self
    }

    /// 组装上下文
    pub fn build(self) -> Result<CrawlerContext, CrawlError> {
        let settings = self.settings;
        let crawler = &settings.crawler;

        let registry = match self.registry {
            Some(registry) => registry,
            None => DomainRegistry::load(&crawler.domains_file)?,
        };
        let http: Arc<dyn HttpClient> = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestEngine::new(&settings.http)?),
        };
        let random = self.random.unwrap_or_else(|| Arc::new(ThreadRandom));
        let parser = self.parser.unwrap_or_else(|| {
            Arc::new(PubliccodeParser::new(
                http.clone(),
                random.clone(),
                crawler.verify_references,
            ))
        });
        let git = self
            .git
            .unwrap_or_else(|| Arc::new(GitCliStore::new(crawler.repos_root())));
        let index: Arc<dyn IndexRepository> = match self.index {
            Some(index) => index,
            None => Arc::new(ElasticIndexRepository::new(&settings.elastic, &settings.http)?),
        };
        let blacklist = self
            .blacklist
            .unwrap_or_else(|| Arc::new(YamlBlacklistRepository::new(&crawler.blacklist_dir)));
        let dead_letters = self
            .dead_letters
            .unwrap_or_else(|| Arc::new(FileDeadLetterRepository::new(crawler.dead_letter_path())));
        let counters = self.counters.unwrap_or_else(|| {
            Arc::new(PrometheusCounters::new(settings.elastic.publiccode_index.clone()))
        });

        let pagination = Arc::new(PaginationService::new(
            http.clone(),
            random.clone(),
            crawler.crawled_filename.clone(),
        ));
        let publisher = Arc::new(IndexPublisher::new(index, counters.clone(), &settings.elastic));
        debug!("{} hosting domains configured", registry.len());

        Ok(CrawlerContext {
            registry: Arc::new(registry),
            http,
            random,
            parser,
            git,
            publisher,
            blacklist,
            dead_letters,
            counters,
            pagination,
            settings,
        })
    }
}

impl CrawlerContext {
    pub fn builder(settings: Settings) -> CrawlerContextBuilder {
        CrawlerContextBuilder::new(settings)
    }

    /// 用生产实现构建上下文并确保索引存在
    ///
    /// 数据目录不存在、托管域无法加载或索引不可达都是致命错误
    pub async fn connect(settings: Settings) -> Result<Self, CrawlError> {
        settings.crawler.ensure_data_dir()?;
        let context = Self::builder(settings).build()?;

        debug!("Connecting to the index store...");
        context.publisher.ensure_indexes().await?;
        info!("Index store ready at {}", context.settings.elastic.url);
        Ok(context)
    }

    pub fn producer(&self) -> RepositoryProducer {
        RepositoryProducer::new(self.registry.clone(), self.pagination.clone())
    }
}
