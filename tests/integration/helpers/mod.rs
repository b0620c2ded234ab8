// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod fakes;

use catalog_crawler::application::{CrawlUseCase, CrawlerContext};
use catalog_crawler::config::settings::{HttpSettings, Settings};
use catalog_crawler::domain::models::blacklist::BlacklistSnapshot;
use catalog_crawler::domain::models::hosting_domain::{HostingDomain, ProviderKind};
use catalog_crawler::domain::models::publisher::Publisher;
use catalog_crawler::engines::reqwest_engine::ReqwestEngine;
use catalog_crawler::infrastructure::hosting::DomainRegistry;
use catalog_crawler::infrastructure::metrics::MemoryCounters;
use catalog_crawler::utils::random::FixedRandom;
use catalog_crawler::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fakes::{InMemoryDeadLetters, InMemoryIndex, StaticBlacklist, StubGit};

pub const IPA: &str = "c_h501";

#[allow(dead_code)]
pub struct TestCrawler {
    pub use_case: CrawlUseCase,
    pub context: Arc<CrawlerContext>,
    pub index: Arc<InMemoryIndex>,
    pub dead_letters: Arc<InMemoryDeadLetters>,
    pub counters: Arc<MemoryCounters>,
    pub git: Arc<StubGit>,
}

/// 指向模拟服务器的 GitHub 域
pub fn github_domain(server: &MockServer) -> HostingDomain {
    HostingDomain {
        id: "github.com".to_string(),
        description: "GitHub".to_string(),
        host: "github.com".to_string(),
        provider: ProviderKind::Github,
        api_base_url: Some(server.uri()),
        raw_base_url: Some(server.uri()),
        basic_auth: vec![],
        use_token_for: vec![],
    }
}

pub fn publisher() -> Publisher {
    Publisher {
        codice_ipa: IPA.to_string(),
        name: "Comune di Roma".to_string(),
        organizations: vec!["https://github.com/comune".to_string()],
        ..Default::default()
    }
}

pub fn create_test_crawler(server: &MockServer, blacklist: BlacklistSnapshot) -> TestCrawler {
    create_test_crawler_with_index(server, blacklist, Arc::new(InMemoryIndex::default()))
}

pub fn create_test_crawler_with_index(
    server: &MockServer,
    blacklist: BlacklistSnapshot,
    index: Arc<InMemoryIndex>,
) -> TestCrawler {
    let mut settings = Settings::defaults().expect("default settings");
    settings.crawler.workers = 3;
    settings.crawler.work_queue_capacity = 2;

    let engine = ReqwestEngine::new(&HttpSettings {
        timeout_secs: 5,
        max_retries: 0,
        user_agent: "catalog-crawler-test".to_string(),
    })
    .expect("http client")
    .with_retry_policy(RetryPolicy::none());

    let dead_letters = Arc::new(InMemoryDeadLetters::default());
    let counters = Arc::new(MemoryCounters::new());
    let git = Arc::new(StubGit::default());

    let context = CrawlerContext::builder(settings)
        .registry(DomainRegistry::new(vec![github_domain(server)]).expect("registry"))
        .http(Arc::new(engine))
        .random(Arc::new(FixedRandom(0)))
        .git(git.clone())
        .index(index.clone())
        .blacklist(Arc::new(StaticBlacklist(blacklist)))
        .dead_letters(dead_letters.clone())
        .counters(counters.clone())
        .build()
        .expect("context");
    let context = Arc::new(context);

    TestCrawler {
        use_case: CrawlUseCase::new(context.clone()),
        context,
        index,
        dead_letters,
        counters,
        git,
    }
}

/// GitHub 列表 API 中的一个仓库
pub fn repo_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "full_name": format!("comune/{}", name),
        "clone_url": clone_url(name),
        "default_branch": "main",
        "private": false
    })
}

pub fn clone_url(name: &str) -> String {
    format!("https://github.com/comune/{}.git", name)
}

pub fn manifest(name: &str, ipa: &str) -> String {
    format!(
        "publiccodeYmlVersion: \"0.2\"\nname: {name}\nurl: {url}\nit:\n  riuso:\n    codiceIPA: {ipa}\n",
        name = name,
        url = clone_url(name),
        ipa = ipa
    )
}

/// 登记两页组织列表：第一页 r1、r2，第二页 r3
pub async fn mount_org_pages(server: &MockServer) {
    let next = format!("<{}/orgs/comune/repos?page=2>; rel=\"next\"", server.uri());
    Mock::given(method("GET"))
        .and(path("/orgs/comune/repos"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next.as_str())
                .set_body_json(serde_json::json!([repo_json("r1"), repo_json("r2")])),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/comune/repos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([repo_json("r3")])))
        .expect(1)
        .mount(server)
        .await;
    // No such user: the second seed ends immediately
    Mock::given(method("GET"))
        .and(path("/users/comune/repos"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// 登记某个仓库的清单，`expected` 为期望被获取的次数
pub async fn mount_manifest(server: &MockServer, name: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/comune/{}/main/publiccode.yml", name)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}
