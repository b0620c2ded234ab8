// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::fakes::InMemoryIndex;
use super::helpers::{
    clone_url, create_test_crawler, create_test_crawler_with_index, manifest, mount_manifest,
    publisher, repo_json, IPA,
};
use catalog_crawler::domain::models::blacklist::BlacklistSnapshot;
use catalog_crawler::domain::models::index_document::document_key;
use catalog_crawler::domain::models::publisher::Publisher;
use catalog_crawler::utils::errors::CrawlError;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_repository(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/comune/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(name)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrent_runs_publish_under_the_same_key() {
    let server = MockServer::start().await;
    mount_repository(&server, "r1").await;
    mount_manifest(&server, "r1", manifest("r1", IPA), 2).await;

    let index = Arc::new(InMemoryIndex::default());
    let first = create_test_crawler_with_index(&server, BlacklistSnapshot::new(), index.clone());
    let second = create_test_crawler_with_index(&server, BlacklistSnapshot::new(), index.clone());

    let url = "https://github.com/comune/r1";
    let (a, b) = tokio::join!(
        first.use_case.crawl_single_repository(url, publisher()),
        second.use_case.crawl_single_repository(url, publisher()),
    );
    assert_eq!(a.unwrap().report.published, 1);
    assert_eq!(b.unwrap().report.published, 1);

    let key = document_key(&clone_url("r1"));
    let publiccode_calls: Vec<String> = index
        .stage_calls
        .lock()
        .iter()
        .filter(|(i, _)| i == "publiccode")
        .map(|(_, k)| k.clone())
        .collect();
    assert_eq!(publiccode_calls, vec![key.clone(), key.clone()]);
    assert_eq!(index.keys("publiccode"), vec![key]);
    server.verify().await;
}

#[tokio::test]
async fn test_single_repository_ignores_the_blacklist() {
    let server = MockServer::start().await;
    mount_repository(&server, "r1").await;
    mount_manifest(&server, "r1", manifest("r1", IPA), 1).await;
    let blacklist = BlacklistSnapshot::from([(clone_url("r1"), "doc-42".to_string())]);
    let crawler = create_test_crawler(&server, blacklist);

    let summary = crawler
        .use_case
        .crawl_single_repository("https://github.com/comune/r1", publisher())
        .await
        .unwrap();

    assert_eq!(summary.report.published, 1);
    assert!(summary.blacklisted.is_empty());
    let document = crawler
        .index
        .document("publiccode", &document_key(&clone_url("r1")))
        .unwrap();
    assert_eq!(document["manifest"]["name"], "r1");
    assert_eq!(document["metadata"]["full_name"], "comune/r1");
}

#[tokio::test]
async fn test_unclaimed_repository_uses_unknown_publisher() {
    let server = MockServer::start().await;
    mount_repository(&server, "r1").await;
    mount_manifest(&server, "r1", manifest("r1", "XYZ999"), 1).await;
    let crawler = create_test_crawler(&server, BlacklistSnapshot::new());

    let summary = crawler
        .use_case
        .crawl_single_repository(
            "https://github.com/comune/r1",
            Publisher::unknown("https://github.com/comune/r1"),
        )
        .await
        .unwrap();

    assert_eq!(summary.report.published, 1);
    assert!(crawler.dead_letters.entries.lock().is_empty());
    assert!(crawler.index.keys("publishers").is_empty());
}

#[tokio::test]
async fn test_unknown_host_is_an_error() {
    let server = MockServer::start().await;
    let crawler = create_test_crawler(&server, BlacklistSnapshot::new());

    let result = crawler
        .use_case
        .crawl_single_repository("https://git.example.org/comune/r1", publisher())
        .await;

    assert!(matches!(result, Err(CrawlError::Hosting(_))));
    assert!(crawler.index.aliases.lock().is_empty());
}
