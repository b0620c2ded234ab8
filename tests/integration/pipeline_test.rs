// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    clone_url, create_test_crawler, manifest, mount_manifest, mount_org_pages, publisher,
    repo_json, IPA,
};
use catalog_crawler::domain::models::blacklist::BlacklistSnapshot;
use catalog_crawler::domain::models::index_document::document_key;
use catalog_crawler::infrastructure::metrics::{
    REPOSITORY_BLACKLISTED, REPOSITORY_PROCESSED, REPOSITORY_SKIPPED,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_every_candidate_across_pages_is_processed_once() {
    let server = MockServer::start().await;
    mount_org_pages(&server).await;
    for name in ["r1", "r2", "r3"] {
        mount_manifest(&server, name, manifest(name, IPA), 1).await;
    }
    let crawler = create_test_crawler(&server, BlacklistSnapshot::new());

    let summary = crawler
        .use_case
        .crawl_publishers(vec![publisher()])
        .await
        .unwrap();

    assert_eq!(summary.report.published, 3);
    assert_eq!(summary.report.total(), 3);
    assert!(summary.blacklisted.is_empty());
    assert_eq!(crawler.counters.get(REPOSITORY_PROCESSED), 3);

    let mut expected: Vec<String> = ["r1", "r2", "r3"]
        .iter()
        .map(|name| document_key(&clone_url(name)))
        .collect();
    expected.sort();
    assert_eq!(crawler.index.keys("publiccode"), expected);
    assert_eq!(crawler.index.keys("publishers"), vec![IPA.to_string()]);

    // Aliases move only after both indexes are flushed
    assert_eq!(
        *crawler.index.aliases.lock(),
        vec![
            ("catalog".to_string(), "publishers".to_string()),
            ("catalog".to_string(), "publiccode".to_string()),
        ]
    );
    server.verify().await;
}

#[tokio::test]
async fn test_repositories_listed_by_both_seeds_are_processed_once() {
    let server = MockServer::start().await;
    // Mounted first so it wins over the 404 users mock below
    Mock::given(method("GET"))
        .and(path("/users/comune/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            repo_json("r1"),
            repo_json("r2"),
            repo_json("r3")
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_org_pages(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/comune/r2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("r2")))
        .expect(1)
        .mount(&server)
        .await;
    for name in ["r1", "r2", "r3"] {
        mount_manifest(&server, name, manifest(name, IPA), 1).await;
    }
    let crawler = create_test_crawler(&server, BlacklistSnapshot::new());
    let mut publisher = publisher();
    publisher.repositories = vec!["https://github.com/comune/r2".to_string()];

    let summary = crawler
        .use_case
        .crawl_publishers(vec![publisher])
        .await
        .unwrap();

    assert_eq!(summary.report.total(), 3);
    assert_eq!(summary.report.published, 3);
    assert_eq!(crawler.counters.get(REPOSITORY_PROCESSED), 3);
    let mut cloned = crawler.git.cloned.lock().clone();
    cloned.sort();
    assert_eq!(cloned, vec![clone_url("r1"), clone_url("r2"), clone_url("r3")]);
    server.verify().await;
}

#[tokio::test]
async fn test_blacklisted_candidate_never_reaches_the_pool() {
    let server = MockServer::start().await;
    mount_org_pages(&server).await;
    mount_manifest(&server, "r1", manifest("r1", IPA), 0).await;
    mount_manifest(&server, "r2", manifest("r2", IPA), 1).await;
    mount_manifest(&server, "r3", manifest("r3", IPA), 1).await;

    let blacklist = BlacklistSnapshot::from([(clone_url("r1"), "doc-42".to_string())]);
    let crawler = create_test_crawler(&server, blacklist);

    let summary = crawler
        .use_case
        .crawl_publishers(vec![publisher()])
        .await
        .unwrap();

    assert_eq!(summary.blacklisted, vec!["doc-42".to_string()]);
    assert_eq!(summary.report.total(), 2);
    assert_eq!(crawler.counters.get(REPOSITORY_BLACKLISTED), 1);
    assert!(!crawler
        .git
        .cloned
        .lock()
        .contains(&clone_url("r1")));
    assert!(crawler
        .index
        .document("publiccode", &document_key(&clone_url("r1")))
        .is_none());

    let removed = crawler.context.publisher.remove(&summary.blacklisted).await;
    assert_eq!(removed, 1);
    assert_eq!(
        *crawler.index.deleted.lock(),
        vec![("publiccode".to_string(), "doc-42".to_string())]
    );
    server.verify().await;
}

#[tokio::test]
async fn test_missing_manifest_is_neither_published_nor_dead_lettered() {
    let server = MockServer::start().await;
    mount_org_pages(&server).await;
    mount_manifest(&server, "r1", manifest("r1", IPA), 1).await;
    Mock::given(method("GET"))
        .and(path("/comune/r2/main/publiccode.yml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_manifest(&server, "r3", manifest("r3", IPA), 1).await;
    let crawler = create_test_crawler(&server, BlacklistSnapshot::new());

    let summary = crawler
        .use_case
        .crawl_publishers(vec![publisher()])
        .await
        .unwrap();

    assert_eq!(summary.report.published, 2);
    assert_eq!(summary.report.skipped, 1);
    assert_eq!(crawler.counters.get(REPOSITORY_SKIPPED), 1);
    assert!(crawler.dead_letters.entries.lock().is_empty());
    assert!(crawler
        .index
        .document("publiccode", &document_key(&clone_url("r2")))
        .is_none());
    server.verify().await;
}

#[tokio::test]
async fn test_ipa_mismatch_is_rejected_and_dead_lettered() {
    let server = MockServer::start().await;
    mount_org_pages(&server).await;
    mount_manifest(&server, "r1", manifest("r1", "XYZ999"), 1).await;
    mount_manifest(&server, "r2", manifest("r2", " C_H501 "), 1).await;
    mount_manifest(&server, "r3", manifest("r3", IPA), 1).await;
    let crawler = create_test_crawler(&server, BlacklistSnapshot::new());

    let summary = crawler
        .use_case
        .crawl_publishers(vec![publisher()])
        .await
        .unwrap();

    assert_eq!(summary.report.rejected, 1);
    assert_eq!(summary.report.published, 2);
    let entries = crawler.dead_letters.entries.lock();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].0.ends_with("/comune/r1/main/publiccode.yml"));
    assert!(entries[0].1.contains("XYZ999"));
}

#[tokio::test]
async fn test_unknown_ipa_publisher_accepts_any_manifest() {
    let server = MockServer::start().await;
    mount_org_pages(&server).await;
    for name in ["r1", "r2", "r3"] {
        mount_manifest(&server, name, manifest(name, "XYZ999"), 1).await;
    }
    let crawler = create_test_crawler(&server, BlacklistSnapshot::new());
    let mut publisher = publisher();
    publisher.unknown_ipa = true;

    let summary = crawler
        .use_case
        .crawl_publishers(vec![publisher])
        .await
        .unwrap();

    assert_eq!(summary.report.published, 3);
    assert!(crawler.dead_letters.entries.lock().is_empty());
}

#[tokio::test]
async fn test_failing_organization_does_not_stop_other_publishers() {
    let server = MockServer::start().await;
    mount_org_pages(&server).await;
    for name in ["r1", "r2", "r3"] {
        mount_manifest(&server, name, manifest(name, IPA), 1).await;
    }
    let crawler = create_test_crawler(&server, BlacklistSnapshot::new());
    let mut broken = publisher();
    broken.codice_ipa = "c_a000".to_string();
    broken.organizations = vec!["https://unknown.example.org/nobody".to_string()];

    let summary = crawler
        .use_case
        .crawl_publishers(vec![broken, publisher()])
        .await
        .unwrap();

    assert_eq!(summary.report.published, 3);
}
