mod common;

use std::time::Duration;

use common::{details_result, mock_head, search_hit};
use siteprospector::batch;
use siteprospector::enrich::Enricher;
use siteprospector::places::PlacesClient;
use siteprospector::record::{BusinessRecord, SourceMethod};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_site_check_batch_sorts_prospects_first() {
    let server = MockServer::start().await;
    mock_head(&server, "/s/optique-morel.fr", 200).await;

    let records = vec![
        BusinessRecord::named("Tabac Ruiz"),
        BusinessRecord::named("Optique Morel"),
        BusinessRecord::named("Cave Bernard"),
    ];

    let resolver = common::resolver_against(&server);
    let report = batch::run_site_checks(&resolver, records, batch::DEFAULT_WORKERS).await;

    let names: Vec<&str> = report
        .records
        .iter()
        .map(|r| r.business.name.as_str())
        .collect();
    assert_eq!(
        names,
        ["Cave Bernard", "Tabac Ruiz", "Optique Morel"],
        "prospects without a site come first, alphabetically"
    );

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.with_site, 1);
    assert_eq!(report.summary.without_site, 2);
    assert_eq!(report.summary.via_fallback, 3, "check-only runs are all fallback");
    assert_eq!(report.summary.via_places, 0);
    assert_eq!(report.summary.errors, 0);
    assert!(report.summary.duration_secs >= 0.0);

    for record in &report.records {
        assert_eq!(record.has_website, record.website_url.is_some());
    }
}

#[tokio::test]
async fn test_enrichment_batch_counts_sources() {
    let server = MockServer::start().await;

    // Specific mock first: one business gets a places hit with a website.
    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .and(query_param("query", "Optique Morel"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_hit("p-morel", "Optique Morel")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(details_result(Some("https://www.optique-morel.fr"))),
        )
        .mount(&server)
        .await;
    // Everyone else comes up empty and falls back to guessing.
    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let places = PlacesClient::with_base_url(
        "test-key",
        Duration::from_secs(2),
        common::TEST_USER_AGENT,
        &server.uri(),
    )
    .expect("client construction should not fail");
    let enricher = Enricher::new(common::resolver_against(&server), Some(places));

    let records = vec![
        BusinessRecord::named("Optique Morel"),
        BusinessRecord::named("Tabac Ruiz"),
    ];
    let report = batch::run_enrichment(&enricher, records, batch::DEFAULT_WORKERS).await;

    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.via_places, 1);
    assert_eq!(report.summary.via_fallback, 1);
    assert_eq!(report.summary.with_site, 1);
    assert_eq!(report.summary.errors, 0);

    // Tabac Ruiz has no site, so it leads the output.
    assert_eq!(report.records[0].business.name, "Tabac Ruiz");
    assert_eq!(report.records[0].source_method, SourceMethod::Fallback);
    assert_eq!(report.records[1].business.name, "Optique Morel");
    assert_eq!(report.records[1].source_method, SourceMethod::Places);
    assert_eq!(
        report.records[1].website_url.as_deref(),
        Some("https://www.optique-morel.fr")
    );
}

#[tokio::test]
async fn test_batch_tolerates_more_workers_than_records() {
    let server = MockServer::start().await;
    mock_head(&server, "/s/cave-bernard.fr", 200).await;

    let resolver = common::resolver_against(&server);
    let report =
        batch::run_site_checks(&resolver, vec![BusinessRecord::named("Cave Bernard")], 50).await;

    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.with_site, 1);
}

#[tokio::test]
async fn test_empty_batch_produces_empty_report() {
    let server = MockServer::start().await;
    let resolver = common::resolver_against(&server);

    let report = batch::run_site_checks(&resolver, Vec::new(), batch::DEFAULT_WORKERS).await;

    assert!(report.records.is_empty());
    assert_eq!(report.summary.total, 0);
    assert_eq!(report.summary.with_site, 0);
    assert_eq!(report.summary.without_site, 0);
}
