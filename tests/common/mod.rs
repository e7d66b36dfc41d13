// Shared wiremock plumbing for the integration tests. Not every test file
// uses every helper.
#![allow(dead_code)]

use std::time::Duration;

use siteprospector::probe::ExistenceProbe;
use siteprospector::resolver::SiteResolver;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);
pub const TEST_USER_AGENT: &str = "siteprospector-test";

/// Probe whose https attempts land on `/s/<candidate>` and http attempts on
/// `/i/<candidate>` of the mock server, so one server can play both schemes.
pub fn probe_against(server: &MockServer) -> ExistenceProbe {
    ExistenceProbe::with_scheme_bases(
        &format!("{}/s/", server.uri()),
        &format!("{}/i/", server.uri()),
        TEST_TIMEOUT,
        TEST_USER_AGENT,
    )
    .expect("probe construction should not fail")
}

pub fn resolver_against(server: &MockServer) -> SiteResolver {
    SiteResolver::new(probe_against(server))
}

/// URI of a host:port that refuses connections, for transport-failure
/// tests. Binds an ephemeral port and immediately drops the listener. A
/// dropped `MockServer` cannot play this role: pooled wiremock servers
/// keep listening after drop and answer unmatched requests with 404.
pub fn dead_server_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("binding an ephemeral port should not fail");
    let addr = listener
        .local_addr()
        .expect("a bound listener should report its address");
    drop(listener);
    format!("http://{addr}")
}

/// Mounts a HEAD mock for one scheme-prefixed candidate path, e.g.
/// `/s/boulangerie-dupont.fr`. Candidates without a mock fall through to
/// wiremock's default 404 and count as unreachable.
pub async fn mock_head(server: &MockServer, url_path: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Text-search response with a single hit.
pub fn search_hit(place_id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "results": [{
            "place_id": place_id,
            "name": name,
            "formatted_address": "3 rue des Lilas, 69003 Lyon"
        }]
    })
}

/// Details response carrying the fields the enricher copies onto records.
pub fn details_result(website: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "result": {
            "name": "Boulangerie Dupont",
            "website": website,
            "formatted_phone_number": "04 72 00 00 00",
            "rating": 4.7,
            "user_ratings_total": 132,
            "opening_hours": {
                "weekday_text": ["lundi: 07:00 – 19:30", "mardi: 07:00 – 19:30"]
            },
            "formatted_address": "3 rue des Lilas, 69003 Lyon"
        }
    })
}

pub async fn mock_places_search(server: &MockServer, payload: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(server)
        .await;
}

pub async fn mock_places_details(server: &MockServer, payload: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(server)
        .await;
}
