//! Integration tests for `PriceTableFetcher` and the fetch-then-parse path.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made.

use std::time::Duration;

use chrono::Utc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ukfuel_scraper::{FetchError, PriceTableFetcher, PriceTableParser};

const FIXTURE: &str = include_str!("fixtures/gov_uk_prices.html");

fn test_fetcher(server: &MockServer) -> PriceTableFetcher {
    PriceTableFetcher::new(
        &format!("{}/guidance/access-fuel-price-data", server.uri()),
        2,
        "ukfuel-test/0.1",
    )
    .expect("failed to build test PriceTableFetcher")
}

#[tokio::test]
async fn fetch_returns_page_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guidance/access-fuel-price-data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_fetcher(&server).fetch().await.unwrap();
    assert_eq!(body, FIXTURE);
}

#[tokio::test]
async fn fetch_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "ukfuel-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_fetcher(&server).fetch().await;
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
}

#[tokio::test]
async fn fetch_maps_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = test_fetcher(&server).fetch().await;
    assert!(
        matches!(result, Err(FetchError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus(503), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_maps_not_found_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_fetcher(&server).fetch().await;
    assert!(matches!(
        result,
        Err(FetchError::UnexpectedStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn fetch_times_out_on_slow_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(FIXTURE)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let result = test_fetcher(&server).fetch().await;
    let err = result.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got: {err:?}");
}

#[tokio::test]
async fn fetch_makes_one_request_per_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let _ = test_fetcher(&server).fetch().await;
    // `expect(1)` is verified when the server drops.
}

#[tokio::test]
async fn fetched_page_parses_into_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
        .mount(&server)
        .await;

    let html = test_fetcher(&server).fetch().await.unwrap();
    let snapshot = PriceTableParser::default().parse(&html, Utc::now()).unwrap();
    assert_eq!(snapshot.rows.len(), 4);
    assert!(snapshot.retailer("tesco").is_some());
}
