//! Fetcher behavior against a mock EUVD service.

use std::net::TcpListener;
use std::time::{Duration, Instant};

use euvd_client::euvd_types::{LatestVulnerability, NonEmptyString};
use euvd_client::{
    FetchErrorKind, Fetcher, FetcherOptions, LatestVulnerabilities, RateLimit, TextSearch,
    VulnerabilityLookup,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{cve_body, fetcher_for, fetcher_with, mount_json, summary_body};

const NOT_FOUND: u16 = 404;

#[tokio::test]
async fn cve_lookup_decodes_typed_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vulnerability"))
        .and(query_param("id", "CVE-2024-0864"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cve_body()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let record = fetcher
        .query(&VulnerabilityLookup(
            NonEmptyString::new("CVE-2024-0864").unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(record.id, "CVE-2024-0864");
    assert!((record.base_score - 9.8).abs() < f64::EPSILON);
    assert_eq!(record.enisa_id, "EUVD-2024-45012");
}

#[tokio::test]
async fn latest_decodes_list() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/lastvulnerabilities",
        json!([summary_body("EUVD-2025-0001", 5.3), summary_body("EUVD-2025-0002", 7.1)]),
    )
    .await;

    let fetcher = fetcher_for(&server);
    let latest: Vec<LatestVulnerability> = fetcher.query(&LatestVulnerabilities).await.unwrap();

    assert_eq!(latest.len(), 2);
    assert_eq!(latest[1].id, "EUVD-2025-0002");
    assert_eq!(latest[0].enisa_id_vendor[0].vendor.name, "Example Corp");
}

#[tokio::test]
async fn non_200_is_status_error_without_decoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vulnerability"))
        .respond_with(ResponseTemplate::new(NOT_FOUND).set_body_json(cve_body()))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .query(&VulnerabilityLookup(NonEmptyString::new("CVE-0000-0000").unwrap()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::Status);
    assert_eq!(err.status().map(|s| s.as_u16()), Some(NOT_FOUND));
    assert!(err.to_string().starts_with("bad response"));
}

#[tokio::test]
async fn invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/criticalvulnerabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch::<Value>("/criticalvulnerabilities")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::Decode);
    assert!(err.to_string().starts_with("json decode error"));
}

#[tokio::test]
async fn wrong_shape_is_decode_error() {
    let server = MockServer::start().await;
    mount_json(&server, "/lastvulnerabilities", json!({"items": []})).await;

    let fetcher = fetcher_for(&server);
    let err = fetcher.query(&LatestVulnerabilities).await.unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::Decode);
}

#[tokio::test]
async fn search_text_is_percent_encoded_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vulnerabilities"))
        .and(query_param("text", "buffer overflow & rce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let found = fetcher
        .query(&TextSearch(
            NonEmptyString::new("buffer overflow & rce").unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(found.total, 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("text=buffer+overflow+%26+rce"));
}

#[tokio::test]
async fn closed_port_is_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let fetcher = fetcher_with(&format!("http://127.0.0.1:{port}"), RateLimit::UNLIMITED);
    let err = fetcher.query(&LatestVulnerabilities).await.unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::Transport);
    assert!(err.to_string().starts_with("http error"));
}

#[tokio::test]
async fn slow_response_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lastvulnerabilities"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(FetcherOptions {
        base_url: server.uri(),
        timeout: Duration::from_millis(500),
        rate_limit: RateLimit::UNLIMITED,
        ..FetcherOptions::default()
    })
    .unwrap();

    let started = Instant::now();
    let err = fetcher.query(&LatestVulnerabilities).await.unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::Transport);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn consecutive_requests_are_paced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lastvulnerabilities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let interval = Duration::from_millis(300);
    let fetcher = fetcher_with(&server.uri(), RateLimit::new(interval, 1));

    let started = Instant::now();
    fetcher.query(&LatestVulnerabilities).await.unwrap();
    fetcher.query(&LatestVulnerabilities).await.unwrap();

    assert!(started.elapsed() >= interval);
}
