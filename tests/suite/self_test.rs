//! Self-test sweep against a mock EUVD service.

use std::fs;

use euvd_client::{EndpointKind, FetchErrorKind};
use euvd_selftest::{SECTION_TITLES, SelfTest, StepFailure, section_banner};
use wiremock::MockServer;

use crate::common::{fetcher_for, mount_sweep};

fn banners(report: &str) -> Vec<&str> {
    report
        .lines()
        .filter(|line| line.starts_with("===== "))
        .collect()
}

#[tokio::test]
async fn all_endpoints_ok_passes_with_seven_sections_in_order() {
    let server = MockServer::start().await;
    mount_sweep(&server, &[]).await;

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("test.txt");
    let fetcher = fetcher_for(&server);

    let summary = SelfTest::new(&fetcher, &report_path).run().await;

    assert!(summary.passed());
    assert_eq!(summary.failures().count(), 0);
    assert_eq!(summary.steps.len(), 7);

    let report = fs::read_to_string(&report_path).unwrap();
    let expected: Vec<String> = SECTION_TITLES.iter().map(|t| section_banner(t)).collect();
    assert_eq!(banners(&report), expected);
    assert!(report.starts_with("===== Latest Vulnerabilities =====\n[\n  {\n"));
    assert!(report.contains("\n\n===== Critical Vulnerabilities =====\n"));
    assert!(report.contains("\"id\": \"CVE-2024-0864\""));
    assert!(report.ends_with("]\n"));
}

#[tokio::test]
async fn failing_endpoint_is_omitted_and_sweep_continues() {
    let server = MockServer::start().await;
    mount_sweep(&server, &["/criticalvulnerabilities"]).await;

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("test.txt");
    let fetcher = fetcher_for(&server);

    let summary = SelfTest::new(&fetcher, &report_path).run().await;

    assert!(!summary.passed());
    assert_eq!(summary.steps.len(), 7);

    let failures: Vec<_> = summary.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].title, "Critical Vulnerabilities");
    assert_eq!(failures[0].endpoint, EndpointKind::Critical);
    assert!(matches!(
        failures[0].result,
        Err(StepFailure::Fetch {
            kind: FetchErrorKind::Status,
            ..
        })
    ));

    let report = fs::read_to_string(&report_path).unwrap();
    let found = banners(&report);
    assert_eq!(found.len(), 6);
    assert!(!found.contains(&"===== Critical Vulnerabilities ====="));
    assert_eq!(found[1], "===== Sample Query With Filters =====");

    // Every endpoint was still requested exactly once.
    assert_eq!(server.received_requests().await.unwrap().len(), 7);
}

#[tokio::test]
async fn rerun_overwrites_previous_report() {
    let server = MockServer::start().await;
    mount_sweep(&server, &["/lastvulnerabilities"]).await;

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("test.txt");
    fs::write(&report_path, "===== Stale Section =====\n{}\n").unwrap();

    let fetcher = fetcher_for(&server);
    let summary = SelfTest::new(&fetcher, &report_path).run().await;
    assert!(!summary.passed());

    let report = fs::read_to_string(&report_path).unwrap();
    assert!(!report.contains("Stale Section"));
    assert!(report.starts_with("===== Critical Vulnerabilities =====\n"));
}
