//! Shared test utilities and fixtures
//!
//! Mock EUVD endpoints and an unpaced fetcher pointed at them.

#![allow(dead_code)]

use std::time::Duration;

use euvd_client::{Fetcher, FetcherOptions, RateLimit};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fetcher against `server` with no pacing and a short timeout.
pub fn fetcher_for(server: &MockServer) -> Fetcher {
    fetcher_with(&server.uri(), RateLimit::UNLIMITED)
}

pub fn fetcher_with(base_url: &str, rate_limit: RateLimit) -> Fetcher {
    Fetcher::new(FetcherOptions {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        rate_limit,
        ..FetcherOptions::default()
    })
    .expect("client builds")
}

pub fn summary_body(id: &str, score: f64) -> Value {
    json!({
        "id": id,
        "description": "Out-of-bounds write in example component",
        "datePublished": "Jan 16, 2024, 3:15:09 PM",
        "dateUpdated": "Jan 17, 2024, 9:02:11 AM",
        "baseScore": score,
        "baseScoreVersion": "3.1",
        "baseScoreVector": "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H",
        "references": "https://example.test/advisory",
        "aliases": "CVE-2024-0864",
        "assigner": "mitre",
        "epss": 0.12,
        "enisaIdProduct": [{
            "id": "p-1",
            "product": { "name": "Example Server" },
            "product_version": "1.0"
        }],
        "enisaIdVendor": [{
            "id": "v-1",
            "vendor": { "name": "Example Corp" }
        }]
    })
}

pub fn cve_body() -> Value {
    json!({
        "id": "CVE-2024-0864",
        "enisa_id": "EUVD-2024-45012",
        "description": "Improper input validation",
        "datePublished": "2024-01-24",
        "dateUpdated": "2024-02-01",
        "baseScore": 9.8,
        "references": "https://example.test/CVE-2024-0864",
        "assigner": "mitre",
        "epss": 0.4,
        "status": "PUBLISHED",
        "vulnerabilityAdvisory": [],
        "vulnerabilityProduct": [],
        "vulnerabilityVendor": []
    })
}

pub fn enisa_body() -> Value {
    json!({
        "id": "EUVD-2024-45012",
        "aliases": "CVE-2024-0864",
        "baseScore": 9.8,
        "enisaIdAdvisory": [],
        "enisaIdProduct": [],
        "enisaIdVendor": [],
        "enisaIdVulnerability": []
    })
}

pub fn advisory_body() -> Value {
    json!({
        "id": "cisco-sa-ata19x-multi-RDTEqRsy",
        "description": "Multiple vulnerabilities in Cisco ATA 190 Series",
        "summary": "Cisco ATA 190 Series firmware",
        "datePublished": "2024-10-16",
        "dateUpdated": "2024-10-16",
        "baseScore": 7.5,
        "references": "https://sec.cloudapps.cisco.com/security/center/content/CiscoSecurityAdvisory/cisco-sa-ata19x-multi-RDTEqRsy",
        "aliases": "",
        "source": { "id": 1, "name": "cisco" },
        "advisoryProduct": [],
        "enisaIdAdvisories": [],
        "vulnerabilityAdvisory": []
    })
}

pub async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount every endpoint the self-test sweep calls, each expected once.
/// Routes listed in `failing` answer with 500 instead.
pub async fn mount_sweep(server: &MockServer, failing: &[&str]) {
    let fixtures: [(&str, Option<(&str, &str)>, Value); 7] = [
        (
            "/lastvulnerabilities",
            None,
            json!([summary_body("EUVD-2025-0001", 5.3)]),
        ),
        (
            "/criticalvulnerabilities",
            None,
            json!([summary_body("EUVD-2025-0002", 9.8)]),
        ),
        (
            "/vulnerabilities",
            Some(("text", "vulnerability")),
            json!({ "items": [summary_body("EUVD-2025-0003", 6.1)], "total": 1 }),
        ),
        (
            "/vulnerability",
            Some(("id", "CVE-2024-0864")),
            cve_body(),
        ),
        ("/enisaid", Some(("id", "EUVD-2024-45012")), enisa_body()),
        (
            "/advisory",
            Some(("id", "cisco-sa-ata19x-multi-RDTEqRsy")),
            advisory_body(),
        ),
        (
            "/exploitedvulnerabilities",
            None,
            json!([summary_body("EUVD-2025-0004", 8.8)]),
        ),
    ];

    for (route, param, body) in fixtures {
        let response = if failing.contains(&route) {
            ResponseTemplate::new(500)
        } else {
            ResponseTemplate::new(200).set_body_json(body)
        };
        let mock = Mock::given(method("GET")).and(path(route));
        let mock = match param {
            Some((name, value)) => mock.and(query_param(name, value)),
            None => mock,
        };
        mock.respond_with(response).expect(1).mount(server).await;
    }
}
