//! Self-test sweep over every EUVD endpoint.
//!
//! [`SelfTest::run`] calls each endpoint once, in a fixed order, through the
//! shared [`Fetcher`] (and therefore its rate limiter). Successful responses
//! are written to the report as titled sections; failures are logged and
//! skipped. One failing endpoint never stops the sweep.
//!
//! | # | Section | Request |
//! |---|---------|---------|
//! | 1 | Latest Vulnerabilities | `/lastvulnerabilities` |
//! | 2 | Critical Vulnerabilities | `/criticalvulnerabilities` |
//! | 3 | Sample Query With Filters | `/vulnerabilities?text=vulnerability` |
//! | 4 | Vulnerability By ID | `/vulnerability?id=CVE-2024-0864` |
//! | 5 | ENISA Vulnerability By ID | `/enisaid?id=EUVD-2024-45012` |
//! | 6 | Advisory By ID | `/advisory?id=cisco-sa-ata19x-multi-RDTEqRsy` |
//! | 7 | Exploited Vulnerabilities | `/exploitedvulnerabilities` |

pub mod report;

use std::fmt;
use std::path::{Path, PathBuf};

use euvd_client::{
    AdvisoryLookup, CriticalVulnerabilities, EndpointKind, EnisaLookup, ExploitedVulnerabilities,
    FetchErrorKind, Fetcher, LatestVulnerabilities, Query, TextSearch, VulnerabilityLookup,
};
use euvd_types::NonEmptyStaticStr;

pub use report::{ReportError, ReportWriter, section_banner};

pub const SAMPLE_SEARCH_TEXT: NonEmptyStaticStr = NonEmptyStaticStr::new("vulnerability");
pub const SAMPLE_CVE_ID: NonEmptyStaticStr = NonEmptyStaticStr::new("CVE-2024-0864");
pub const SAMPLE_ENISA_ID: NonEmptyStaticStr = NonEmptyStaticStr::new("EUVD-2024-45012");
pub const SAMPLE_ADVISORY_ID: NonEmptyStaticStr =
    NonEmptyStaticStr::new("cisco-sa-ata19x-multi-RDTEqRsy");

/// Section titles in sweep order.
pub const SECTION_TITLES: [&str; 7] = [
    "Latest Vulnerabilities",
    "Critical Vulnerabilities",
    "Sample Query With Filters",
    "Vulnerability By ID",
    "ENISA Vulnerability By ID",
    "Advisory By ID",
    "Exploited Vulnerabilities",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFailure {
    Fetch { kind: FetchErrorKind, message: String },
    Report(String),
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { message, .. } | Self::Report(message) => f.write_str(message),
        }
    }
}

/// Result of one endpoint in the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub title: &'static str,
    pub endpoint: EndpointKind,
    pub result: Result<(), StepFailure>,
}

impl StepOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct SelfTestSummary {
    pub report_path: PathBuf,
    pub steps: Vec<StepOutcome>,
    /// Set when the report could not be created or saved.
    pub report_error: Option<String>,
}

impl SelfTestSummary {
    /// Overall verdict: every endpoint succeeded and the report was saved.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.report_error.is_none() && self.steps.iter().all(StepOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|step| !step.passed())
    }
}

/// One sweep, writing to `report_path`.
#[derive(Debug)]
pub struct SelfTest<'a> {
    fetcher: &'a Fetcher,
    report_path: PathBuf,
}

impl<'a> SelfTest<'a> {
    #[must_use]
    pub fn new(fetcher: &'a Fetcher, report_path: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            report_path: report_path.into(),
        }
    }

    #[must_use]
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub async fn run(&self) -> SelfTestSummary {
        tracing::info!("Running self-test against all EUVD API endpoints...");

        let mut report = match ReportWriter::create(&self.report_path) {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(path = %self.report_path.display(), "Failed to create report: {err}");
                return SelfTestSummary {
                    report_path: self.report_path.clone(),
                    steps: Vec::new(),
                    report_error: Some(err.to_string()),
                };
            }
        };

        let [latest, critical, search, by_cve, by_enisa, advisory, exploited] = SECTION_TITLES;
        let steps = vec![
            self.step(&mut report, latest, &LatestVulnerabilities).await,
            self.step(&mut report, critical, &CriticalVulnerabilities).await,
            self.step(&mut report, search, &TextSearch(SAMPLE_SEARCH_TEXT.into()))
                .await,
            self.step(&mut report, by_cve, &VulnerabilityLookup(SAMPLE_CVE_ID.into()))
                .await,
            self.step(&mut report, by_enisa, &EnisaLookup(SAMPLE_ENISA_ID.into()))
                .await,
            self.step(&mut report, advisory, &AdvisoryLookup(SAMPLE_ADVISORY_ID.into()))
                .await,
            self.step(&mut report, exploited, &ExploitedVulnerabilities).await,
        ];

        let report_error = match report.finish() {
            Ok(_) => None,
            Err(err) => {
                tracing::error!("Self-test report not saved: {err}");
                Some(err.to_string())
            }
        };

        let summary = SelfTestSummary {
            report_path: self.report_path.clone(),
            steps,
            report_error,
        };

        if summary.passed() {
            tracing::info!(
                path = %summary.report_path.display(),
                "Self-test PASSED: all responses saved"
            );
        } else {
            tracing::warn!(
                failed = summary.failures().count(),
                "Self-test completed with some FAILED requests. See log for details."
            );
        }

        summary
    }

    async fn step<Q: Query>(
        &self,
        report: &mut ReportWriter,
        title: &'static str,
        query: &Q,
    ) -> StepOutcome {
        tracing::info!(section = title, "Self-test fetching");

        let result = match self.fetcher.query(query).await {
            Ok(value) => report
                .append(title, &value)
                .map_err(|err| StepFailure::Report(err.to_string())),
            Err(err) => Err(StepFailure::Fetch {
                kind: err.kind(),
                message: err.to_string(),
            }),
        };

        if let Err(failure) = &result {
            tracing::warn!(section = title, "Self-test FAILED: {failure}");
        }

        StepOutcome {
            title,
            endpoint: Q::KIND,
            result,
        }
    }
}
