//! Operator requests shared by the menu and one-shot subcommands.

use std::future::Future;
use std::io::Write;
use std::path::Path;

use anyhow::{Result, bail};
use serde::Serialize;

use euvd_client::euvd_types::NonEmptyString;
use euvd_client::{
    AdvisoryLookup, CriticalVulnerabilities, EnisaLookup, ExploitedVulnerabilities, Fetcher,
    LatestVulnerabilities, Query, TextSearch, VulnerabilityLookup,
};
use euvd_selftest::{SelfTest, SelfTestSummary};

/// One endpoint call chosen by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Latest,
    Exploited,
    Critical,
    Cve(NonEmptyString),
    Enisa(NonEmptyString),
    Advisory(NonEmptyString),
    Search(NonEmptyString),
}

impl Request {
    /// Fetch and print the response as indented JSON.
    ///
    /// `cancelled` abandons the request at any point: while waiting for a
    /// permit or while the response is in flight.
    pub async fn run<W, F>(&self, fetcher: &Fetcher, out: &mut W, cancelled: F) -> Result<()>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        match self {
            Self::Latest => print_query(fetcher, &LatestVulnerabilities, out, cancelled).await,
            Self::Exploited => {
                print_query(fetcher, &ExploitedVulnerabilities, out, cancelled).await
            }
            Self::Critical => print_query(fetcher, &CriticalVulnerabilities, out, cancelled).await,
            Self::Cve(id) => {
                print_query(fetcher, &VulnerabilityLookup(id.clone()), out, cancelled).await
            }
            Self::Enisa(id) => print_query(fetcher, &EnisaLookup(id.clone()), out, cancelled).await,
            Self::Advisory(id) => {
                print_query(fetcher, &AdvisoryLookup(id.clone()), out, cancelled).await
            }
            Self::Search(text) => {
                print_query(fetcher, &TextSearch(text.clone()), out, cancelled).await
            }
        }
    }
}

async fn print_query<Q, W, F>(fetcher: &Fetcher, query: &Q, out: &mut W, cancelled: F) -> Result<()>
where
    Q: Query,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(cancelled);
    let response = tokio::select! {
        biased;
        () = &mut cancelled => bail!("request cancelled"),
        response = fetcher.query(query) => response?,
    };
    write_json(out, &response)?;
    Ok(())
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Run the sweep unless `interrupted` fires first.
///
/// An interrupted sweep is abandoned without touching the previous report.
pub async fn self_test<F>(
    fetcher: &Fetcher,
    report_path: &Path,
    interrupted: F,
) -> Option<SelfTestSummary>
where
    F: Future<Output = ()>,
{
    let sweep = SelfTest::new(fetcher, report_path);
    tokio::select! {
        summary = sweep.run() => Some(summary),
        () = interrupted => {
            tracing::warn!("Self-test interrupted; report not written");
            None
        }
    }
}
