//! euvd - command-line client for the EU Vulnerability Database.
//!
//! # Modes
//!
//! ```text
//! euvd                      -> interactive menu on stdin (Menu::run)
//! euvd <query> [ARG]        -> one request, pretty JSON on stdout
//! euvd self-test [--report] -> endpoint sweep, report file, exit status
//! ```
//!
//! All requests go through one [`Fetcher`], so the service's pacing holds
//! across the whole process. Ctrl-C abandons a pending rate-limit wait or an
//! in-progress sweep and returns to the menu.

mod menu;
mod request;

use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::{env, future};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use euvd_client::Fetcher;
use euvd_client::euvd_types::{EmptyStringError, NonEmptyString};
use euvd_config::{EuvdConfig, ResolvedConfig};

use crate::menu::Menu;
use crate::request::Request;

/// Redirects logs from stderr to an append-mode file.
const LOG_FILE_ENV: &str = "EUVD_LOG_FILE";

#[derive(Parser)]
#[command(name = "euvd", version)]
#[command(about = "Query the EU Vulnerability Database (EUVD)")]
struct Cli {
    /// API root, e.g. a mirror or local mock
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Latest published vulnerabilities
    Latest,
    /// Latest critical vulnerabilities
    Critical,
    /// Latest exploited vulnerabilities
    Exploited,
    /// Look up a vulnerability by CVE ID
    Cve {
        #[arg(value_parser = non_empty)]
        id: NonEmptyString,
    },
    /// Look up a vulnerability by EUVD ID
    Enisa {
        #[arg(value_parser = non_empty)]
        id: NonEmptyString,
    },
    /// Look up an advisory by ID
    Advisory {
        #[arg(value_parser = non_empty)]
        id: NonEmptyString,
    },
    /// Free-text vulnerability search
    Search {
        #[arg(value_parser = non_empty)]
        text: NonEmptyString,
    },
    /// Call every endpoint once and write the responses to a report
    SelfTest {
        /// Report destination (default: test.txt)
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },
}

fn non_empty(value: &str) -> Result<NonEmptyString, EmptyStringError> {
    NonEmptyString::new(value)
}

impl Cli {
    fn apply(&self, settings: &mut ResolvedConfig) {
        if let Some(base_url) = self.base_url.as_deref().map(str::trim)
            && !base_url.is_empty()
        {
            settings.base_url = base_url.to_string();
        }
        if let Some(secs) = self.timeout_secs.filter(|secs| *secs > 0) {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(Command::SelfTest {
            report: Some(report),
        }) = &self.command
        {
            settings.report_path.clone_from(report);
        }
    }
}

impl Command {
    fn into_request(self) -> Option<Request> {
        Some(match self {
            Self::Latest => Request::Latest,
            Self::Critical => Request::Critical,
            Self::Exploited => Request::Exploited,
            Self::Cve { id } => Request::Cve(id),
            Self::Enisa { id } => Request::Enisa(id),
            Self::Advisory { id } => Request::Advisory(id),
            Self::Search { text } => Request::Search(text),
            Self::SelfTest { .. } => return None,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warning) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::debug!(path = %log_path.display(), "Logging initialized");
        return;
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .with(env_filter)
        .init();

    if let Some(warning) = init_warning {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, File)>, Option<String>) {
    let Some(path) = env::var_os(LOG_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
    else {
        return (None, None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = fs::create_dir_all(parent)
    {
        return (
            None,
            Some(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            )),
        );
    }

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => (Some((path, file)), None),
        Err(e) => (
            None,
            Some(format!("Failed to open log file {}: {e}", path.display())),
        ),
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl-C handler unavailable: {err}");
        future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let config = match EuvdConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %err.path().display(), "Ignoring config: {err}");
            None
        }
    };
    let mut settings = ResolvedConfig::from_config(config.as_ref());
    cli.apply(&mut settings);

    let fetcher =
        Fetcher::new(settings.fetcher_options()).context("failed to build HTTP client")?;
    tracing::debug!(base_url = fetcher.base_url(), "Client ready");

    let Some(command) = cli.command else {
        let stdin = BufReader::new(tokio::io::stdin());
        Menu::new(&fetcher, &settings.report_path, stdin, io::stdout(), ctrl_c)
            .run()
            .await?;
        return Ok(ExitCode::SUCCESS);
    };

    let Some(request) = command.into_request() else {
        let passed = request::self_test(&fetcher, &settings.report_path, ctrl_c())
            .await
            .is_some_and(|summary| summary.passed());
        return Ok(if passed {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    };

    let mut stdout = io::stdout().lock();
    match request.run(&fetcher, &mut stdout, ctrl_c()).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            stdout.flush().ok();
            tracing::error!("Error: {err:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}
