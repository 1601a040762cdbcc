//! Plain-text self-test report.
//!
//! Sections are staged in a temp file beside the target and the finished
//! report is renamed over any previous one, so an interrupted run never
//! leaves a half-written report behind.
//!
//! ```text
//! ===== Latest Vulnerabilities =====
//! [
//!   {
//!     "aliases": "CVE-2025-1234",
//!     ...
//!   }
//! ]
//!
//! ===== Critical Vulnerabilities =====
//! ...
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report staging file in {}: {source}", dir.display())]
    Create { dir: PathBuf, source: io::Error },
    #[error("failed to encode section {title:?}: {source}")]
    Encode {
        title: String,
        source: serde_json::Error,
    },
    #[error("failed to write report: {0}")]
    Write(#[from] io::Error),
    #[error("failed to save report to {}: {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },
}

/// Banner line that opens each section.
#[must_use]
pub fn section_banner(title: &str) -> String {
    format!("===== {title} =====")
}

/// Report under construction. Owned by a single self-test run.
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
    staging: NamedTempFile,
    titles: Vec<String>,
}

impl ReportWriter {
    /// Start a fresh report destined for `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let path = path.into();
        let dir = parent_dir(&path).to_path_buf();
        let staging =
            NamedTempFile::new_in(&dir).map_err(|source| ReportError::Create { dir, source })?;

        Ok(Self {
            path,
            staging,
            titles: Vec::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Titles of the sections written so far, in order.
    #[must_use]
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Append a titled section containing `value` as indented JSON.
    ///
    /// The value is encoded before anything is written, so a failed encode
    /// leaves the report untouched.
    pub fn append<T: Serialize + ?Sized>(&mut self, title: &str, value: &T) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| ReportError::Encode {
            title: title.to_string(),
            source,
        })?;

        let mut section = String::with_capacity(json.len() + title.len() + 16);
        if !self.titles.is_empty() {
            section.push('\n');
        }
        section.push_str(&section_banner(title));
        section.push('\n');
        section.push_str(&json);
        section.push('\n');

        self.staging.write_all(section.as_bytes())?;
        self.titles.push(title.to_string());
        Ok(())
    }

    /// Flush and move the report into place, replacing any previous report.
    pub fn finish(mut self) -> Result<PathBuf, ReportError> {
        self.staging.flush()?;
        self.staging.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(self.staging.path(), fs::Permissions::from_mode(0o644))?;
        }

        let path = self.path;
        if let Err(err) = self.staging.persist(&path) {
            // Windows refuses to rename over an existing file.
            if !path.exists() {
                return Err(ReportError::Persist {
                    path,
                    source: err.error,
                });
            }
            if let Err(source) = fs::remove_file(&path) {
                return Err(ReportError::Persist { path, source });
            }
            if let Err(retry) = err.file.persist(&path) {
                return Err(ReportError::Persist {
                    path,
                    source: retry.error,
                });
            }
        }

        tracing::debug!(path = %path.display(), "Self-test report saved");
        Ok(path)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
