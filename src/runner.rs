// src/runner.rs
// =============================================================================
// This module drives a whole run: every document, one after another.
//
// For each document:
// 1. Read the file (a missing or non-UTF-8 file is recorded and skipped)
// 2. Extract its links
// 3. Probe them through the bounded pool and wait for all of them
// 4. Aggregate the results into a DocumentReport
//
// Documents are processed sequentially, so at most one pool's worth of
// requests is in flight at any time.
// =============================================================================

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{error, info, warn};

use crate::checker::{check_links, extract_html_links, Prober};
use crate::config::Config;
use crate::error::{ConfigError, DocumentError};
use crate::report::{DocumentFailure, DocumentReport, RunReport, RunSummary};

/// Everything a run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub reports: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
    pub summary: RunSummary,
}

impl RunOutcome {
    /// True only when every document was read and none has a broken link
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.reports.iter().all(DocumentReport::is_clean)
    }

    /// 0 = all good, 1 = broken links or unreadable files
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn report(&self, verbose: bool) -> RunReport<'_> {
        RunReport {
            summary: &self.summary,
            documents: &self.reports,
            failures: &self.failures,
            verbose,
        }
    }
}

// Progress output for a human watching the terminal. Disabled for JSON
// output so stdout stays machine-readable.
//
// Progress is cosmetic, so write and flush failures are ignored.
struct Console<W: Write> {
    out: W,
    enabled: bool,
    verbose: bool,
}

impl<W: Write> Console<W> {
    fn line(&mut self, message: impl AsRef<str>) {
        if self.enabled {
            let _ = writeln!(self.out, "{}", message.as_ref());
        }
    }

    fn progress(&mut self, done: usize, total: usize) {
        if !self.enabled {
            return;
        }
        if self.verbose {
            let _ = writeln!(self.out, "Progress: {done}/{total}");
        } else {
            let _ = write!(self.out, "\rChecking links: {done}/{total}");
            let _ = self.out.flush();
        }
    }
}

// Checks every document in order, printing progress to stdout
//
// Only setup problems (the HTTP client can't be built) are returned as
// errors. Everything that goes wrong per document or per link ends up in
// the RunOutcome.
pub async fn run_all(paths: &[PathBuf], config: &Config) -> Result<RunOutcome, ConfigError> {
    run_all_with_output(paths, config, std::io::stdout()).await
}

/// Same as [`run_all`], with progress lines written to `out`
pub async fn run_all_with_output<W: Write>(
    paths: &[PathBuf],
    config: &Config,
    out: W,
) -> Result<RunOutcome, ConfigError> {
    let started = Instant::now();
    let prober = Prober::new(config.timeout)?;
    let mut console = Console {
        out,
        enabled: !config.json,
        verbose: config.verbose,
    };

    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        match read_document(path).await {
            Ok(html) => {
                let report = check_document(&prober, path, &html, config, &mut console).await;
                reports.push(report);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable document");
                console.line(format!("Error: {e}"));
                failures.push(DocumentFailure {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let summary = RunSummary::from_reports(&reports, &failures, started.elapsed());
    info!(
        files = summary.files_checked,
        valid = summary.valid,
        broken = summary.broken,
        skipped = summary.skipped,
        "run finished"
    );

    Ok(RunOutcome {
        reports,
        failures,
        summary,
    })
}

async fn read_document(path: &Path) -> Result<String, DocumentError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DocumentError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DocumentError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    String::from_utf8(bytes).map_err(|source| DocumentError::Encoding {
        path: path.to_path_buf(),
        source,
    })
}

async fn check_document<W: Write>(
    prober: &Prober,
    path: &Path,
    html: &str,
    config: &Config,
    console: &mut Console<W>,
) -> DocumentReport {
    console.line(format!("\nChecking links in {}...", path.display()));

    // A document we can't extract from is treated as having no links
    let links = match extract_html_links(html, config.base_url.as_ref()) {
        Ok(links) => links,
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to extract links");
            console.line(format!("Error parsing HTML: {e}"));
            Vec::new()
        }
    };
    console.line(format!("Found {} links to check", links.len()));

    let outcomes = check_links(prober, links, config.schedule_options(), |done, total| {
        console.progress(done, total);
    })
    .await;

    console.line("\nLink checking completed.");

    let report = DocumentReport::aggregate(path, outcomes);
    info!(
        path = %path.display(),
        links = report.link_count(),
        broken = report.broken_count(),
        "document checked"
    );
    report
}
