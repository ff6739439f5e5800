// src/report.rs
// =============================================================================
// This module turns probe results into reports.
//
// - DocumentReport: valid / broken / skipped links for one document
// - RunSummary: totals across every document, plus elapsed time
// - RunReport: renders the whole run as text (Display) or JSON
//
// Probe results arrive in completion order, which changes from run to run.
// Aggregation puts them back in document order first, so the same outcomes
// always produce the same report.
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::checker::{CheckedLink, LinkStatus};

// Anchor text longer than this is shortened in the broken-link listing
const MAX_DISPLAY_TEXT: usize = 60;

/// Details kept for a broken URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub display_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub detail: String,
    /// How many anchors in the document point at this URL
    pub occurrences: usize,
}

/// Results for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub source_path: PathBuf,
    /// Valid URLs, one entry per occurrence, in document order
    pub valid: Vec<String>,
    pub broken: BTreeMap<String, BrokenLink>,
    /// Skipped URLs with their occurrence counts
    pub skipped: BTreeMap<String, usize>,
}

impl DocumentReport {
    /// Partitions a document's probe results into valid, broken and skipped
    ///
    /// A URL that occurs more than once keeps the anchor text of its first
    /// occurrence.
    pub fn aggregate(source_path: impl Into<PathBuf>, mut results: Vec<CheckedLink>) -> Self {
        results.sort_by_key(|checked| checked.position);

        let mut report = Self {
            source_path: source_path.into(),
            ..Self::default()
        };

        for CheckedLink { link, outcome, .. } in results {
            match outcome.status {
                LinkStatus::Valid => report.valid.push(link.target),
                LinkStatus::Broken => {
                    report
                        .broken
                        .entry(link.target)
                        .and_modify(|broken| broken.occurrences += 1)
                        .or_insert(BrokenLink {
                            display_text: link.display_text,
                            status_code: outcome.status_code,
                            detail: outcome.detail,
                            occurrences: 1,
                        });
                }
                LinkStatus::Skipped => *report.skipped.entry(link.target).or_insert(0) += 1,
            }
        }

        report
    }

    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    pub fn broken_count(&self) -> usize {
        self.broken.values().map(|b| b.occurrences).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Number of extracted links this report accounts for
    pub fn link_count(&self) -> usize {
        self.valid_count() + self.broken_count() + self.skipped_count()
    }

    pub fn is_clean(&self) -> bool {
        self.broken.is_empty()
    }
}

/// A document that could not be checked at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Totals across a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_checked: usize,
    /// Valid plus broken; skipped links are never requested
    pub links_checked: usize,
    pub valid: usize,
    pub broken: usize,
    pub skipped: usize,
    pub unreadable: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn from_reports(
        reports: &[DocumentReport],
        failures: &[DocumentFailure],
        elapsed: Duration,
    ) -> Self {
        let valid: usize = reports.iter().map(DocumentReport::valid_count).sum();
        let broken: usize = reports.iter().map(DocumentReport::broken_count).sum();
        let skipped: usize = reports.iter().map(DocumentReport::skipped_count).sum();

        Self {
            files_checked: reports.len(),
            links_checked: valid + broken,
            valid,
            broken,
            skipped,
            unreadable: failures.len(),
            elapsed,
        }
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// A complete run, ready to print
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub summary: &'a RunSummary,
    pub documents: &'a [DocumentReport],
    pub failures: &'a [DocumentFailure],
    /// Include the skipped-link listing in text output
    #[serde(skip)]
    pub verbose: bool,
}

impl RunReport<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        let thin_rule = "-".repeat(80);
        let summary = self.summary;

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "LINK CHECKER REPORT")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total files checked: {}", summary.files_checked)?;
        writeln!(f, "Total links checked: {}", summary.links_checked)?;
        writeln!(f, "Valid links: {}", summary.valid)?;
        writeln!(f, "Broken links: {}", summary.broken)?;
        writeln!(f, "Skipped links: {}", summary.skipped)?;
        if summary.unreadable > 0 {
            writeln!(f, "Unreadable files: {}", summary.unreadable)?;
        }
        writeln!(f, "{rule}")?;

        if summary.broken > 0 {
            writeln!(f)?;
            writeln!(f, "BROKEN LINKS DETAILS:")?;
            writeln!(f, "{thin_rule}")?;

            for document in self.documents.iter().filter(|d| !d.is_clean()) {
                writeln!(f)?;
                writeln!(f, "In file: {}", document.source_path.display())?;
                writeln!(f, "{}", "-".repeat(40))?;

                for (url, broken) in &document.broken {
                    writeln!(f, "✗ {url}")?;
                    writeln!(f, "  Text: {}", truncate_display(&broken.display_text))?;
                    writeln!(f, "  Error: {}", broken.detail)?;
                    if broken.occurrences > 1 {
                        writeln!(f, "  Occurrences: {}", broken.occurrences)?;
                    }
                    writeln!(f)?;
                }
            }
        } else {
            writeln!(f)?;
            writeln!(f, "All links are valid! 🎉")?;
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "UNREADABLE FILES:")?;
            writeln!(f, "{thin_rule}")?;
            for failure in self.failures {
                writeln!(f, "- {}: {}", failure.path.display(), failure.reason)?;
            }
        }

        if self.verbose && summary.skipped > 0 {
            writeln!(f)?;
            writeln!(f, "SKIPPED LINKS:")?;
            writeln!(f, "{thin_rule}")?;
            for document in self.documents.iter().filter(|d| !d.skipped.is_empty()) {
                writeln!(f)?;
                writeln!(f, "In file: {}", document.source_path.display())?;
                for url in document.skipped.keys() {
                    writeln!(f, "- {url}")?;
                }
            }
        }

        writeln!(f)?;
        write!(f, "Execution time: {:.2} seconds", summary.elapsed.as_secs_f64())
    }
}

// Counts chars, not bytes, so multi-byte text is never cut mid-character
fn truncate_display(text: &str) -> String {
    if text.chars().count() > MAX_DISPLAY_TEXT {
        let head: String = text.chars().take(MAX_DISPLAY_TEXT).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
