// src/error.rs
// =============================================================================
// Typed errors for the parts of a run that can fail before or around the
// network probes.
//
// Per-link failures are NOT errors here: a timeout or a 404 becomes a Broken
// ProbeOutcome. These types cover:
// - ConfigError: bad flags or HTTP client setup (stops the run, exit code 2)
// - DocumentError: a file that can't be read (reported, run continues)
// - ExtractError: link extraction failure (document treated as zero links)
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced at startup, before any network activity
#[derive(Debug, Error)]
pub enum ConfigError {
    /// --workers 0 would never run a probe
    #[error("--workers must be at least 1")]
    ZeroWorkers,

    /// --timeout 0 would fail every probe
    #[error("--timeout must be at least 1 second")]
    ZeroTimeout,

    /// --base-url could not be parsed as an absolute URL
    #[error("invalid --base-url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be built (e.g. TLS backend init failed)
    #[error("failed to create HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors loading a single document from disk
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("File '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("Could not read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not valid UTF-8", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Errors extracting links from a parsed document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid link selector: {0}")]
    Selector(String),
}
