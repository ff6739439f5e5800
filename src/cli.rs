// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use clap's "derive" API: the struct below IS the CLI definition, and
// the doc comments on each field become the --help text.
//
// Values are only parsed here, not validated. Range checks (workers >= 1,
// timeout >= 1, base URL is absolute) happen in config.rs so they produce
// our own error messages.
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "html-linkcheck",
    version,
    about = "Check HTML files for broken links",
    long_about = "html-linkcheck extracts every <a href> from the given HTML files and checks \
                  each link with an HTTP request. It exits with code 1 if any link is broken, \
                  which makes it easy to use in CI pipelines."
)]
pub struct Cli {
    /// HTML files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Timeout for each HTTP request, in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,

    /// Maximum number of links checked at the same time
    #[arg(short, long, default_value_t = 10)]
    pub workers: usize,

    /// Print per-link results, progress lines and skipped links
    #[arg(short, long)]
    pub verbose: bool,

    /// Base URL for resolving relative links (e.g. https://example.com/docs/)
    ///
    /// Without it, relative links can't be requested and are reported as
    /// skipped.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Output the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Check each distinct URL only once per file
    #[arg(long)]
    pub dedupe: bool,
}
