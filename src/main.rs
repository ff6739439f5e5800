// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr)
// 3. Validate the configuration before touching the network
// 4. Check every file and print the report
// 5. Exit with proper code (0 = all links valid, 1 = broken links or
//    unreadable files, 2 = configuration or setup error)
// =============================================================================

mod checker; // src/checker/ - extraction, probing, scheduling
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated settings
mod error; // src/error.rs - typed errors
mod report; // src/report.rs - aggregation and rendering
mod runner; // src/runner.rs - drives a whole run

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole error chain on one line
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::try_from(&cli).context("invalid configuration")?;
    let outcome = runner::run_all(&cli.files, &config).await?;

    let report = outcome.report(config.verbose);
    if config.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }

    Ok(outcome.exit_code())
}

// Logs go to stderr so they never mix with the report on stdout.
// RUST_LOG wins when set; otherwise --verbose turns on per-link logging.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "html_linkcheck=info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
