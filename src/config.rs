// src/config.rs
// =============================================================================
// Validated run configuration.
//
// Cli holds whatever the user typed; Config holds values we know are usable.
// The conversion happens once at startup, before any network activity, so a
// bad flag never produces a half-finished report.
// =============================================================================

use std::time::Duration;

use url::Url;

use crate::checker::ScheduleOptions;
use crate::cli::Cli;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub timeout: Duration,
    pub workers: usize,
    pub verbose: bool,
    pub base_url: Option<Url>,
    pub json: bool,
    pub dedupe: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            workers: 10,
            verbose: false,
            base_url: None,
            json: false,
            dedupe: false,
        }
    }
}

impl Config {
    pub fn schedule_options(&self) -> ScheduleOptions {
        ScheduleOptions {
            workers: self.workers,
            memoize: self.dedupe,
        }
    }
}

impl TryFrom<&Cli> for Config {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if cli.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if cli.timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let base_url = cli
            .base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
                    url: raw.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            timeout: Duration::from_secs(cli.timeout),
            workers: cli.workers,
            verbose: cli.verbose,
            base_url,
            json: cli.json,
            dedupe: cli.dedupe,
        })
    }
}
