//! Config for the match harness.
//!
//! This module provides configuration options for the simulator invocation
//! and the result upload.
//!
//! Configuration can be created programmatically using [`Configuration::new()`]
//! or by reading environment variables using [`Configuration::from_env()`].
//! Container-level knobs live in [`SandboxPolicy`](crate::sandbox::SandboxPolicy).
//!
//! # Environment Variables
//!
//! The following environment variables override configuration values. All are
//! optional.
//!
//! - `HALITE_COLLECTOR_URL` — Base URL of the collector service, e.g. `https://halite.example.org` (default: unset, uploads are refused)
//! - `HALITE_COLLECTOR_TOKEN` — API token expected by the collector (default: unset, uploads are refused)
//! - `HALITE_RUN_ID` — Numeric identifier of the surrounding tournament run, attached to every result (default: unset)
//! - `HALITE_SIMULATOR` — Simulator binary to invoke (default: `halite`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

const DEFAULT_SIMULATOR: &str = "halite";
const DEFAULT_UPLOAD_ATTEMPTS: u32 = 5;
const DEFAULT_UPLOAD_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Configuration for running and reporting one match.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) collector_url: Option<String>,
    pub(crate) collector_token: Option<String>,
    pub(crate) run_id: Option<u64>,
    pub(crate) simulator: PathBuf,
    pub(crate) workdir: PathBuf,
    pub(crate) upload_attempts: u32,
    pub(crate) upload_retry_delay: Duration,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - No collector URL or token is set; uploading fails until both are provided.
    /// - No run identifier is attached to results.
    /// - The simulator binary is looked up as `halite` on `PATH`.
    /// - The match runs in the current directory.
    /// - Uploads are attempted 5 times, 10 seconds apart.
    pub fn new() -> Self {
        Self {
            collector_url: None,
            collector_token: None,
            run_id: None,
            simulator: PathBuf::from(DEFAULT_SIMULATOR),
            workdir: PathBuf::from("."),
            upload_attempts: DEFAULT_UPLOAD_ATTEMPTS,
            upload_retry_delay: DEFAULT_UPLOAD_RETRY_DELAY,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// The following environment variables are recognized:
    /// - `HALITE_COLLECTOR_URL`: base URL of the collector service (default: unset)
    /// - `HALITE_COLLECTOR_TOKEN`: API token for the collector (default: unset)
    /// - `HALITE_RUN_ID`: numeric run identifier (default: unset)
    /// - `HALITE_SIMULATOR`: simulator binary to invoke (default: `halite`)
    ///
    /// Unset variables fall back to the defaults of [`Configuration::new()`].
    ///
    /// # Errors
    /// Fails when `HALITE_RUN_ID` is set but does not parse as an integer.
    pub fn from_env() -> anyhow::Result<Self> {
        fn get_env(var: &str) -> Option<String> {
            std::env::var(var).ok()
        }

        let run_id = match get_env("HALITE_RUN_ID") {
            Some(raw) => Some(
                raw.parse()
                    .with_context(|| format!("HALITE_RUN_ID is not a number: {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Self {
            collector_url: get_env("HALITE_COLLECTOR_URL"),
            collector_token: get_env("HALITE_COLLECTOR_TOKEN"),
            run_id,
            simulator: get_env("HALITE_SIMULATOR")
                .map_or_else(|| PathBuf::from(DEFAULT_SIMULATOR), PathBuf::from),
            workdir: PathBuf::from("."),
            upload_attempts: DEFAULT_UPLOAD_ATTEMPTS,
            upload_retry_delay: DEFAULT_UPLOAD_RETRY_DELAY,
        })
    }

    /// Set the base URL of the collector service.
    pub fn with_collector_url(mut self, url: &str) -> Self {
        self.collector_url = Some(url.to_string());
        self
    }

    /// Set the API token sent with every upload.
    pub fn with_collector_token(mut self, token: &str) -> Self {
        self.collector_token = Some(token.to_string());
        self
    }

    /// Attach a tournament run identifier to the match record.
    pub fn with_run_id(mut self, run_id: u64) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Set the simulator binary to invoke.
    pub fn with_simulator(mut self, simulator: &Path) -> Self {
        self.simulator = simulator.to_path_buf();
        self
    }

    /// Set the directory the simulator runs in and writes its files to.
    pub fn with_workdir(mut self, workdir: &Path) -> Self {
        self.workdir = workdir.to_path_buf();
        self
    }

    /// Set how many times an upload is attempted before giving up.
    pub fn with_upload_attempts(mut self, attempts: u32) -> Self {
        self.upload_attempts = attempts;
        self
    }

    /// Set the pause between two upload attempts.
    pub fn with_upload_retry_delay(mut self, delay: Duration) -> Self {
        self.upload_retry_delay = delay;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
