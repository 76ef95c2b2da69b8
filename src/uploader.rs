//! Ships the match archive to the collector.
//!
//! The archive is POSTed as the `result` field of a multipart form to
//! `/api/v1/match-result/` under the configured collector URL, with a
//! token-style `Authorization` header. Server-side errors are retried a
//! bounded number of times with a fixed pause; everything else fails the
//! run on the spot.

use std::path::Path;
use std::thread;

use anyhow::{bail, Context};
use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::archive;
use crate::configuration::Configuration;
use crate::match_record::Match;

const UPLOAD_PATH: &str = "/api/v1/match-result/";

/// Archives a finished match and delivers it to the collector.
pub struct ArchiveUploader {
    config: Configuration,
}

/// What the collector's answer means for the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Delivered,
    Retryable,
    Fatal,
}

fn classify(status: StatusCode) -> Outcome {
    if status.is_success() {
        Outcome::Delivered
    } else if status.is_server_error() {
        Outcome::Retryable
    } else {
        Outcome::Fatal
    }
}

fn endpoint(base: &str) -> String {
    format!("{}{UPLOAD_PATH}", base.trim_end_matches('/'))
}

impl ArchiveUploader {
    /// Create an uploader for the given configuration.
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    /// Archive `record` in the working directory, then upload the archive.
    ///
    /// # Errors
    /// Fails when archiving fails or the upload is refused (see [`upload`]).
    ///
    /// [`upload`]: ArchiveUploader::upload
    pub fn finalize_and_upload(&self, record: &Match) -> anyhow::Result<()> {
        let archive = archive::archive_match(&self.config.workdir, record)?;
        self.upload(&archive)
    }

    /// Upload one archive to the collector.
    ///
    /// Every attempt sends the full archive. A 2xx answer is a success; a
    /// 5xx answer is retried after the configured pause until the attempt
    /// budget is spent; any other answer, and any transport failure, aborts
    /// immediately.
    ///
    /// # Errors
    /// Fails when the collector URL or token is not configured, when the
    /// collector cannot be reached, when it answers outside 2xx/5xx, or when
    /// every attempt came back 5xx.
    pub fn upload(&self, archive: &Path) -> anyhow::Result<()> {
        let base = self
            .config
            .collector_url
            .as_deref()
            .context("HALITE_COLLECTOR_URL is not set")?;
        let token = self
            .config
            .collector_token
            .as_deref()
            .context("HALITE_COLLECTOR_TOKEN is not set")?;
        let url = endpoint(base);

        let client = Client::builder()
            .timeout(None)
            .build()
            .context("could not build the HTTP client")?;

        let attempts = self.config.upload_attempts;
        for attempt in 1..=attempts {
            // Multipart forms are single-use, build a fresh one per attempt.
            let form = Form::new()
                .file("result", archive)
                .with_context(|| format!("could not read {}", archive.display()))?;
            let response = client
                .post(&url)
                .header(AUTHORIZATION, format!("Token {token}"))
                .multipart(form)
                .send()
                .context("could not reach the collector")?;

            let status = response.status();
            match classify(status) {
                Outcome::Delivered => {
                    info!(
                        "uploaded {} on attempt {attempt}/{attempts} ({status})",
                        archive.display()
                    );
                    return Ok(());
                }
                Outcome::Fatal => bail!("collector rejected the upload: {status}"),
                Outcome::Retryable => {
                    warn!("collector answered {status}, attempt {attempt}/{attempts}");
                    if attempt < attempts {
                        thread::sleep(self.config.upload_retry_delay);
                    }
                }
            }
        }
        bail!("upload failed after {attempts} attempts")
    }
}
