//! Sandbox policy for bot containers.
//!
//! Every bot runs inside its own Docker container; the simulator only ever
//! sees the single `docker run ...` command token it should spawn for each
//! player. This module renders that token from structured parts and validates
//! the image reference first, so an odd image string cannot smuggle extra
//! shell tokens into the simulator invocation.
//!
//! # Environment Variables
//!
//! The following environment variables override the policy. All are optional.
//!
//! - `HALITE_CPU_SHARES` — relative CPU weight per container (default: `1024`)
//! - `HALITE_MEMORY_LIMIT_MB` — hard memory cap per container, in megabytes (default: none)
//! - `HALITE_NETWORK` — Docker network mode, e.g. `none` to cut bots off (default: Docker's)

use std::process::Command;

use anyhow::bail;
use tracing::{info, warn};

use crate::bot::BotSpec;

const DOCKER_BIN: &str = "docker";

/// How bot containers are started.
///
/// Defaults reproduce the long-standing deployment policy: ephemeral
/// interactive containers (`--rm -i`) with a relative CPU weight of 1024, no
/// memory cap, default network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPolicy {
    cpu_shares: Option<u32>,
    memory_limit_mb: Option<u64>,
    network: Option<String>,
}

impl SandboxPolicy {
    /// Create a policy with the default container flags.
    pub fn new() -> Self {
        Self {
            cpu_shares: Some(1024),
            memory_limit_mb: None,
            network: None,
        }
    }

    /// Create a policy from environment variables (see module docs).
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        fn parse_var<T: std::str::FromStr>(var: &str) -> Option<T> {
            std::env::var(var).ok()?.parse().ok()
        }

        Self {
            cpu_shares: parse_var("HALITE_CPU_SHARES").or(Some(1024)),
            memory_limit_mb: parse_var("HALITE_MEMORY_LIMIT_MB"),
            network: std::env::var("HALITE_NETWORK").ok(),
        }
    }

    /// Set the relative CPU weight (`-c`) given to each container.
    #[must_use]
    pub fn with_cpu_shares(mut self, shares: u32) -> Self {
        self.cpu_shares = Some(shares);
        self
    }

    /// Cap each container's memory (`-m`), in megabytes.
    #[must_use]
    pub fn with_memory_limit_mb(mut self, megabytes: u64) -> Self {
        self.memory_limit_mb = Some(megabytes);
        self
    }

    /// Set the Docker network mode (`--network`), e.g. `"none"`.
    #[must_use]
    pub fn with_network(mut self, mode: &str) -> Self {
        self.network = Some(mode.to_string());
        self
    }

    /// Render the run-command token for one bot image.
    ///
    /// The simulator treats this as a single argument and executes it itself,
    /// which is why the image reference is validated rather than quoted.
    ///
    /// # Errors
    /// Fails when the image reference contains characters outside the Docker
    /// reference grammar (in particular whitespace or quotes).
    pub fn render(&self, image: &str) -> anyhow::Result<String> {
        validate_image(image)?;

        let mut tokens = vec![DOCKER_BIN.to_string(), "run".into(), "--rm".into(), "-i".into()];
        if let Some(shares) = self.cpu_shares {
            tokens.push(format!("-c={shares}"));
        }
        if let Some(megabytes) = self.memory_limit_mb {
            tokens.push(format!("-m={megabytes}m"));
        }
        if let Some(mode) = &self.network {
            tokens.push(format!("--network={mode}"));
        }
        tokens.push(image.to_string());
        Ok(tokens.join(" "))
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_image(image: &str) -> anyhow::Result<()> {
    if image.is_empty() {
        bail!("empty docker image reference");
    }
    let ok = image
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | ':' | '@'));
    if !ok {
        bail!("docker image reference contains invalid characters: {image:?}");
    }
    Ok(())
}

/// Pre-pull every bot image so the match itself does not pay the download.
///
/// Pull failures are logged as warnings and otherwise ignored; a stale local
/// image can still run, and a truly absent one fails the match run.
pub fn pull_images(roster: &[BotSpec]) {
    for bot in roster {
        info!("{DOCKER_BIN} pull {}", bot.docker_image);
        match Command::new(DOCKER_BIN)
            .args(["pull", &bot.docker_image])
            .output()
        {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(
                    "docker pull {} failed ({}): {}",
                    bot.docker_image,
                    output.status,
                    stderr.trim()
                );
            }
            Err(e) => warn!("could not run {DOCKER_BIN}: {e}"),
        }
    }
}
