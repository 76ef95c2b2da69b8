//! Drives one match from simulator invocation to assembled record.

use std::process::Command;

use anyhow::{bail, Context};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument};

use crate::bot::BotSpec;
use crate::configuration::Configuration;
use crate::match_record::{assemble, Match};
use crate::output_parser;
use crate::sandbox::SandboxPolicy;

/// Runs the simulator and turns its output into a [`Match`] record.
pub struct MatchRunner {
    config: Configuration,
    sandbox: SandboxPolicy,
}

impl MatchRunner {
    /// Create a runner for the given configuration and sandbox policy.
    pub fn new(config: Configuration, sandbox: SandboxPolicy) -> Self {
        Self { config, sandbox }
    }

    /// Run one match to completion and assemble its record.
    ///
    /// Invokes the simulator in the configured working directory with one
    /// `(run command, name)` argument pair per bot, blocking until it exits.
    /// The invocation is logged before execution. The record is stamped with
    /// the current UTC time and the configured run identifier, if any.
    ///
    /// # Errors
    /// Fails when the simulator cannot be launched, exits non-zero, prints
    /// something other than UTF-8, or prints output that violates the wire
    /// format.
    #[instrument(skip_all,fields(id=match_id))]
    pub fn run(&self, roster: &[BotSpec], map_size: &str, match_id: &str) -> anyhow::Result<Match> {
        let args = simulator_args(&self.sandbox, roster, map_size)?;
        info!("{} {}", self.config.simulator.display(), args.join(" "));

        let output = Command::new(&self.config.simulator)
            .args(&args)
            .current_dir(&self.config.workdir)
            .output()
            .with_context(|| format!("could not launch simulator {:?}", self.config.simulator))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("simulator error output: {}", stderr.trim());
            bail!(
                "simulator exited with {}: {}",
                output.status,
                stderr.trim().lines().next().unwrap_or_default()
            );
        }

        let stdout =
            String::from_utf8(output.stdout).context("simulator stdout is not valid UTF-8")?;
        debug!("simulator output:\n{stdout}");

        let output = output_parser::parse(&stdout, roster.len(), &self.config.workdir)?;
        let match_results = assemble(&output, roster)?;

        let date = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("could not format the current time")?;

        Ok(Match {
            id: match_id.to_string(),
            date,
            replay: output.replay,
            seed: output.seed,
            width: output.width,
            height: output.height,
            match_results,
            run_id: self.config.run_id,
        })
    }
}

/// Build the simulator argument list: quiet mode, map size, then one
/// `(run command, name)` pair per bot, in roster order.
fn simulator_args(
    sandbox: &SandboxPolicy,
    roster: &[BotSpec],
    map_size: &str,
) -> anyhow::Result<Vec<String>> {
    let mut args: Vec<String> = vec!["-q".into(), "-d".into(), map_size.into(), "-o".into()];
    for bot in roster {
        args.push(sandbox.render(&bot.docker_image)?);
        args.push(bot.name.clone());
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_argument_pair_per_bot() {
        let roster = vec![
            BotSpec {
                name: "alice".into(),
                docker_image: "bots/alice:1".into(),
            },
            BotSpec {
                name: "bob".into(),
                docker_image: "bots/bob:2".into(),
            },
        ];
        let args = simulator_args(&SandboxPolicy::new(), &roster, "30").unwrap();
        assert_eq!(
            args,
            vec![
                "-q",
                "-d",
                "30",
                "-o",
                "docker run --rm -i -c=1024 bots/alice:1",
                "alice",
                "docker run --rm -i -c=1024 bots/bob:2",
                "bob",
            ]
        );
    }

    #[test]
    fn refuses_to_build_arguments_for_a_bad_image() {
        let roster = vec![BotSpec {
            name: "eve".into(),
            docker_image: "img; rm -rf /".into(),
        }];
        assert!(simulator_args(&SandboxPolicy::new(), &roster, "30").is_err());
    }
}
