//! Bot roster descriptors, as supplied by the scheduler.

use anyhow::{bail, Context};
use serde::Deserialize;

/// One competitor in the match: a display name plus the Docker image holding
/// its executable.
///
/// The scheduler hands the roster over as a JSON array; the image key is
/// spelled `docker-image` on that wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotSpec {
    /// Display name reported back in the match results.
    pub name: String,
    /// Image reference (`repository/name:tag`) the bot runs from.
    #[serde(rename = "docker-image")]
    pub docker_image: String,
}

/// Parse the scheduler-provided JSON roster.
///
/// # Errors
/// Fails on malformed JSON or an empty roster.
pub fn parse_roster(json: &str) -> anyhow::Result<Vec<BotSpec>> {
    let roster: Vec<BotSpec> = serde_json::from_str(json).context("malformed bot roster JSON")?;
    if roster.is_empty() {
        bail!("bot roster is empty");
    }
    Ok(roster)
}
