//! Assembled match records, in the shape the collector ingests.

use std::path::PathBuf;

use anyhow::bail;
use serde::Serialize;

use crate::bot::BotSpec;
use crate::output_parser::SimulationOutput;

/// Outcome of one bot in one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Display name from the roster.
    pub bot_name: String,
    /// Image the bot ran as.
    pub docker_image: String,
    /// Final rank, 1 = winner.
    pub rank: usize,
    /// Last frame on which the bot still held cells.
    pub last_frame_alive: u64,
    /// Log captured by the simulator when the bot timed out, else `null`.
    pub error_log: Option<PathBuf>,
}

/// A finished match, ready to be serialized and archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Identifier assigned by the caller, unique per run.
    pub id: String,
    /// UTC timestamp of assembly, RFC 3339.
    pub date: String,
    /// Replay file, relative to the match directory.
    pub replay: PathBuf,
    /// Seed the map was generated from.
    pub seed: u64,
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// One outcome per bot, in roster order.
    pub match_results: Vec<MatchResult>,
    /// Identifier of the surrounding tournament run, when one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<u64>,
}

/// Pair each roster entry with its simulator result.
///
/// Results are trusted to arrive in roster order (the simulator reports
/// players in invocation order), so entry `i` of the roster pairs with
/// `output.results[i]` without any id lookup. Ranks are reported 1-based.
///
/// # Errors
/// Fails when the simulator reported a different number of results than
/// there are bots in the roster.
pub fn assemble(output: &SimulationOutput, roster: &[BotSpec]) -> anyhow::Result<Vec<MatchResult>> {
    if output.results.len() != roster.len() {
        bail!(
            "simulator reported {} results for {} bots",
            output.results.len(),
            roster.len()
        );
    }

    let results = roster
        .iter()
        .zip(&output.results)
        .map(|(bot, result)| {
            // Timeouts are rare, a linear scan is enough.
            let error_log = output
                .timeout_bots
                .iter()
                .position(|&id| id == result.player_id)
                .map(|index| output.timeout_logs[index].clone());
            MatchResult {
                bot_name: bot.name.clone(),
                docker_image: bot.docker_image.clone(),
                rank: result.rank + 1,
                last_frame_alive: result.last_frame_alive,
                error_log,
            }
        })
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::output_parser::parse;

    fn roster() -> Vec<BotSpec> {
        vec![
            BotSpec {
                name: "alice".into(),
                docker_image: "bots/alice:1".into(),
            },
            BotSpec {
                name: "bob".into(),
                docker_image: "bots/bob:2".into(),
            },
        ]
    }

    #[test]
    fn assembles_clean_match() {
        let raw = "30 30\nreplays/1234.hlt 42\n1 2 150\n2 1 300\n";
        let output = parse(raw, 2, Path::new(".")).unwrap();
        let results = assemble(&output, &roster()).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].bot_name, "alice");
        assert_eq!(results[0].rank, 2);
        assert_eq!(results[0].last_frame_alive, 150);
        assert_eq!(results[0].error_log, None);
        assert_eq!(results[1].bot_name, "bob");
        assert_eq!(results[1].rank, 1);
        assert_eq!(results[1].last_frame_alive, 300);
        assert_eq!(results[1].error_log, None);
    }

    #[test]
    fn timed_out_bots_carry_their_logs() {
        let raw = "20 20\nreplay.hlt 42\n1 1 300\n2 2 250\n1 2\nbot1.log bot2.log\n";
        let output = parse(raw, 2, Path::new(".")).unwrap();

        assert_eq!(output.width, 20);
        assert_eq!(output.height, 20);
        assert_eq!(output.seed, 42);
        assert_eq!(output.results[0].player_id, 0);
        assert_eq!(output.results[0].rank, 0);
        assert_eq!(output.results[0].last_frame_alive, 300);
        assert_eq!(output.results[1].player_id, 1);
        assert_eq!(output.results[1].rank, 1);
        assert_eq!(output.results[1].last_frame_alive, 250);
        assert_eq!(output.timeout_bots, vec![0, 1]);

        let results = assemble(&output, &roster()).unwrap();
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[0].error_log, Some(PathBuf::from("bot1.log")));
        assert_eq!(results[1].rank, 2);
        assert_eq!(results[1].error_log, Some(PathBuf::from("bot2.log")));
    }

    #[test]
    fn rejects_roster_and_results_of_different_lengths() {
        let raw = "30 30\nreplays/1.hlt 1\n1 1 10\n";
        let output = parse(raw, 1, Path::new(".")).unwrap();
        let err = assemble(&output, &roster()).unwrap_err().to_string();
        assert!(err.contains("1 results for 2 bots"), "{err}");
    }

    #[test]
    fn serializes_in_the_collector_schema() {
        let record = Match {
            id: "77".into(),
            date: "2024-05-01T12:00:00Z".into(),
            replay: PathBuf::from("replays/77.hlt"),
            seed: 9,
            width: 30,
            height: 25,
            match_results: vec![MatchResult {
                bot_name: "alice".into(),
                docker_image: "bots/alice:1".into(),
                rank: 1,
                last_frame_alive: 120,
                error_log: None,
            }],
            run_id: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "77",
                "date": "2024-05-01T12:00:00Z",
                "replay": "replays/77.hlt",
                "seed": 9,
                "width": 30,
                "height": 25,
                "match_results": [{
                    "bot_name": "alice",
                    "docker_image": "bots/alice:1",
                    "rank": 1,
                    "last_frame_alive": 120,
                    "error_log": null,
                }],
            })
        );
    }

    #[test]
    fn run_id_is_serialized_when_present() {
        let record = Match {
            id: "1".into(),
            date: "2024-05-01T12:00:00Z".into(),
            replay: PathBuf::from("r.hlt"),
            seed: 1,
            width: 20,
            height: 20,
            match_results: Vec::new(),
            run_id: Some(4242),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["run_id"], serde_json::json!(4242));
    }
}
