//! Parser for the simulator's quiet-mode output.
//!
//! With `-q` the Halite binary prints a compact, line-oriented summary:
//!
//! ```text
//! 30 30
//! replays/1234.hlt 42
//! 1 2 150
//! 2 1 300
//! ```
//!
//! First the map dimensions, then the replay path and the map seed, then one
//! `<id> <rank> <last_frame_alive>` line per player. If any bot timed out,
//! two more lines follow: the timed-out player ids, and one error-log path
//! per timed-out player, in the same order. A whitespace-only tail means no
//! timeouts.
//!
//! Player ids and ranks are 1-based on the wire and 0-based everywhere else
//! in this crate; frame counts are reported as-is.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail};

/// Final standing of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerResult {
    /// Position of the player in the starting roster, 0-based.
    pub player_id: usize,
    /// Final rank, 0 = winner.
    pub rank: usize,
    /// Last frame on which the player still held cells.
    pub last_frame_alive: u64,
}

/// Everything the simulator reports about one finished match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutput {
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Replay file written by the simulator, relative to the match directory.
    pub replay: PathBuf,
    /// Seed the map was generated from.
    pub seed: u64,
    /// One entry per player, in wire order.
    pub results: Vec<PlayerResult>,
    /// Players disqualified for timing out, 0-based.
    pub timeout_bots: Vec<usize>,
    /// Error logs of the timed-out players, index-aligned with `timeout_bots`.
    pub timeout_logs: Vec<PathBuf>,
}

/// Parse the simulator's quiet-mode output for a match of `bot_count` players.
///
/// Paths the simulator printed under `base` are rewritten relative to it, so
/// downstream records stay portable; other paths pass through untouched.
///
/// # Errors
/// Fails on any structural deviation from the format; messages carry the
/// 1-based number of the offending line.
pub fn parse(raw: &str, bot_count: usize, base: &Path) -> anyhow::Result<SimulationOutput> {
    let mut lines = raw.lines().enumerate().map(|(index, line)| (index + 1, line));

    let (line_no, line) = next_line(&mut lines, "the `width height` line")?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 2 {
        bail!(
            "Line {line_no}: expected `width height`, got {} fields",
            fields.len()
        );
    }
    let width = parse_field(line_no, "width", fields[0])?;
    let height = parse_field(line_no, "height", fields[1])?;

    let (line_no, line) = next_line(&mut lines, "the `replay seed` line")?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 2 {
        bail!(
            "Line {line_no}: expected `replay seed`, got {} fields",
            fields.len()
        );
    }
    let replay = relative_to(base, fields[0]);
    let seed = parse_field(line_no, "seed", fields[1])?;

    let mut results = Vec::with_capacity(bot_count);
    for _ in 0..bot_count {
        let (line_no, line) = next_line(&mut lines, "a player result line")?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            bail!(
                "Line {line_no}: expected `id rank last_frame_alive`, got {} fields",
                fields.len()
            );
        }
        results.push(PlayerResult {
            player_id: wire_index(line_no, "player id", fields[0], bot_count)?,
            rank: wire_index(line_no, "rank", fields[1], bot_count)?,
            last_frame_alive: parse_field(line_no, "last frame alive", fields[2])?,
        });
    }

    let rest: Vec<(usize, &str)> = lines.filter(|(_, line)| !line.trim().is_empty()).collect();
    let (timeout_bots, timeout_logs) = match rest.as_slice() {
        [] => (Vec::new(), Vec::new()),
        [(line_no, _)] => {
            bail!("Line {line_no}: timed-out ids line without the matching log line")
        }
        [(ids_no, ids_line), (logs_no, logs_line), ..] => {
            let mut bots = Vec::new();
            for token in ids_line.split_whitespace() {
                bots.push(wire_index(*ids_no, "timed-out player id", token, bot_count)?);
            }
            let logs: Vec<PathBuf> = logs_line
                .split_whitespace()
                .map(|token| relative_to(base, token))
                .collect();
            if bots.len() != logs.len() {
                bail!(
                    "Line {logs_no}: {} timed-out players but {} log paths",
                    bots.len(),
                    logs.len()
                );
            }
            (bots, logs)
        }
    };

    Ok(SimulationOutput {
        width,
        height,
        replay,
        seed,
        results,
        timeout_bots,
        timeout_logs,
    })
}

fn next_line<'a, I>(lines: &mut I, what: &str) -> anyhow::Result<(usize, &'a str)>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    lines
        .next()
        .ok_or_else(|| anyhow!("simulator output ended early, expected {what}"))
}

fn parse_field<T>(line_no: usize, name: &str, token: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    token
        .parse()
        .map_err(|e| anyhow!("Line {line_no}: invalid {name} {token:?}: {e}"))
}

/// Parse a 1-based wire identifier into a 0-based index, bounds included.
fn wire_index(line_no: usize, name: &str, token: &str, bot_count: usize) -> anyhow::Result<usize> {
    let wire: usize = parse_field(line_no, name, token)?;
    let index = wire
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Line {line_no}: {name} 0 is outside the 1-based wire range"))?;
    if index >= bot_count {
        bail!("Line {line_no}: {name} {wire} exceeds the {bot_count} players in this match");
    }
    Ok(index)
}

fn relative_to(base: &Path, token: &str) -> PathBuf {
    let path = Path::new(token);
    match path.strip_prefix(base) {
        Ok(stripped) => stripped.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_here(raw: &str, bot_count: usize) -> anyhow::Result<SimulationOutput> {
        parse(raw, bot_count, Path::new("."))
    }

    #[test]
    fn parses_two_player_output() {
        let raw = "30 30\nreplays/1234.hlt 42\n1 2 150\n2 1 300\n";
        let output = parse_here(raw, 2).unwrap();
        assert_eq!(output.width, 30);
        assert_eq!(output.height, 30);
        assert_eq!(output.replay, PathBuf::from("replays/1234.hlt"));
        assert_eq!(output.seed, 42);
        assert_eq!(
            output.results,
            vec![
                PlayerResult {
                    player_id: 0,
                    rank: 1,
                    last_frame_alive: 150,
                },
                PlayerResult {
                    player_id: 1,
                    rank: 0,
                    last_frame_alive: 300,
                },
            ]
        );
        assert!(output.timeout_bots.is_empty());
        assert!(output.timeout_logs.is_empty());
    }

    #[test]
    fn parses_timeout_block() {
        let raw = "20 25\n./replays/9.hlt 7\n1 2 43\n2 1 120\n1\nerrorlogs/9-1.log\n";
        let output = parse_here(raw, 2).unwrap();
        assert_eq!(output.replay, PathBuf::from("replays/9.hlt"));
        assert_eq!(output.timeout_bots, vec![0]);
        assert_eq!(output.timeout_logs, vec![PathBuf::from("errorlogs/9-1.log")]);
    }

    #[test]
    fn whitespace_tail_means_no_timeouts() {
        let raw = "30 30\nreplays/1.hlt 1\n1 1 10\n\n   \n";
        let output = parse_here(raw, 1).unwrap();
        assert!(output.timeout_bots.is_empty());
    }

    #[test]
    fn strips_absolute_paths_under_the_match_directory() {
        let raw = "30 30\n/work/m1/replays/5.hlt 5\n1 1 10\n";
        let output = parse(raw, 1, Path::new("/work/m1")).unwrap();
        assert_eq!(output.replay, PathBuf::from("replays/5.hlt"));
    }

    #[test]
    fn rejects_ids_without_logs() {
        let raw = "30 30\nreplays/1.hlt 1\n1 2 10\n2 1 20\n2\n";
        let err = parse_here(raw, 2).unwrap_err().to_string();
        assert!(err.contains("Line 5"), "{err}");
        assert!(err.contains("without the matching log line"), "{err}");
    }

    #[test]
    fn rejects_mismatched_timeout_lists() {
        let raw = "30 30\nreplays/1.hlt 1\n1 2 10\n2 1 20\n1 2\nerrorlogs/a.log\n";
        let err = parse_here(raw, 2).unwrap_err().to_string();
        assert!(err.contains("2 timed-out players but 1 log paths"), "{err}");
    }

    #[test]
    fn rejects_wire_id_zero() {
        let raw = "30 30\nreplays/1.hlt 1\n0 1 10\n";
        let err = parse_here(raw, 1).unwrap_err().to_string();
        assert!(err.contains("Line 3"), "{err}");
        assert!(err.contains("1-based"), "{err}");
    }

    #[test]
    fn rejects_out_of_range_rank() {
        let raw = "30 30\nreplays/1.hlt 1\n1 3 10\n2 1 20\n";
        let err = parse_here(raw, 2).unwrap_err().to_string();
        assert!(err.contains("rank 3 exceeds the 2 players"), "{err}");
    }

    #[test]
    fn rejects_truncated_output() {
        let raw = "30 30\nreplays/1.hlt 1\n1 2 10\n";
        let err = parse_here(raw, 2).unwrap_err().to_string();
        assert!(err.contains("ended early"), "{err}");
    }

    #[test]
    fn rejects_malformed_dimension_line() {
        let err = parse_here("30\n", 1).unwrap_err().to_string();
        assert!(err.contains("Line 1"), "{err}");
        assert!(err.contains("got 1 fields"), "{err}");

        let err = parse_here("30 abc\n", 1).unwrap_err().to_string();
        assert!(err.contains("invalid height"), "{err}");
    }

    #[test]
    fn rejects_non_numeric_seed() {
        let raw = "30 30\nreplays/1.hlt forty-two\n1 1 10\n";
        let err = parse_here(raw, 1).unwrap_err().to_string();
        assert!(err.contains("Line 2"), "{err}");
        assert!(err.contains("invalid seed"), "{err}");
    }
}
