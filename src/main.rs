use clap::Parser;
use halite_match::logger;
use halite_match::prelude::*;

/// Run one Halite match between dockerized bots and upload the result.
///
/// The collector endpoint, credentials and simulator binary are taken from
/// the environment; see the crate documentation for the recognized variables.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Identifier of this match, used to name the result archive
    match_id: String,

    /// Map size, passed through to the simulator
    map_size: String,

    /// JSON array of bots: [{"name": "...", "docker-image": "..."}, ...]
    bots: String,
}

fn main() -> anyhow::Result<()> {
    logger::init_logger();
    let args = Args::parse();

    let roster = parse_roster(&args.bots)?;
    let config = Configuration::from_env()?;
    let sandbox = SandboxPolicy::from_env();

    pull_images(&roster);
    let record =
        MatchRunner::new(config.clone(), sandbox).run(&roster, &args.map_size, &args.match_id)?;
    ArchiveUploader::new(config).finalize_and_upload(&record)?;
    Ok(())
}
