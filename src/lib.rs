//! # Halite Match
//!
//! Runs one Halite match between dockerized bots and ships the outcome to a
//! central collector.
//!
//! It provides:
//! - Simulator invocation with one sandboxed run command per bot (`MatchRunner`)
//! - Parsing of the simulator's quiet-mode output (`output_parser`)
//! - Assembly of per-bot outcomes against the roster (`match_record`)
//! - Archival and authenticated upload with bounded retry (`ArchiveUploader`)
//!
//! The harness is one link in a larger tournament pipeline: a scheduler picks
//! the contestants and starts one harness process per match, and the collector
//! keeps every uploaded archive. Each bot runs as its own Docker container;
//! the harness never talks to the bots, only to the simulator.
//!
//! # Documentation Overview
//!
//! - For the simulator's output format, see the [`output_parser`] module.
//! - For configuration and the recognized environment variables, see
//!   [`Configuration`](crate::configuration::Configuration) and
//!   [`SandboxPolicy`](crate::sandbox::SandboxPolicy).
//! - For the upload contract and retry policy, see the [`uploader`] module.
//!
//! # Usage Example
//!
//! One match between two bots, reported to the collector configured in the
//! environment:
//!
//! ```no_run
//! use halite_match::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     halite_match::logger::init_logger();
//!
//!     let roster = parse_roster(
//!         r#"[{"name": "alice", "docker-image": "bots/alice:1"},
//!             {"name": "bob", "docker-image": "bots/bob:2"}]"#,
//!     )?;
//!
//!     let config = Configuration::from_env()?;
//!     let sandbox = SandboxPolicy::from_env();
//!
//!     pull_images(&roster);
//!     let record = MatchRunner::new(config.clone(), sandbox).run(&roster, "30", "match-1")?;
//!     ArchiveUploader::new(config).finalize_and_upload(&record)?;
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub use anyhow;

mod archive;
pub mod bot;
pub mod configuration;
pub mod logger;
pub mod match_record;
pub mod match_runner;
pub mod output_parser;
pub mod sandbox;
pub mod uploader;

/// Commonly used types and functions for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use halite_match::prelude::*;
/// ```
///
/// Includes:
/// - [`Configuration`](crate::configuration::Configuration)
/// - [`SandboxPolicy`](crate::sandbox::SandboxPolicy) and [`pull_images`](crate::sandbox::pull_images)
/// - [`BotSpec`](crate::bot::BotSpec) and [`parse_roster`](crate::bot::parse_roster)
/// - [`MatchRunner`](crate::match_runner::MatchRunner)
/// - [`ArchiveUploader`](crate::uploader::ArchiveUploader)
pub mod prelude {
    pub use crate::bot::{parse_roster, BotSpec};
    pub use crate::configuration::Configuration;
    pub use crate::match_record::{Match, MatchResult};
    pub use crate::match_runner::MatchRunner;
    pub use crate::sandbox::{pull_images, SandboxPolicy};
    pub use crate::uploader::ArchiveUploader;
}
