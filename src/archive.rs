//! Bundles a finished match into its durable archive.
//!
//! The archive `{id}.tar.xz` holds the serialized record `{id}.json`, the
//! replay and every timed-out bot's error log, all under their
//! workdir-relative names. Once it is written the source files are removed;
//! the archive is the only copy that leaves the machine.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use xz2::write::XzEncoder;

use crate::match_record::Match;

const XZ_LEVEL: u32 = 6;

/// Serialize `record`, pack it with its replay and error logs, and delete
/// the packed source files.
///
/// Returns the path of the created archive. The archive is created
/// exclusively; a leftover `{id}.tar.xz` from an earlier run is an error,
/// not something to overwrite.
pub fn archive_match(workdir: &Path, record: &Match) -> anyhow::Result<PathBuf> {
    let json_name = PathBuf::from(format!("{}.json", record.id));
    let json_path = workdir.join(&json_name);
    let json = serde_json::to_string(record).context("could not serialize the match record")?;
    fs::write(&json_path, json)
        .with_context(|| format!("could not write {}", json_path.display()))?;

    let archive_name = format!("{}.tar.xz", record.id);
    let archive_path = workdir.join(&archive_name);
    let file = File::create_new(&archive_path)
        .with_context(|| format!("could not create {}", archive_path.display()))?;
    let mut builder = tar::Builder::new(XzEncoder::new(file, XZ_LEVEL));

    append(&mut builder, workdir, &json_name)?;
    append(&mut builder, workdir, &record.replay)?;
    for result in &record.match_results {
        if let Some(log) = &result.error_log {
            append(&mut builder, workdir, log)?;
        }
    }

    let encoder = builder
        .into_inner()
        .context("could not finish the archive")?;
    encoder.finish().context("could not flush the archive")?;

    fs::remove_file(&json_path)
        .with_context(|| format!("could not remove {}", json_path.display()))?;
    remove_relative(workdir, &record.replay)?;
    for result in &record.match_results {
        if let Some(log) = &result.error_log {
            remove_relative(workdir, log)?;
        }
    }

    info!("archived match {} as {archive_name}", record.id);
    Ok(archive_path)
}

fn append<W: Write>(builder: &mut tar::Builder<W>, workdir: &Path, name: &Path) -> anyhow::Result<()> {
    builder
        .append_path_with_name(workdir.join(name), name)
        .with_context(|| format!("could not add {} to the archive", name.display()))
}

fn remove_relative(workdir: &Path, name: &Path) -> anyhow::Result<()> {
    let path = workdir.join(name);
    fs::remove_file(&path).with_context(|| format!("could not remove {}", path.display()))
}
