// JSON output files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

/// `<league>__s<season>.json`, the archived copy of one league's season.
pub fn season_file_name(league: &str, season: u32) -> String {
    format!("{league}__s{season}.json")
}

/// `<league>.json`, the current-season copy the site reads.
pub fn current_file_name(league: &str) -> String {
    format!("{league}.json")
}

pub const CAREERS_FILE: &str = "careers.json";

/// Serialize `value` as compact JSON to `path`, replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

/// Write a league's season file and copy it over the current-season file.
/// Returns both paths.
pub fn write_season<T: Serialize + ?Sized>(
    save_dir: &Path,
    league: &str,
    season: u32,
    value: &T,
) -> anyhow::Result<[PathBuf; 2]> {
    let archived = save_dir.join(season_file_name(league, season));
    let current = save_dir.join(current_file_name(league));
    write_json(&archived, value)?;
    std::fs::copy(&archived, &current).with_context(|| {
        format!("failed to copy {} to {}", archived.display(), current.display())
    })?;
    Ok([archived, current])
}
