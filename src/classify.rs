use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum::compute_fingerprint;
use crate::config::Config;
use crate::dat::{Catalog, GameId};
use crate::types::{SkipReason, SkippedFile};

/// Outcome of classifying one candidate path.
#[derive(Debug)]
pub enum Classification {
    /// (game, satisfying path) pairs; empty when the fingerprint matched
    /// no catalog entry with the candidate's base filename.
    Matches(Vec<(GameId, PathBuf)>),
    Skipped(SkippedFile),
}

/// Resolve one candidate path against the catalog.
///
/// Skippable conditions (stat failure, excluded extension, non-regular file)
/// never fail the run; a failure to open the file for hashing does. The read
/// handle is scoped to the hashing call and released on every path out.
pub fn classify(
    path: &Path,
    catalog: &Catalog,
    config: &Config,
) -> anyhow::Result<Classification> {
    let metadata = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            eprintln!("Cannot check {}, skipping. Reason: {err}", path.display());
            return Ok(Classification::Skipped(SkippedFile {
                path: path.to_path_buf(),
                reason: SkipReason::StatFailed,
                detail: Some(err.to_string()),
            }));
        }
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if config.exclude.contains(&extension) {
        vprintln!(
            config.verbose,
            1,
            "{} has excluded extension, skipping.",
            path.display()
        );
        return Ok(Classification::Skipped(SkippedFile {
            path: path.to_path_buf(),
            reason: SkipReason::ExcludedExtension,
            detail: Some(extension),
        }));
    }

    if !metadata.is_file() {
        eprintln!("{} is not a regular file, skipping.", path.display());
        return Ok(Classification::Skipped(SkippedFile {
            path: path.to_path_buf(),
            reason: SkipReason::NotRegularFile,
            detail: None,
        }));
    }

    let (fingerprint, _size) = compute_fingerprint(path, config.checksum)?;

    let entries = catalog.lookup_by_fingerprint(&fingerprint);
    vprintln!(
        config.verbose,
        2,
        "found {} fingerprint match(es) for {}",
        entries.len(),
        path.display()
    );

    let base_name = path.file_name().and_then(|n| n.to_str());
    let mut matches = Vec::new();
    for entry in entries {
        if base_name == Some(catalog.rom(*entry).name.as_str()) {
            matches.push((entry.game, path.to_path_buf()));
        }
    }

    Ok(Classification::Matches(matches))
}
