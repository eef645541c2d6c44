use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use crate::archive::SetArchiver;
use crate::classify::{Classification, classify};
use crate::config::Config;
use crate::dat::{Catalog, GameId};
use crate::progress::ProgressReporter;
use crate::types::{GameOutcome, RunSummary, SkippedFile};

/// The running record of which on-disk files have been confirmed to satisfy
/// each game's requirements. Keyed by stable game identity so the evaluation
/// pass is deterministic and independent of the catalog's internal storage.
#[derive(Debug, Default)]
pub struct SetBuilder {
    aggregates: BTreeMap<GameId, Vec<PathBuf>>,
}

impl SetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the game's aggregate, creating it on first match.
    /// Duplicates are kept as-is; completeness is a pure count comparison
    /// downstream, so an inflated aggregate simply never reaches equality.
    pub fn record(&mut self, game: GameId, path: PathBuf) {
        self.aggregates.entry(game).or_default().push(path);
    }

    pub fn games(&self) -> impl Iterator<Item = (GameId, &[PathBuf])> {
        self.aggregates
            .iter()
            .map(|(id, paths)| (*id, paths.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }
}

/// Classify every input path, then evaluate and archive each discovered game.
/// Sequential by design: one scoped read handle per candidate, aggregates
/// written only during classification and read only afterward.
pub fn assemble_sets(
    catalog: &Catalog,
    backend: &dyn SetArchiver,
    config: &Config,
) -> anyhow::Result<RunSummary> {
    let inputs = if config.files.is_empty() {
        current_dir_entries()?
    } else {
        config.files.clone()
    };

    let progress = ProgressReporter::new(config, inputs.len());
    let mut builder = SetBuilder::new();
    let mut skipped: Vec<SkippedFile> = Vec::new();
    let mut classified = 0usize;

    for path in &inputs {
        match classify(path, catalog, config)? {
            Classification::Matches(matches) => {
                classified += 1;
                for (game, satisfying) in matches {
                    builder.record(game, satisfying);
                }
            }
            Classification::Skipped(skip) => skipped.push(skip),
        }
        progress.tick(path);
    }
    progress.finish();

    let mut games = Vec::new();
    for (game_id, paths) in builder.games() {
        games.push(archive_if_complete(catalog, game_id, paths, backend, config)?);
    }

    Ok(RunSummary {
        inputs: inputs.len(),
        classified,
        skipped,
        games,
    })
}

fn archive_if_complete(
    catalog: &Catalog,
    game_id: GameId,
    paths: &[PathBuf],
    backend: &dyn SetArchiver,
    config: &Config,
) -> anyhow::Result<GameOutcome> {
    let game = catalog.game(game_id);
    let required = game.roms.len();
    let found = paths.len();
    say!(
        config,
        "Game {} needs {} file(s), found {}",
        game.name,
        required,
        found
    );

    // Under- and over-complete aggregates are both skipped: the archive is
    // produced exactly when the counts are equal.
    if found != required {
        return Ok(GameOutcome {
            game: game.name.clone(),
            required,
            found,
            archived: false,
            archive: None,
        });
    }

    fs::create_dir_all(&config.outdir)
        .with_context(|| format!("creating output directory: {:?}", config.outdir))?;
    let archive_name = format!("{}.zip", game.name);
    let archive_path = config.outdir.join(&archive_name);

    say!(config, "Creating {} with {} file(s)...", archive_name, found);
    backend.write_set(&archive_path, paths)?;

    if config.remove {
        say!(config, "Cleaning up...");
        remove_sources(paths, config);
    }
    say!(config, "Finished writing {}", archive_name);

    Ok(GameOutcome {
        game: game.name.clone(),
        required,
        found,
        archived: true,
        archive: Some(archive_path),
    })
}

fn remove_sources(paths: &[PathBuf], config: &Config) {
    for path in paths {
        vprintln!(config.verbose, 1, "Removing file {}", path.display());
        if let Err(err) = fs::remove_file(path) {
            eprintln!("Unable to remove file {}. Reason: {err}", path.display());
        }
    }
}

fn current_dir_entries() -> anyhow::Result<Vec<PathBuf>> {
    let cwd = std::env::current_dir().context("resolving current working directory")?;
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(&cwd).with_context(|| format!("listing input directory: {cwd:?}"))?
    {
        entries.push(entry?.path());
    }
    entries.sort();

    Ok(entries)
}
