use std::collections::HashSet;
use std::path::PathBuf;

use crate::{cli::Cli, types::Checksum};

#[derive(Debug, Clone, serde::Serialize)]
pub struct Config {
    pub dat: PathBuf,
    /// Normalized extension exclusions: lowercase, no leading dot.
    pub exclude: HashSet<String>,
    pub infozip: bool,
    pub outdir: PathBuf,
    pub remove: bool,
    pub checksum: Checksum,
    pub print_summary: bool,
    pub files: Vec<PathBuf>,
    pub verbose: u8,
    pub quiet: u8,
}

impl Config {
    fn validate_outdir(&self) -> anyhow::Result<()> {
        if self.outdir.exists() && !self.outdir.is_dir() {
            anyhow::bail!(
                "output directory {} exists and is not a directory",
                self.outdir.display()
            );
        }

        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_outdir()?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dat: PathBuf::new(),
            exclude: HashSet::new(),
            infozip: false,
            outdir: PathBuf::from("."),
            remove: false,
            checksum: Checksum::Sha1,
            print_summary: false,
            files: Vec::new(),
            verbose: 0,
            quiet: 0,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mut exclude = HashSet::new();
        for ext in &cli.exclude {
            let normalized = ext.trim_start_matches('.').to_ascii_lowercase();
            if normalized.is_empty() {
                anyhow::bail!("--exclude requires a non-empty extension, got {ext:?}");
            }
            exclude.insert(normalized);
        }

        let config = Self {
            dat: cli.dat,
            exclude,
            infozip: cli.infozip,
            outdir: cli.outdir,
            remove: cli.remove,
            checksum: cli.checksum,
            print_summary: cli.print_summary,
            files: cli.files,
            verbose: cli.verbose,
            quiet: cli.quiet,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn normalizes_excluded_extensions() {
        let cli = Cli::parse_from([
            "romset", "--dat", "games.dat", "-e", ".ZIP", "-e", "Cue", "a.bin",
        ]);
        let config = Config::try_from(cli).expect("config should parse");
        assert!(config.exclude.contains("zip"));
        assert!(config.exclude.contains("cue"));
        assert_eq!(config.exclude.len(), 2);
    }

    #[test]
    fn errors_on_empty_excluded_extension() {
        let cli = Cli::parse_from(["romset", "--dat", "games.dat", "-e", "."]);
        let err = Config::try_from(cli).unwrap_err();
        assert!(err.to_string().contains("non-empty extension"));
    }

    #[test]
    fn supplies_defaults() {
        let cli = Cli::parse_from(["romset", "--dat", "games.dat"]);
        let config = Config::try_from(cli).expect("config should parse");
        assert_eq!(config.outdir, PathBuf::from("."));
        assert_eq!(config.checksum, Checksum::Sha1);
        assert!(!config.infozip);
        assert!(!config.remove);
        assert!(config.files.is_empty());
    }
}
