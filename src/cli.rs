use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::types::Checksum;

#[derive(Parser, Debug, serde::Serialize)]
#[command(
    name = "romset",
    version,
    about = "Assemble verified ROM sets from loose files and a DAT catalog",
    long_about = "Searches the given files for members of each game in a DAT catalog, \
identified by content hash, and zips every complete set into one archive per game."
)]
pub struct Cli {
    /// Path to the DAT catalog of known-good games
    #[arg(short = 'd', long = "dat", value_name = "PATH")]
    pub dat: PathBuf,

    /// Extension to exclude from the file list (can be specified multiple times)
    #[arg(short = 'e', long = "exclude", value_name = "EXT", action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Use the info-zip command line tool instead of the internal zip writer
    #[arg(short = 'i', long = "infozip")]
    pub infozip: bool,

    /// Directory in which to output zipped sets
    #[arg(short = 'o', long = "outdir", value_name = "PATH", default_value = ".")]
    pub outdir: PathBuf,

    /// Remove source files after zipping
    #[arg(short = 'm', long = "remove")]
    pub remove: bool,

    /// Checksum algorithm used to fingerprint files against the catalog
    #[arg(long = "checksum", value_enum, default_value_t = Checksum::Sha1)]
    pub checksum: Checksum,

    /// Print the run summary as JSON to stdout (opt-in)
    #[arg(long = "print-summary")]
    pub print_summary: bool,

    // logging options
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Files to check and zip (default: all entries of the current directory)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}
