use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Algorithm used to fingerprint candidate files and index the catalog.
#[derive(Debug, Clone, Copy, Serialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Checksum {
    #[serde(rename = "CRC32")]
    Crc32,
    #[serde(rename = "MD5")]
    Md5,
    #[serde(rename = "SHA1")]
    Sha1,
    #[serde(rename = "SHA256")]
    Sha256,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    #[serde(rename = "stat_failed")]
    StatFailed,
    #[serde(rename = "excluded_extension")]
    ExcludedExtension,
    #[serde(rename = "not_regular_file")]
    NotRegularFile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::StatFailed => write!(f, "could not be checked"),
            SkipReason::ExcludedExtension => write!(f, "has an excluded extension"),
            SkipReason::NotRegularFile => write!(f, "is not a regular file"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
    pub detail: Option<String>,
}

/// Per-game result of the completeness evaluation pass.
#[derive(Debug, Clone, Serialize)]
pub struct GameOutcome {
    pub game: String,
    pub required: usize,
    pub found: usize,
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub inputs: usize,
    pub classified: usize,
    pub skipped: Vec<SkippedFile>,
    pub games: Vec<GameOutcome>,
}
