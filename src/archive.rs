use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context;
use chrono::{DateTime, Datelike, Local, Timelike};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::config::Config;

/// One capability: build an archive from an ordered file list. Implementations
/// are interchangeable; the evaluator never branches on which one it holds.
pub trait SetArchiver {
    fn write_set(&self, archive: &Path, files: &[PathBuf]) -> anyhow::Result<()>;
}

/// Streams each file into a single deflate-compressed zip container,
/// preserving base filename, modification time and permission bits.
pub struct InternalZip {
    pub verbose: u8,
}

impl SetArchiver for InternalZip {
    fn write_set(&self, archive: &Path, files: &[PathBuf]) -> anyhow::Result<()> {
        let result = self.write_entries(archive, files);
        if result.is_err() {
            // Do not leave a truncated container behind on a failed run.
            let _ = fs::remove_file(archive);
        }
        result
    }
}

impl InternalZip {
    fn write_entries(&self, archive: &Path, files: &[PathBuf]) -> anyhow::Result<()> {
        let container =
            File::create(archive).with_context(|| format!("creating archive: {archive:?}"))?;
        let mut zip = ZipWriter::new(container);

        for path in files {
            let name = entry_name(path);
            vprintln!(
                self.verbose,
                1,
                "Writing {} to {}...",
                name,
                archive.display()
            );

            let metadata = fs::metadata(path)
                .with_context(|| format!("reading metadata for archive entry: {path:?}"))?;
            let mut options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .large_file(metadata.len() >= u32::MAX as u64);
            if let Some(modified) = zip_datetime(&metadata) {
                options = options.last_modified_time(modified);
            }
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                options = options.unix_permissions(metadata.permissions().mode());
            }

            zip.start_file(name, options)
                .with_context(|| format!("starting archive entry: {path:?}"))?;
            let mut source =
                File::open(path).with_context(|| format!("opening archive entry: {path:?}"))?;
            io::copy(&mut source, &mut zip)
                .with_context(|| format!("writing archive entry: {path:?}"))?;
        }

        // Only a successfully finalized container counts as produced.
        zip.finish()
            .with_context(|| format!("finalizing archive: {archive:?}"))?;

        Ok(())
    }
}

/// Shells out to the info-zip command line tool:
/// `zip <archive> <file1> <file2> ...`, inheriting our stdout.
pub struct ExternalZip {
    executable: PathBuf,
}

impl ExternalZip {
    pub fn locate() -> anyhow::Result<Self> {
        let executable =
            which::which("zip").context("info-zip executable `zip` not found in PATH")?;
        Ok(Self { executable })
    }

    pub fn with_executable(executable: PathBuf) -> Self {
        Self { executable }
    }
}

impl SetArchiver for ExternalZip {
    fn write_set(&self, archive: &Path, files: &[PathBuf]) -> anyhow::Result<()> {
        let status = Command::new(&self.executable)
            .arg(archive)
            .args(files)
            .stdout(Stdio::inherit())
            .status()
            .with_context(|| format!("running {:?} to create {archive:?}", self.executable))?;

        if !status.success() {
            anyhow::bail!("external zip exited with {status} while creating {archive:?}");
        }

        Ok(())
    }
}

/// Resolve the backend selected by the run-wide configuration flag.
pub fn select_backend(config: &Config) -> anyhow::Result<Box<dyn SetArchiver>> {
    if config.infozip {
        Ok(Box::new(ExternalZip::locate()?))
    } else {
        Ok(Box::new(InternalZip {
            verbose: config.verbose,
        }))
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn zip_datetime(metadata: &fs::Metadata) -> Option<zip::DateTime> {
    let modified: DateTime<Local> = metadata.modified().ok()?.into();
    zip::DateTime::from_date_and_time(
        modified.year().try_into().ok()?,
        modified.month() as u8,
        modified.day() as u8,
        modified.hour() as u8,
        modified.minute() as u8,
        modified.second() as u8,
    )
    .ok()
}
