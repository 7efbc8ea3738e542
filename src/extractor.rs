//! Archive extraction boundary.
//!
//! The conversion pipeline only needs one capability from the outside world:
//! populate a directory with the files of an archive, or fail with a
//! diagnostic. [`Extractor`] is that seam; tests substitute their own
//! implementation to avoid depending on a real archive tool.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;
use tokio::task::spawn_blocking;

use crate::error::{Error, Result};
use crate::types::lowercase_extension;

/// Unpacks an archive into a destination directory.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Populates `destination` with the contents of `archive`.
    ///
    /// Any failure must be reported as [`Error::ExtractionFailed`] carrying the
    /// diagnostic text of the underlying tool.
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<()>;
}

/// Runs an external 7-Zip executable (`7z x <archive> -o<dest> -y`).
#[derive(Debug, Clone)]
pub struct SevenZipExtractor {
    executable: PathBuf,
}

impl SevenZipExtractor {
    /// Creates the extractor after checking that the executable exists.
    ///
    /// A missing tool is a configuration problem and aborts the run.
    pub fn new(executable: impl Into<PathBuf>) -> Result<Self> {
        let executable = executable.into();
        if !executable.is_file() {
            return Err(Error::Configuration(format!(
                "7-Zip executable not found at '{}'",
                executable.display()
            )));
        }
        Ok(Self { executable })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[async_trait]
impl Extractor for SevenZipExtractor {
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        let mut output_flag = std::ffi::OsString::from("-o");
        output_flag.push(destination.as_os_str());

        debug!(
            "Running {} x {} -o{} -y",
            self.executable.display(),
            archive.display(),
            destination.display()
        );
        let output = Command::new(&self.executable)
            .arg("x")
            .arg(archive)
            .arg(output_flag)
            .arg("-y")
            .output()
            .await
            .map_err(|e| Error::ExtractionFailed {
                archive: archive.to_path_buf(),
                diagnostic: format!("Failed to run '{}': {}", self.executable.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostic = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(Error::ExtractionFailed {
                archive: archive.to_path_buf(),
                diagnostic,
            });
        }
        Ok(())
    }
}

/// Unpacks ZIP based archives (`.cbz`) in process with the `zip` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

#[async_trait]
impl Extractor for ZipExtractor {
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        let archive_path = archive.to_path_buf();
        let destination = destination.to_path_buf();

        let result = spawn_blocking(move || -> std::result::Result<(), String> {
            let file = File::open(&archive_path).map_err(|e| e.to_string())?;
            let mut zip = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;
            zip.extract(&destination).map_err(|e| e.to_string())
        })
        .await?;

        result.map_err(|diagnostic| Error::ExtractionFailed {
            archive: archive.to_path_buf(),
            diagnostic,
        })
    }
}

/// Default extractor: `.cbz` archives are unpacked natively, everything else
/// goes through 7-Zip when it is configured.
#[derive(Clone)]
pub struct ArchiveExtractor {
    zip: ZipExtractor,
    seven_zip: Option<SevenZipExtractor>,
}

impl ArchiveExtractor {
    pub fn new(seven_zip: Option<SevenZipExtractor>) -> Self {
        Self {
            zip: ZipExtractor,
            seven_zip,
        }
    }

    /// Builds the extractor from an optional 7-Zip path, validating it.
    pub fn from_tool_path(seven_zip_path: Option<&Path>) -> Result<Self> {
        let seven_zip = seven_zip_path.map(SevenZipExtractor::new).transpose()?;
        Ok(Self::new(seven_zip))
    }

    /// Wraps the extractor for sharing with a [`Converter`](crate::converter::Converter).
    pub fn shared(self) -> Arc<dyn Extractor> {
        Arc::new(self)
    }
}

#[async_trait]
impl Extractor for ArchiveExtractor {
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        if lowercase_extension(archive).as_deref() == Some("cbz") {
            return self.zip.extract(archive, destination).await;
        }
        match &self.seven_zip {
            Some(seven_zip) => seven_zip.extract(archive, destination).await,
            None => Err(Error::ExtractionFailed {
                archive: archive.to_path_buf(),
                diagnostic: "No external extractor configured for this archive type".to_string(),
            }),
        }
    }
}
