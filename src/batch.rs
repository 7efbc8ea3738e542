//! Batch conversion of every archive in a directory.
//!
//! Archives are processed one after another in natural file name order. A
//! failing archive is logged and recorded in the [`BatchReport`]; the batch
//! itself only fails when the root directory cannot be listed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use rayon::prelude::*;
use tokio::fs::read_dir;

use crate::converter::{ConversionFailure, ConversionOutput, ConversionStage, Converter};
use crate::error::{Error, Result};
use crate::path_utils::{compare_paths_natural, get_file_name_lossy};

/// Result of processing one archive.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ArchiveOutcome {
    Converted(ConversionOutput),
    /// The archive held no qualifying images.
    Skipped(ConversionFailure),
    Failed(ConversionFailure),
}

impl ArchiveOutcome {
    pub fn archive(&self) -> &Path {
        match self {
            ArchiveOutcome::Converted(output) => &output.archive,
            ArchiveOutcome::Skipped(failure) | ArchiveOutcome::Failed(failure) => &failure.archive,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ArchiveOutcome::Converted(_))
    }
}

/// Per-archive outcomes of a batch, in processing order.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BatchReport {
    pub root: PathBuf,
    pub outcomes: Vec<ArchiveOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, ArchiveOutcome::Converted(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ArchiveOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ArchiveOutcome::Failed(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, predicate: impl Fn(&ArchiveOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

/// Runs a [`Converter`] over every archive found directly in a root directory.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    converter: Converter,
}

impl BatchRunner {
    pub fn new(converter: Converter) -> Self {
        Self { converter }
    }

    /// Lists the archives directly inside `root` that match the configured
    /// extensions, in natural file name order.
    pub async fn list_archives(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut archives = Vec::new();
        let mut entries = read_dir(root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && self.converter.config().is_archive(&path) {
                archives.push(path);
            }
        }
        archives.par_sort_by(|a, b| compare_paths_natural(a, b));
        Ok(archives)
    }

    /// Converts every archive in `root`.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - One outcome per archive; individual failures are not errors
    /// * `Err(Error::InvalidPath)` - `root` does not exist or is not a directory
    pub async fn run(&self, root: &Path) -> Result<BatchReport> {
        if !root.is_dir() {
            return Err(Error::InvalidPath(
                root.to_path_buf(),
                "Path does not exist or is not a directory".to_string(),
            ));
        }

        let started_at = Utc::now();
        let archives = self.list_archives(root).await?;
        if archives.is_empty() {
            info!("No archives found in {}", root.display());
        }

        let mut outcomes = Vec::with_capacity(archives.len());
        let mut claimed = HashSet::new();
        for archive in archives {
            // X.cbr and X.cbz both map to X.epub; the first in order wins.
            let epub_path = self.converter.config().final_path_for(&archive);
            if !claimed.insert(epub_path.clone()) {
                outcomes.push(Self::collision(archive, &epub_path));
                continue;
            }
            outcomes.push(self.process(&archive).await);
        }

        let report = BatchReport {
            root: root.to_path_buf(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };
        if !report.is_empty() {
            info!(
                "Finished {} archive(s) in {}s: {} converted, {} skipped, {} failed",
                report.outcomes.len(),
                (report.finished_at - report.started_at).num_seconds(),
                report.converted(),
                report.skipped(),
                report.failed()
            );
        }
        Ok(report)
    }

    fn collision(archive: PathBuf, epub_path: &Path) -> ArchiveOutcome {
        let reason = format!(
            "Another archive in this batch already writes '{}'",
            epub_path.display()
        );
        warn!("  Skipping {}: {}", get_file_name_lossy(&archive), reason);
        ArchiveOutcome::Failed(ConversionFailure {
            error: Error::InvalidPath(archive.clone(), reason),
            archive,
            stage: ConversionStage::Pending,
        })
    }

    async fn process(&self, archive: &Path) -> ArchiveOutcome {
        let name = get_file_name_lossy(archive);
        info!("Processing: {}", name);

        match self.converter.convert(archive).await {
            Ok(output) => {
                info!("  Converted {} ({} page(s))", name, output.page_count);
                ArchiveOutcome::Converted(output)
            }
            Err(failure) if failure.is_skip() => {
                warn!("  No images found in {}. Skipped.", name);
                ArchiveOutcome::Skipped(failure)
            }
            Err(failure) => {
                error!("  Error processing {}: {}", name, failure.error);
                ArchiveOutcome::Failed(failure)
            }
        }
    }
}
