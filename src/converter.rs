//! Conversion of a single archive, end to end.
//!
//! ```text
//! Pending -> Extracting -> Scanning -> BuildingFull -> BuildingFinal -> CleaningUp -> Done
//!      \__________\____________\____________\______________\______________\__> Failed
//! ```
//!
//! The extraction directory is a [`tempfile::TempDir`] owned by the conversion,
//! so it is removed on every exit path, including failures.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use tempfile::TempDir;

use crate::collector::PageSet;
use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::generator::{ContainerAssembler, EpubWriter};
use crate::hyoshi::HyoshiConfig;
use crate::path_utils::{get_file_name_lossy, get_file_stem_lossy};

/// States of a single archive conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConversionStage {
    Pending,
    Extracting,
    Scanning,
    BuildingFull,
    BuildingFinal,
    CleaningUp,
    Done,
    Failed,
}

impl ConversionStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConversionStage::Done | ConversionStage::Failed)
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionStage::Pending => "pending",
            ConversionStage::Extracting => "extracting",
            ConversionStage::Scanning => "scanning",
            ConversionStage::BuildingFull => "building full book",
            ConversionStage::BuildingFinal => "building final book",
            ConversionStage::CleaningUp => "cleaning up",
            ConversionStage::Done => "done",
            ConversionStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Artifacts produced by a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConversionOutput {
    pub archive: PathBuf,
    /// The final book (cover promoted, remaining pages renumbered).
    pub epub_path: PathBuf,
    /// The intermediate book with every page, only when it was retained.
    pub intermediate_path: Option<PathBuf>,
    /// Number of pages discovered in the archive, cover included.
    pub page_count: usize,
}

/// A conversion that stopped before reaching [`ConversionStage::Done`].
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("{name} failed while {stage}: {error}", name = get_file_name_lossy(.archive))]
pub struct ConversionFailure {
    pub archive: PathBuf,
    /// The state that was active when the error occurred.
    pub stage: ConversionStage,
    #[source]
    pub error: Error,
}

impl ConversionFailure {
    /// Whether the archive was skipped because it held no images.
    pub fn is_skip(&self) -> bool {
        self.error.is_skip()
    }
}

/// Drives one archive through extraction, page discovery and both assembly phases.
#[derive(Clone)]
pub struct Converter {
    config: HyoshiConfig,
    extractor: Arc<dyn Extractor>,
    assembler: ContainerAssembler,
    writer: EpubWriter,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("extractor", &"Arc<dyn Extractor>")
            .field("assembler", &self.assembler)
            .finish()
    }
}

impl Converter {
    /// Creates a converter using `extractor` for the extraction step.
    pub fn new(config: HyoshiConfig, extractor: Arc<dyn Extractor>) -> Self {
        let assembler = ContainerAssembler::new(config.language.clone());
        Self {
            config,
            extractor,
            assembler,
            writer: EpubWriter,
        }
    }

    /// Validates `config` and creates a converter with the default extractor.
    ///
    /// Fails with [`Error::Configuration`] when the configured tool is missing.
    pub fn from_config(config: HyoshiConfig) -> Result<Self> {
        config.preflight_check()?;
        let extractor = config.extractor()?.shared();
        Ok(Self::new(config, extractor))
    }

    pub fn config(&self) -> &HyoshiConfig {
        &self.config
    }

    /// Converts `archive` into `X.epub` (and optionally `X._base.epub`).
    ///
    /// # Returns
    ///
    /// * `Ok(ConversionOutput)` - Both phases completed and cleanup ran
    /// * `Err(ConversionFailure)` - The stage that failed and its error. An empty
    ///   archive fails at [`ConversionStage::Scanning`] with [`Error::EmptyPageSet`].
    pub async fn convert(
        &self,
        archive: &Path,
    ) -> std::result::Result<ConversionOutput, ConversionFailure> {
        let mut stage = ConversionStage::Pending;
        let result = self.run(archive, &mut stage).await;
        result.map_err(|error| {
            debug!("{}: {} -> {}", get_file_name_lossy(archive), stage, ConversionStage::Failed);
            ConversionFailure {
                archive: archive.to_path_buf(),
                stage,
                error,
            }
        })
    }

    async fn run(&self, archive: &Path, stage: &mut ConversionStage) -> Result<ConversionOutput> {
        let name = get_file_name_lossy(archive);
        let title = get_file_stem_lossy(archive);

        // Dropping the TempDir removes it, whichever way this function returns.
        let workdir = tempfile::Builder::new()
            .prefix(&self.config.temp_prefix)
            .tempdir()?;

        advance(&name, stage, ConversionStage::Extracting);
        self.extractor.extract(archive, workdir.path()).await?;

        advance(&name, stage, ConversionStage::Scanning);
        let pages = PageSet::discover(workdir.path()).await?;

        let output_dir = self.config.output_dir_for(archive);
        tokio::fs::create_dir_all(&output_dir).await?;

        advance(&name, stage, ConversionStage::BuildingFull);
        let intermediate_path = self.config.intermediate_path_for(archive);
        let full = self.assembler.assemble_full(&title, &pages).await?;
        self.writer.write(full, &intermediate_path).await?;
        info!("  Base EPUB: {}", intermediate_path.display());

        advance(&name, stage, ConversionStage::BuildingFinal);
        let epub_path = self.config.final_path_for(archive);
        let built: Result<()> = async {
            let book = self.assembler.assemble_final(&title, &pages).await?;
            self.writer.write(book, &epub_path).await
        }
        .await;
        if let Err(error) = built {
            if !self.config.keep_intermediate {
                remove_best_effort(&intermediate_path).await;
            }
            return Err(error);
        }
        info!("  Final EPUB: {}", epub_path.display());

        advance(&name, stage, ConversionStage::CleaningUp);
        let intermediate_path = if self.config.keep_intermediate {
            Some(intermediate_path)
        } else {
            remove_best_effort(&intermediate_path).await;
            None
        };
        release_workdir(workdir);

        advance(&name, stage, ConversionStage::Done);
        Ok(ConversionOutput {
            archive: archive.to_path_buf(),
            epub_path,
            intermediate_path,
            page_count: pages.len(),
        })
    }
}

fn advance(name: &str, stage: &mut ConversionStage, next: ConversionStage) {
    debug!("{}: {} -> {}", name, stage, next);
    *stage = next;
}

/// Deletes the intermediate book. The final book already exists at this point,
/// so a failure is only logged.
async fn remove_best_effort(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not delete intermediate {}: {}", path.display(), e),
    }
}

fn release_workdir(workdir: TempDir) {
    let path = workdir.path().to_path_buf();
    if let Err(e) = workdir.close() {
        warn!("Could not remove temporary directory {}: {}", path.display(), e);
    }
}
