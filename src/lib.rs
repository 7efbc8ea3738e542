//! Hyoshi - Comic Archive to EPUB Conversion Library
//!
//! This crate converts comic archives (CBR/CBZ, i.e. sequentially numbered page
//! images) into EPUB books. Each archive is built twice:
//!
//! 1. a *full* book holding every page, kept only on request (`X._base.epub`);
//! 2. the *final* book (`X.epub`), where the first page becomes the cover image
//!    and the remaining pages are renumbered from 1.
//!
//! # Getting Started
//!
//! ```rust,no_run
//! use hyoshi::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> hyoshi::error::Result<()> {
//!     let config = HyoshiConfig::builder()
//!         .seven_zip_path(PathBuf::from("/usr/bin/7z"))
//!         .keep_intermediate(false)
//!         .build()?;
//!
//!     // Fails with a configuration error if 7-Zip is missing
//!     let converter = Converter::from_config(config)?;
//!
//!     let report = BatchRunner::new(converter)
//!         .run(Path::new("./comics"))
//!         .await?;
//!     println!("{} converted, {} failed", report.converted(), report.failed());
//!     Ok(())
//! }
//! ```
//!
//! To convert without an external tool (tests, `.cbz` only), implement
//! [`Extractor`](extractor::Extractor) and pass it to [`Converter::new`].

pub mod batch;
pub mod collector;
pub mod container;
pub mod converter;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod hyoshi;
pub mod path_utils;
pub mod types;

pub use batch::{ArchiveOutcome, BatchReport, BatchRunner};
pub use collector::PageSet;
pub use container::{Container, ImageResource, ManifestItem, PageDocument};
pub use converter::{ConversionFailure, ConversionOutput, ConversionStage, Converter};
pub use hyoshi::{HyoshiConfig, HyoshiConfigBuilder};
pub use types::PageRef;

/// Prelude module for convenient imports.
///
/// Re-exports the most commonly used types so a single
/// `use hyoshi::prelude::*;` is enough for typical usage.
pub mod prelude {
    pub use super::{
        ArchiveOutcome, BatchReport, BatchRunner, Container, ConversionFailure, ConversionOutput,
        ConversionStage, Converter, HyoshiConfig, HyoshiConfigBuilder, PageRef, PageSet, error,
        types,
    };
    pub use crate::extractor::{ArchiveExtractor, Extractor, SevenZipExtractor, ZipExtractor};
    pub use crate::generator::{ContainerAssembler, EpubWriter, PageDocumentBuilder};
    pub use std::path::{Path, PathBuf};
    pub use std::sync::Arc;
}
