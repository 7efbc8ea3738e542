//! Core data types and constants shared by the Hyoshi pipeline.
//!
//! - Page references discovered in an extracted archive (`PageRef`)
//! - The image extension allow-list and media type table
//! - The default archive extension filter used by the batch runner

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;

/// Image extensions (lowercase, without dot) accepted as comic pages.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Archive extensions picked up by the batch runner unless configured otherwise.
pub const DEFAULT_ARCHIVE_EXTENSIONS: [&str; 2] = ["cbr", "cbz"];

/// Media type used for extensions missing from [`struct@MEDIA_TYPES`].
pub const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

lazy_static! {
    /// Extension (lowercase) to media type.
    pub static ref MEDIA_TYPES: HashMap<&'static str, &'static str> = HashMap::from([
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("webp", "image/webp"),
    ]);
}

/// A single page image discovered on disk.
///
/// Identity is the path; the extension is cached in lowercase so the assembler
/// does not have to re-derive it for every phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRef {
    path: PathBuf,
    extension: String,
}

impl PageRef {
    /// Creates a page reference if `path` carries an allowed image extension.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let extension = lowercase_extension(&path)?;
        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }
        Some(Self { path, extension })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercase extension without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn media_type(&self) -> &'static str {
        media_type_for(&self.extension)
    }
}

/// Returns the lowercase extension of `path`, if it has a UTF-8 one.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Maps an image extension to its media type.
///
/// Unknown extensions fall back to [`FALLBACK_MEDIA_TYPE`] instead of failing.
pub fn media_type_for(extension: &str) -> &'static str {
    MEDIA_TYPES
        .get(extension.to_ascii_lowercase().as_str())
        .copied()
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}
