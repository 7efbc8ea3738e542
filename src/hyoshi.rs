use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::extractor::ArchiveExtractor;
use crate::path_utils::get_file_stem_lossy;
use crate::types::{DEFAULT_ARCHIVE_EXTENSIONS, lowercase_extension};

/// Settings for a Hyoshi run, built declaratively with the builder pattern.
///
/// The configuration is handed to a [`Converter`](crate::converter::Converter)
/// at construction; nothing is read from process-wide state.
///
/// ```rust,no_run
/// # use hyoshi::prelude::*;
/// # fn main() -> hyoshi::error::Result<()> {
/// let config = HyoshiConfig::builder()
///     .keep_intermediate(true)
///     .seven_zip_path(PathBuf::from("/usr/bin/7z"))
///     .build()?;
/// config.preflight_check()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HyoshiConfig {
    /// Language tag written into every generated book.
    #[builder(default = "\"en\".to_string()")]
    pub language: String,

    /// Keep the intermediate `X._base.epub` (all pages, no cover) next to the
    /// final book instead of deleting it.
    #[builder(default = "false")]
    pub keep_intermediate: bool,

    /// Path of the external 7-Zip executable used for non-ZIP archives.
    #[builder(default)]
    pub seven_zip_path: Option<PathBuf>,

    /// Where books are written. Defaults to the directory of each archive.
    #[builder(default)]
    pub output_dir: Option<PathBuf>,

    /// Archive extensions (without dot, any case) picked up by the batch runner.
    #[builder(default = "DEFAULT_ARCHIVE_EXTENSIONS.iter().map(|e| e.to_string()).collect()")]
    pub archive_extensions: Vec<String>,

    /// Prefix of the scoped temporary extraction directories.
    #[builder(default = "\"hyoshi_\".to_string()")]
    pub temp_prefix: String,
}

impl Default for HyoshiConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            keep_intermediate: false,
            seven_zip_path: None,
            output_dir: None,
            archive_extensions: DEFAULT_ARCHIVE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            temp_prefix: "hyoshi_".to_string(),
        }
    }
}

impl HyoshiConfig {
    /// Creates a new builder for configuring `HyoshiConfig`.
    pub fn builder() -> HyoshiConfigBuilder {
        HyoshiConfigBuilder::default()
    }

    /// Validates everything that must hold before the first archive is touched.
    ///
    /// # Returns
    ///
    /// * `Ok(&self)` - Configuration is usable
    /// * `Err(Error::Configuration)` - The external tool or the output directory is missing
    pub fn preflight_check(&self) -> Result<&Self> {
        match &self.seven_zip_path {
            Some(tool) if !tool.is_file() => {
                return Err(Error::Configuration(format!(
                    "7-Zip executable not found at '{}'",
                    tool.display()
                )));
            }
            Some(_) => {}
            // Only .cbz archives can be unpacked without the external tool.
            None => {
                if let Some(extension) = self.archive_extensions.iter().find(|e| !is_native(e)) {
                    return Err(Error::Configuration(format!(
                        "7-Zip is required for '.{}' archives but no executable was configured or found",
                        extension
                    )));
                }
            }
        }
        if let Some(output_dir) = &self.output_dir {
            if !output_dir.is_dir() {
                return Err(Error::Configuration(format!(
                    "Output directory '{}' does not exist or is not a directory",
                    output_dir.display()
                )));
            }
        }
        Ok(self)
    }

    /// Builds the default extractor for this configuration.
    pub fn extractor(&self) -> Result<ArchiveExtractor> {
        ArchiveExtractor::from_tool_path(self.seven_zip_path.as_deref())
    }

    /// Whether `path` carries one of the configured archive extensions.
    pub fn is_archive(&self, path: &std::path::Path) -> bool {
        lowercase_extension(path).is_some_and(|extension| {
            self.archive_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        })
    }

    /// Directory receiving the books produced from `archive`.
    pub fn output_dir_for(&self, archive: &std::path::Path) -> PathBuf {
        match (&self.output_dir, archive.parent()) {
            (Some(dir), _) => dir.clone(),
            (None, Some(parent)) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Path of the final book for `archive` (`X.cbr` -> `X.epub`).
    pub fn final_path_for(&self, archive: &std::path::Path) -> PathBuf {
        self.output_dir_for(archive)
            .join(format!("{}.epub", get_file_stem_lossy(archive)))
    }

    /// Path of the intermediate book for `archive` (`X.cbr` -> `X._base.epub`).
    pub fn intermediate_path_for(&self, archive: &std::path::Path) -> PathBuf {
        self.output_dir_for(archive)
            .join(format!("{}._base.epub", get_file_stem_lossy(archive)))
    }
}

fn is_native(extension: &str) -> bool {
    extension.eq_ignore_ascii_case("cbz")
}

impl HyoshiConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(language) = &self.language {
            if language.trim().is_empty() {
                return Err("Language tag must not be empty".to_string());
            }
        }
        if let Some(extensions) = &self.archive_extensions {
            if extensions.is_empty() {
                return Err("At least one archive extension is required".to_string());
            }
            if let Some(bad) = extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
                return Err(format!(
                    "Invalid archive extension '{}': use the bare extension, e.g. \"cbr\"",
                    bad
                ));
            }
        }
        Ok(())
    }
}
