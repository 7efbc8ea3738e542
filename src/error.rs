//! Custom error types and result handling for Hyoshi operations.
//!
//! All fallible operations return a [`Result<T>`], a type alias for
//! `std::result::Result<T, Error>`. The domain variants mirror how a failure is
//! treated by the batch: configuration problems are fatal to the whole run,
//! everything else is scoped to a single archive.
//!
use std::path::PathBuf;

/// Type alias for Results with Hyoshi errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Hyoshi operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// ZIP archive errors (native `.cbz` extraction)
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// EPUB generation errors
    #[error(transparent)]
    Epub(#[from] epub_builder::Error),
    /// Async task join errors
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    ConfigBuilder(#[from] crate::hyoshi::HyoshiConfigBuilderError),
    /// The extractor could not unpack the archive (tool missing, corrupt or unsupported archive).
    #[error("Extraction of '{}' failed{}", .archive.display(), diagnostic_suffix(.diagnostic))]
    ExtractionFailed { archive: PathBuf, diagnostic: String },
    /// No qualifying page images were found. Treated as a skip, not a crash.
    #[error("No images found in '{}'", .0.display())]
    EmptyPageSet(PathBuf),
    /// A source image could not be read while assembling a container.
    #[error("Failed to read image '{}': {}", .path.display(), .source)]
    ImageReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Invalid startup configuration, e.g. a missing external tool.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Error for invalid file or directory paths
    #[error("The given path '{}' is invalid: {}", .0.display(), .1)]
    InvalidPath(PathBuf, String),
    #[error("Asynchronous task failed: {0}")]
    AsyncTaskError(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether this error means "nothing to convert" rather than a real failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, Error::EmptyPageSet(_))
    }

    /// Whether this error must abort the whole run instead of a single archive.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::ConfigBuilder(_))
    }
}

/// Tool output goes on its own line; nothing is appended when the tool was silent.
fn diagnostic_suffix(diagnostic: &str) -> String {
    let diagnostic = diagnostic.trim();
    if diagnostic.is_empty() {
        String::new()
    } else {
        format!(":\n{}", diagnostic)
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
