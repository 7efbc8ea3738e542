//! Page discovery for extracted comic archives.
//!
//! Archives arrive with arbitrary layouts: flat page lists, one folder per
//! chapter, or pages buried under a wrapper directory. The collector walks the
//! whole tree, keeps files with an allowed image extension, and orders them
//! naturally by file name.

use std::path::{Path, PathBuf};

use log::debug;
use rayon::prelude::*;
use tokio::fs::read_dir;

use crate::error::{Error, Result};
use crate::path_utils::compare_paths_natural;
use crate::types::PageRef;

/// An ordered, deduplicated, non-empty list of page images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet {
    pages: Vec<PageRef>,
}

impl PageSet {
    /// Recursively discovers page images below `directory`.
    ///
    /// Files without an allowed extension and directories without images are
    /// skipped silently.
    ///
    /// # Returns
    ///
    /// * `Ok(PageSet)` - Pages in natural file name order (ties broken by full path)
    /// * `Err(Error::EmptyPageSet)` - No qualifying image was found
    /// * `Err(Error::Io)` - The directory tree could not be read
    pub async fn discover(directory: &Path) -> Result<Self> {
        let files = Self::collect_files(directory).await?;
        let pages: Vec<PageRef> = files.into_iter().filter_map(PageRef::from_path).collect();
        debug!(
            "Discovered {} page image(s) below {}",
            pages.len(),
            directory.display()
        );
        Self::from_pages(pages).ok_or_else(|| Error::EmptyPageSet(directory.to_path_buf()))
    }

    /// Builds a page set from already known pages, applying the same ordering
    /// and deduplication as [`PageSet::discover`]. Returns `None` when empty.
    pub fn from_pages(mut pages: Vec<PageRef>) -> Option<Self> {
        if pages.is_empty() {
            return None;
        }
        pages.par_sort_by(|a, b| compare_paths_natural(a.path(), b.path()));
        pages.dedup_by(|a, b| a.path() == b.path());
        Some(Self { pages })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageRef] {
        &self.pages
    }

    /// Splits off the first page, which becomes the cover of the final container.
    pub fn split_cover(&self) -> Option<(&PageRef, &[PageRef])> {
        self.pages.split_first()
    }

    /// Walks `directory` depth-first and returns every regular file below it.
    async fn collect_files(directory: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![directory.to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = read_dir(&current).await.map_err(Error::Io)?;
            while let Some(entry) = entries.next_entry().await.map_err(Error::Io)? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }

        Ok(files)
    }
}

impl<'a> IntoIterator for &'a PageSet {
    type Item = &'a PageRef;
    type IntoIter = std::slice::Iter<'a, PageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}
