use std::path::{Path, PathBuf};

use log::debug;

use crate::collector::PageSet;
use crate::container::{Container, ImageResource};
use crate::error::{Error, Result};
use crate::generator::page::{PageDocumentBuilder, image_href};
use crate::types::PageRef;

/// Assembles the two container phases of a conversion.
///
/// - [`assemble_full`](ContainerAssembler::assemble_full): every page, no cover.
/// - [`assemble_final`](ContainerAssembler::assemble_final): first page promoted to
///   cover, remaining pages renumbered from 1.
///
/// Every call returns a fresh [`Container`] with its own random identifier. Any
/// image that cannot be read aborts the phase with [`Error::ImageReadFailed`];
/// nothing is written until the caller hands the container to a writer.
#[derive(Debug, Clone)]
pub struct ContainerAssembler {
    language: String,
    documents: PageDocumentBuilder,
}

impl ContainerAssembler {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            documents: PageDocumentBuilder,
        }
    }

    /// Builds a container holding one document and one image per page, in
    /// page set order, numbered `1..=N`. No cover is set.
    pub async fn assemble_full(&self, title: &str, pages: &PageSet) -> Result<Container> {
        self.assemble(title, pages.pages(), None).await
    }

    /// Builds a container whose cover is the first page of the set and whose
    /// reading order holds the remaining pages renumbered `1..=N-1`.
    ///
    /// A single-page set yields one informational document so the reading
    /// order is never empty.
    pub async fn assemble_final(&self, title: &str, pages: &PageSet) -> Result<Container> {
        let (cover, remaining) = pages
            .split_cover()
            .ok_or_else(|| Error::EmptyPageSet(PathBuf::from(title)))?;
        self.assemble(title, remaining, Some(cover)).await
    }

    async fn assemble(
        &self,
        title: &str,
        pages: &[PageRef],
        cover: Option<&PageRef>,
    ) -> Result<Container> {
        let mut container = Container::new(title, self.language.as_str());

        if let Some(cover) = cover {
            let bytes = read_image(cover.path()).await?;
            container.set_cover(ImageResource {
                href: format!("images/cover.{}", cover.extension()),
                bytes,
                media_type: cover.media_type(),
            });
        }

        for (position, page) in pages.iter().enumerate() {
            let index = position + 1;
            let href = image_href(index, page.extension());
            let bytes = read_image(page.path()).await?;
            debug!("Page {} <- {}", index, page.path().display());

            container.add_image(ImageResource {
                href: href.clone(),
                bytes,
                media_type: page.media_type(),
            });
            container.add_document(self.documents.build(index, &href));
        }

        if container.documents().next().is_none() {
            container.add_document(self.documents.cover_only_notice());
        }

        Ok(container)
    }
}

async fn read_image(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|source| Error::ImageReadFailed {
            path: path.to_path_buf(),
            source,
        })
}
