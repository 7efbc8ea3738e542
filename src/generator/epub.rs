use std::path::{Path, PathBuf};

use epub_builder::{EpubBuilder, EpubContent, EpubVersion, ReferenceType, ZipLibrary};
use log::debug;
use tokio::task::spawn_blocking;

use crate::container::{Container, ManifestItem, NAV_HREF};
use crate::error::{Error, Result};
use crate::generator::page::navigation_markup;
use crate::path_utils::path_to_string_lossy;

const STYLESHEET: &[u8] = include_bytes!("../../templates/stylesheet.css");
const GENERATOR: &str = concat!("hyoshi ", env!("CARGO_PKG_VERSION"));

/// Serializes a [`Container`] into an EPUB 3 file using `epub-builder`.
///
/// The book is first generated into a temporary file next to the destination
/// and only renamed onto the final path once generation succeeded, so a
/// failure never leaves a truncated `.epub` under the final name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpubWriter;

impl EpubWriter {
    /// Writes `container` to `output_path` on a blocking worker thread.
    pub async fn write(&self, container: Container, output_path: &Path) -> Result<()> {
        let output_path = output_path.to_path_buf();
        spawn_blocking(move || Self::write_blocking(&container, &output_path))
            .await
            .map_err(|e| Error::AsyncTaskError(e.to_string()))?
    }

    /// Synchronous variant of [`write`](EpubWriter::write).
    pub fn write_blocking(container: &Container, output_path: &Path) -> Result<()> {
        let epub = Self::builder_for(container)?;

        let directory = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut staging = tempfile::Builder::new()
            .prefix(".hyoshi-")
            .suffix(".part")
            .tempfile_in(&directory)
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create staging file in '{}': {}",
                        path_to_string_lossy(&directory),
                        e
                    ),
                ))
            })?;

        epub.generate(staging.as_file_mut())?;
        staging.persist(output_path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.error.kind(),
                format!(
                    "Failed to create EPUB file '{}': {}",
                    path_to_string_lossy(output_path),
                    e.error
                ),
            ))
        })?;

        debug!(
            "Wrote {} ({} document(s), cover: {})",
            output_path.display(),
            container.documents().count(),
            container.cover().is_some()
        );
        Ok(())
    }

    /// Feeds the container's metadata, cover, images and documents to a builder
    /// in manifest order.
    fn builder_for(container: &Container) -> Result<EpubBuilder<ZipLibrary>> {
        let mut epub = EpubBuilder::new(ZipLibrary::new()?)?;

        epub.epub_version(EpubVersion::V30);
        epub.set_uuid(container.identifier());
        epub.metadata("title", container.title())?;
        epub.metadata("generator", GENERATOR)?;
        epub.set_languages(vec![container.language().to_string()]);
        epub.stylesheet(STYLESHEET)?;

        if let Some(cover) = container.cover() {
            epub.add_cover_image(&cover.href, cover.bytes.as_slice(), cover.media_type)?;
        }

        let toc = container.toc();
        let mut body_started = false;
        for item in container.manifest() {
            match item {
                // Untitled, so it leads the spine without becoming a TOC entry.
                ManifestItem::Navigation => {
                    let markup = navigation_markup(container.title(), &toc);
                    epub.add_content(EpubContent::new(NAV_HREF, markup.as_bytes()))?;
                }
                ManifestItem::Image(image) => {
                    epub.add_resource(&image.href, image.bytes.as_slice(), image.media_type)?;
                }
                ManifestItem::Document(document) => {
                    let mut content =
                        EpubContent::new(document.href(), document.markup().as_bytes())
                            .title(document.title());
                    // Only the first document marks where the body starts.
                    if !body_started {
                        content = content.reftype(ReferenceType::Text);
                        body_started = true;
                    }
                    epub.add_content(content)?;
                }
            }
        }

        Ok(epub)
    }
}
