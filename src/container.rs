//! In-memory model of an output e-book container.
//!
//! The assembler decides *what* goes into a book by filling a [`Container`];
//! the EPUB writer only serializes it. The reading order (spine) is never stored
//! separately: it is derived from the manifest, navigation first, then every
//! document in insertion order.

use uuid::Uuid;

/// Location of the navigation document, always first in the spine.
pub const NAV_HREF: &str = "contents.xhtml";

/// Raw bytes of one embedded image plus its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResource {
    /// Location inside the container, e.g. `images/0001.png`.
    pub href: String,
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

/// A generated XHTML document showing one page (or an informational notice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    index: usize,
    href: String,
    title: String,
    markup: String,
}

impl PageDocument {
    pub fn new(index: usize, href: String, title: String, markup: String) -> Self {
        Self {
            index,
            href,
            title,
            markup,
        }
    }

    /// 1-based display index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Location inside the container, e.g. `text/0001.xhtml`.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Title used for the table of contents.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// One manifest entry, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestItem {
    Navigation,
    Image(ImageResource),
    Document(PageDocument),
}

/// A fully assembled, not yet written, e-book container.
#[derive(Debug, Clone)]
pub struct Container {
    identifier: Uuid,
    title: String,
    language: String,
    cover: Option<ImageResource>,
    manifest: Vec<ManifestItem>,
}

impl Container {
    /// Creates an empty container with a fresh random identifier and the
    /// navigation document already in place.
    pub fn new(title: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            identifier: Uuid::new_v4(),
            title: title.into(),
            language: language.into(),
            cover: None,
            manifest: vec![ManifestItem::Navigation],
        }
    }

    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn cover(&self) -> Option<&ImageResource> {
        self.cover.as_ref()
    }

    pub fn manifest(&self) -> &[ManifestItem] {
        &self.manifest
    }

    /// Attaches the distinguished cover image. The cover never enters the spine.
    pub fn set_cover(&mut self, cover: ImageResource) -> &mut Self {
        self.cover = Some(cover);
        self
    }

    pub fn add_image(&mut self, image: ImageResource) -> &mut Self {
        self.manifest.push(ManifestItem::Image(image));
        self
    }

    pub fn add_document(&mut self, document: PageDocument) -> &mut Self {
        self.manifest.push(ManifestItem::Document(document));
        self
    }

    /// Reading-order documents, excluding navigation.
    pub fn documents(&self) -> impl Iterator<Item = &PageDocument> {
        self.manifest.iter().filter_map(|item| match item {
            ManifestItem::Document(document) => Some(document),
            _ => None,
        })
    }

    /// Embedded page images, excluding the cover.
    pub fn images(&self) -> impl Iterator<Item = &ImageResource> {
        self.manifest.iter().filter_map(|item| match item {
            ManifestItem::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Linear reading order: navigation followed by every document.
    pub fn spine(&self) -> Vec<&str> {
        self.manifest
            .iter()
            .filter_map(|item| match item {
                ManifestItem::Navigation => Some(NAV_HREF),
                ManifestItem::Document(document) => Some(document.href()),
                ManifestItem::Image(_) => None,
            })
            .collect()
    }

    /// Table of contents entries as `(title, href)`; exactly the spine documents.
    pub fn toc(&self) -> Vec<(&str, &str)> {
        self.documents()
            .map(|document| (document.title(), document.href()))
            .collect()
    }
}
