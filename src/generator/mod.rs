//! Container generation: per-page documents, the two-phase assembler, and the
//! EPUB writer.
//!
//! Assembly and writing are separate steps. The [`ContainerAssembler`] decides
//! the structure of a book and reads every image up front; the [`EpubWriter`]
//! only serializes the finished [`Container`](crate::container::Container).

pub mod assembler;
pub mod epub;
pub mod page;

pub use assembler::ContainerAssembler;
pub use epub::EpubWriter;
pub use page::PageDocumentBuilder;
