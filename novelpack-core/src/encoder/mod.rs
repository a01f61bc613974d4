//! Encoders for packaging a book model as an archive

mod compose;
mod epub;
mod navigation;
mod writer;
mod xhtml;

pub use compose::{
    compose_chapter, compose_heading, compose_paragraphs, ComposedChapter, MISSING_CHAPTER_HINT,
};
pub use epub::{EpubEncoder, PACKAGE_PATH};
pub use navigation::{
    build_navigation, document_filename, nav_tree, navigation_for_mode, NavPoint, TitleLanguage,
};
pub use writer::{
    entry_order, entry_rank, write_archive, write_archive_to_path, write_atomically, ArchiveWriter,
    CONTAINER_ENTRY, EPUB_MIMETYPE, MIMETYPE_ENTRY, PACKAGE_SUFFIX,
};
pub use xhtml::{escape_html, placeholder_document, DEFAULT_STYLESHEET};

use crate::error::NovelpackError;
use crate::types::Book;
use std::io::Write;

/// Trait for encoding books to output formats
pub trait Encoder: Send + Sync {
    /// Encode a book to a writer
    fn encode(&self, book: &Book, writer: &mut dyn Write) -> Result<(), NovelpackError>;

    /// Format name (e.g., "EPUB")
    fn format_name(&self) -> &str;

    /// File extension for this format
    fn file_extension(&self) -> &str;

    /// MIME type for this format
    fn mime_type(&self) -> &str;
}
