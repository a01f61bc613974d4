//! EPUB 2 package encoder

use super::compose::compose_chapter;
use super::navigation::{nav_tree, navigation_for_mode, TitleLanguage};
use super::writer::{write_archive, write_atomically, ArchiveWriter, CONTAINER_ENTRY, EPUB_MIMETYPE, MIMETYPE_ENTRY};
use super::xhtml::{
    chapter_document, container_xml, ncx_document, package_document, PackageItem,
    PackageMetadata, DEFAULT_STYLESHEET,
};
use crate::error::{ArchiveError, NovelpackError};
use crate::types::{Book, CompositionMode, NavigationEntry, OutputResource, ResourceSet};
use std::io::{Seek, Write};
use std::path::Path;

/// Archive path of the package document
pub const PACKAGE_PATH: &str = "OEBPS/content.opf";

const NCX_PATH: &str = "OEBPS/toc.ncx";
const STYLESHEET_PATH: &str = "OEBPS/Styles/style.css";
const TEXT_DIR: &str = "OEBPS/Text/";

/// Packages a [`Book`] as an EPUB 2 archive under one composition mode.
///
/// Navigation is NCX only. The manifest's content documents are exactly
/// the episodes, in navigation order.
#[derive(Debug, Clone)]
pub struct EpubEncoder {
    mode: CompositionMode,
    stylesheet: String,
}

impl EpubEncoder {
    pub fn new(mode: CompositionMode) -> Self {
        Self {
            mode,
            stylesheet: DEFAULT_STYLESHEET.to_string(),
        }
    }

    /// Replace the default stylesheet
    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheet = css.into();
        self
    }

    pub fn mode(&self) -> CompositionMode {
        self.mode
    }

    /// Navigation entries for `book` under this encoder's mode
    pub fn navigation(&self, book: &Book) -> Vec<NavigationEntry> {
        navigation_for_mode(&book.toc, &self.mode)
    }

    /// Render every file of the package
    pub fn resources(&self, book: &Book) -> ResourceSet {
        let metadata = &book.metadata;
        let titles = TitleLanguage::for_mode(&self.mode);
        let language = if self.mode.uses_translated_language() {
            metadata.translated_language.as_str()
        } else {
            metadata.original_language.as_str()
        };
        let title = titles.select(&metadata.title);
        let navigation = self.navigation(book);

        let mut resources = ResourceSet::new();
        resources.insert(OutputResource::new(MIMETYPE_ENTRY, EPUB_MIMETYPE));
        resources.insert(OutputResource::new(CONTAINER_ENTRY, container_xml(PACKAGE_PATH)));
        resources.insert(OutputResource::new(STYLESHEET_PATH, self.stylesheet.as_str()));

        let mut items = vec![
            PackageItem {
                id: "ncx".to_string(),
                href: "toc.ncx".to_string(),
                media_type: "application/x-dtbncx+xml",
                in_spine: false,
            },
            PackageItem {
                id: "style".to_string(),
                href: "Styles/style.css".to_string(),
                media_type: "text/css",
                in_spine: false,
            },
        ];

        // TOC rows and navigation entries are index-aligned
        for (item, entry) in book.toc.iter().zip(&navigation) {
            let Some(document) = &entry.document else {
                continue;
            };
            let chapter = compose_chapter(item, book.chapter_for(item), &self.mode);
            let xhtml = chapter_document(&chapter.title, language, "../Styles/style.css", &chapter.blocks);

            resources.insert(OutputResource::new(format!("{}{}", TEXT_DIR, document), xhtml));
            items.push(PackageItem {
                id: document.trim_end_matches(".xhtml").to_string(),
                href: format!("Text/{}", document),
                media_type: "application/xhtml+xml",
                in_spine: true,
            });
        }

        let package_metadata = PackageMetadata {
            identifier: &metadata.identifier,
            title,
            language,
            creators: metadata.authors.iter().map(|a| a.name.as_str()).collect(),
            description: titles.select(&metadata.introduction),
            modified: metadata
                .modified
                .or_else(|| book.toc.iter().filter_map(|t| t.created_at).max()),
        };
        resources.insert(OutputResource::new(
            PACKAGE_PATH,
            package_document(&package_metadata, &items, "ncx"),
        ));
        resources.insert(OutputResource::new(
            NCX_PATH,
            ncx_document(&metadata.identifier, title, &nav_tree(&navigation), "Text/"),
        ));

        tracing::info!(
            "Packaged '{}' with {} episodes in mode {}",
            title,
            items.len() - 2,
            self.mode
        );
        resources
    }

    /// Write the package as an archive into `sink`
    pub fn encode_to<W: Write + Seek>(&self, book: &Book, sink: W) -> Result<W, ArchiveError> {
        let mut writer = ArchiveWriter::new();
        writer.extend(self.resources(book));
        writer.finish(sink)
    }

    /// Archive bytes of the package
    pub fn to_bytes(&self, book: &Book) -> Result<Vec<u8>, ArchiveError> {
        write_archive(&self.resources(book))
    }

    /// Write the package as an archive file, replacing `path` only on success
    pub fn write_to_path(&self, book: &Book, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
        write_atomically(path, |file| {
            self.encode_to(book, file)?;
            Ok(())
        })
    }
}

impl Default for EpubEncoder {
    fn default() -> Self {
        Self::new(CompositionMode::default())
    }
}

impl super::Encoder for EpubEncoder {
    fn encode(&self, book: &Book, writer: &mut dyn Write) -> Result<(), NovelpackError> {
        let bytes = self.to_bytes(book)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    fn format_name(&self) -> &str {
        "EPUB"
    }

    fn file_extension(&self) -> &str {
        "epub"
    }

    fn mime_type(&self) -> &str {
        EPUB_MIMETYPE
    }
}
