//! The main Book type - the root of the write-path model

use super::{ChapterSources, Localized, Metadata, TocItem};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything needed to package one novel.
///
/// Chapters are keyed by the chapter IDs referenced from the table of
/// contents; TOC rows whose chapter is missing here are packaged with a
/// placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Book metadata (title, authors, etc.)
    pub metadata: Metadata,

    /// Table of contents in reading order
    #[serde(default)]
    pub toc: Vec<TocItem>,

    /// Fetched chapters by chapter ID
    #[serde(default)]
    pub chapters: HashMap<String, ChapterSources>,
}

impl Book {
    /// Create a new book with the given original title
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_metadata(Metadata::new(Localized::new(title)))
    }

    /// Create a book with existing metadata
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self {
            metadata,
            toc: Vec::new(),
            chapters: HashMap::new(),
        }
    }

    /// Append a TOC row
    pub fn add_toc_item(&mut self, item: TocItem) {
        self.toc.push(item);
    }

    /// Register the sources of a chapter
    pub fn add_chapter(&mut self, chapter_id: impl Into<String>, sources: ChapterSources) {
        self.chapters.insert(chapter_id.into(), sources);
    }

    /// Look up the sources for a TOC row
    pub fn chapter_for(&self, item: &TocItem) -> Option<&ChapterSources> {
        item.chapter_id
            .as_ref()
            .and_then(|id| self.chapters.get(id))
    }

    /// Number of TOC rows that carry a chapter
    pub fn episode_count(&self) -> usize {
        self.toc.iter().filter(|t| t.chapter_id.is_some()).count()
    }

    /// Parse a book model from JSON
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }
}
