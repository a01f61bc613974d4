//! Per-chapter paragraph sources

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Machine translation engine that produced a paragraph array
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Baidu,
    Youdao,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Baidu => "baidu",
            Engine::Youdao => "youdao",
        }
    }

    /// Parse an engine name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "baidu" => Some(Engine::Baidu),
            "youdao" => Some(Engine::Youdao),
            _ => None,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One paragraph source of a chapter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Source {
    /// Original-language text
    Original,

    /// Output of a translation engine
    Translation(Engine),
}

impl Source {
    /// Parse a source name: "original" or an engine name
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("original") {
            Some(Source::Original)
        } else {
            Engine::from_name(name).map(Source::Translation)
        }
    }

    pub fn is_original(&self) -> bool {
        matches!(self, Source::Original)
    }
}

impl TryFrom<String> for Source {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Source::from_name(&value)
            .ok_or_else(|| ModelError::InvalidMode(format!("unknown source '{}'", value)))
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Original => f.write_str("original"),
            Source::Translation(engine) => write!(f, "{}", engine),
        }
    }
}

/// Paragraph arrays available for one chapter.
///
/// Arrays are index-aligned by position but may differ in length when a
/// chapter was only partially translated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterSources {
    /// Original-language paragraphs; empty means the chapter was never fetched
    #[serde(default)]
    pub original: Vec<String>,

    /// Translated paragraphs keyed by engine
    #[serde(default)]
    pub translations: BTreeMap<Engine, Vec<String>>,
}

impl ChapterSources {
    /// Create sources from the original paragraphs
    pub fn new(original: Vec<String>) -> Self {
        Self {
            original,
            translations: BTreeMap::new(),
        }
    }

    /// Attach a translation
    pub fn with_translation(mut self, engine: Engine, paragraphs: Vec<String>) -> Self {
        self.translations.insert(engine, paragraphs);
        self
    }

    /// Paragraphs for a source, `None` when that source is absent
    pub fn paragraphs(&self, source: Source) -> Option<&[String]> {
        match source {
            Source::Original if self.original.is_empty() => None,
            Source::Original => Some(&self.original),
            Source::Translation(engine) => self.translations.get(&engine).map(Vec::as_slice),
        }
    }

    /// Whether the original paragraphs are present
    pub fn has_original(&self) -> bool {
        !self.original.is_empty()
    }
}
