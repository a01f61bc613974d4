//! Book metadata types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text available in the original language and optionally translated
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Localized {
    /// Original-language text
    pub original: String,

    /// Translated text, if any
    #[serde(default)]
    pub translated: Option<String>,
}

impl Localized {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            translated: None,
        }
    }

    /// Set the translated text
    pub fn with_translation(mut self, translated: impl Into<String>) -> Self {
        self.translated = Some(translated.into());
        self
    }

    /// Translated text, falling back to the original
    pub fn translated_or_original(&self) -> &str {
        self.translated.as_deref().unwrap_or(&self.original)
    }
}

/// A credited author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Book metadata written into the package document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    /// Unique identifier (e.g. "<provider>.<novel id>")
    pub identifier: String,

    /// Book title
    pub title: Localized,

    /// Authors/creators
    #[serde(default)]
    pub authors: Vec<Author>,

    /// Book description/summary
    #[serde(default)]
    pub introduction: Localized,

    /// Language code of the original text
    #[serde(default = "default_original_language")]
    pub original_language: String,

    /// Language code of the translations
    #[serde(default = "default_translated_language")]
    pub translated_language: String,

    /// Last modification time written into the package
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

fn default_original_language() -> String {
    "ja".to_string()
}

fn default_translated_language() -> String {
    "zh".to_string()
}

impl Metadata {
    /// Create new metadata with required fields
    pub fn new(title: Localized) -> Self {
        Self {
            identifier: uuid::Uuid::new_v4().to_string(),
            title,
            authors: Vec::new(),
            introduction: Localized::default(),
            original_language: default_original_language(),
            translated_language: default_translated_language(),
            modified: None,
        }
    }

    /// Set the identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Add an author
    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.authors.push(Author::new(name));
        self
    }

    /// Set the introduction
    pub fn with_introduction(mut self, introduction: Localized) -> Self {
        self.introduction = introduction;
        self
    }
}
