//! Table of contents types

use super::Localized;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single row of the source table of contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TocItem {
    /// Display title
    pub title: Localized,

    /// Chapter ID; `None` for structural rows such as volume dividers
    #[serde(default)]
    pub chapter_id: Option<String>,

    /// When the chapter was published
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TocItem {
    /// Create a chapter row
    pub fn chapter(title: Localized, chapter_id: impl Into<String>) -> Self {
        Self {
            title,
            chapter_id: Some(chapter_id.into()),
            created_at: None,
        }
    }

    /// Create a structural row without a chapter
    pub fn divider(title: Localized) -> Self {
        Self {
            title,
            chapter_id: None,
            created_at: None,
        }
    }

    /// Set the creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// One row of the generated navigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigationEntry {
    /// Content document filename; `None` for structural rows
    pub document: Option<String>,

    /// Display title
    pub title: String,
}
