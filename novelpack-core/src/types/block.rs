//! Rendered content blocks produced by the compositor

use serde::{Deserialize, Serialize};

/// A single rendered unit of a chapter document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Block {
    /// Chapter heading
    Heading(String),

    /// Primary paragraph text
    Paragraph(String),

    /// Annotation line shown beneath the primary text (dimmed)
    Secondary(String),
}

impl Block {
    /// Create a paragraph block
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(text.into())
    }

    /// Create a secondary (annotation) block
    pub fn secondary(text: impl Into<String>) -> Self {
        Block::Secondary(text.into())
    }

    /// Text carried by this block
    pub fn text(&self) -> &str {
        match self {
            Block::Heading(s) | Block::Paragraph(s) | Block::Secondary(s) => s,
        }
    }
}
