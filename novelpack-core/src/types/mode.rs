//! Composition modes: how paragraph sources merge into a chapter

use super::{Engine, Source};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selected strategy for merging original and translated paragraphs.
///
/// Fixed for a whole packaging call. The textual form accepted by
/// [`FromStr`] and used for serde is:
///
/// | text                         | mode                                   |
/// |------------------------------|----------------------------------------|
/// | `original`, `baidu`, `youdao`| `SourceOnly(..)`                       |
/// | `sequential:<source>`        | `Sequential(..)`                       |
/// | `interleaved:<a>`            | `Interleaved(a, Source::Original)`     |
/// | `interleaved:<a>:<b>`        | `Interleaved(a, b)`                    |
/// | `trilingual`                 | `Trilingual`                           |
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum CompositionMode {
    /// One source verbatim, original title
    SourceOnly(Source),

    /// One source verbatim, translated title when available
    Sequential(Source),

    /// Line of `a` followed by the matching line of `b` as an annotation
    Interleaved(Source, Source),

    /// Youdao line, Baidu line, then the original as an annotation
    Trilingual,
}

impl CompositionMode {
    /// Translation engines rendered by trilingual mode, in output order
    pub const TRILINGUAL_ORDER: [Engine; 2] = [Engine::Youdao, Engine::Baidu];

    /// Whether the packaged book is labelled with the translated language
    pub fn uses_translated_language(&self) -> bool {
        !matches!(self, CompositionMode::SourceOnly(Source::Original))
    }
}

impl Default for CompositionMode {
    fn default() -> Self {
        CompositionMode::SourceOnly(Source::Original)
    }
}

impl FromStr for CompositionMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidMode(s.to_string());
        let source = |name: &str| Source::from_name(name).ok_or_else(|| invalid());

        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            ["trilingual"] => Ok(CompositionMode::Trilingual),
            ["sequential", which] => Ok(CompositionMode::Sequential(source(*which)?)),
            ["interleaved", a] => Ok(CompositionMode::Interleaved(source(*a)?, Source::Original)),
            ["interleaved", a, b] => Ok(CompositionMode::Interleaved(source(*a)?, source(*b)?)),
            ["source", which] | [which] => Ok(CompositionMode::SourceOnly(source(*which)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionMode::SourceOnly(source) => write!(f, "{}", source),
            CompositionMode::Sequential(source) => write!(f, "sequential:{}", source),
            CompositionMode::Interleaved(a, Source::Original) => write!(f, "interleaved:{}", a),
            CompositionMode::Interleaved(a, b) => write!(f, "interleaved:{}:{}", a, b),
            CompositionMode::Trilingual => f.write_str("trilingual"),
        }
    }
}

impl TryFrom<String> for CompositionMode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompositionMode> for String {
    fn from(mode: CompositionMode) -> Self {
        mode.to_string()
    }
}
