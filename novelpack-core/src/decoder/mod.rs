//! Decoders for reading EPUB archives into a document tree
//!
//! Real-world archives are often subtly non-conformant (entries out of
//! order, missing directory markers, damaged central directory). Instead of
//! one clever decoder the [`Extractor`] tries an ordered list of
//! [`ExtractStrategy`] implementations and keeps the first tree that comes
//! out whole.

mod central;
mod guard;
mod layout;
mod manifest;
mod package;
mod stream;
mod tree;

pub use central::CentralDirectoryStrategy;
pub use guard::{BombGuard, DEFAULT_MAX_DECOMPRESSED_BYTES, GUARD_CHUNK_SIZE};
pub use layout::{leading_entries, EntryHeader};
pub use manifest::{
    resolve_manifest, ManifestInfo, ManifestItem, CONTAINER_PATH, CONTENT_MEDIA_TYPES,
};
pub use package::{
    for_each_document, read_documents, repack, validate_archive, ContentDocument,
    ValidationReport,
};
pub use stream::LocalHeaderStrategy;
pub use tree::{normalize_entry_name, DocumentTree};

use crate::error::{ArchiveError, ModelError, StrategyFailure};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One way of decoding archive bytes into a [`DocumentTree`]
pub trait ExtractStrategy: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Decode `bytes`, feeding every decompressed chunk to `guard`
    fn extract(&self, bytes: &[u8], guard: &mut BombGuard) -> Result<DocumentTree, ArchiveError>;
}

/// Built-in extraction strategies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Strict: trust the ZIP central directory
    Central,

    /// Lenient: walk local file headers front to back
    Stream,
}

impl StrategyKind {
    /// Instantiate the strategy
    pub fn strategy(&self) -> Box<dyn ExtractStrategy> {
        match self {
            StrategyKind::Central => Box::new(CentralDirectoryStrategy),
            StrategyKind::Stream => Box::new(LocalHeaderStrategy),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "central" | "central-directory" | "strict" => Ok(StrategyKind::Central),
            "stream" | "local-headers" | "lenient" => Ok(StrategyKind::Stream),
            _ => Err(ModelError::InvalidStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Central => f.write_str("central"),
            StrategyKind::Stream => f.write_str("stream"),
        }
    }
}

/// Read-path configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Ceiling for decompressed bytes per extraction attempt
    #[serde(default = "default_max_decompressed_bytes")]
    pub max_decompressed_bytes: u64,

    /// Strategies in the order they are tried
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,
}

fn default_max_decompressed_bytes() -> u64 {
    DEFAULT_MAX_DECOMPRESSED_BYTES
}

fn default_strategies() -> Vec<StrategyKind> {
    vec![StrategyKind::Central, StrategyKind::Stream]
}

impl ExtractOptions {
    /// Set the decompressed size ceiling
    pub fn with_max_decompressed_bytes(mut self, limit: u64) -> Self {
        self.max_decompressed_bytes = limit;
        self
    }

    /// Replace the strategy list
    pub fn with_strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.strategies = strategies;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_decompressed_bytes: default_max_decompressed_bytes(),
            strategies: default_strategies(),
        }
    }
}

/// Result of a successful extraction
#[derive(Debug)]
pub struct Extraction {
    /// Extracted files
    pub tree: DocumentTree,

    /// Name of the strategy that succeeded
    pub strategy: String,

    /// Strategies that failed before it
    pub failures: Vec<StrategyFailure>,
}

/// Runs extraction strategies in order until one succeeds
pub struct Extractor {
    max_decompressed_bytes: u64,
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl Extractor {
    /// Build an extractor from options
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            max_decompressed_bytes: options.max_decompressed_bytes,
            strategies: options.strategies.iter().map(|k| k.strategy()).collect(),
        }
    }

    /// Build an extractor from arbitrary strategies
    pub fn with_strategies(
        max_decompressed_bytes: u64,
        strategies: Vec<Box<dyn ExtractStrategy>>,
    ) -> Self {
        Self {
            max_decompressed_bytes,
            strategies,
        }
    }

    /// Strategy names in the order they are tried
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Decode `bytes` into a document tree
    pub fn extract(&self, bytes: &[u8]) -> Result<DocumentTree, ArchiveError> {
        self.extract_reporting(bytes).map(|extraction| extraction.tree)
    }

    /// Decode `bytes`, also reporting which strategy succeeded
    pub fn extract_reporting(&self, bytes: &[u8]) -> Result<Extraction, ArchiveError> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            // Fresh budget per attempt
            let mut guard = BombGuard::new(self.max_decompressed_bytes);
            tracing::debug!("Trying extraction strategy '{}'", strategy.name());

            match strategy.extract(bytes, &mut guard) {
                Ok(tree) => {
                    tracing::info!(
                        "Extracted {} files ({} bytes) with strategy '{}'",
                        tree.file_count(),
                        guard.total(),
                        strategy.name()
                    );
                    return Ok(Extraction {
                        tree,
                        strategy: strategy.name().to_string(),
                        failures,
                    });
                }
                Err(err) => {
                    tracing::debug!("Strategy '{}' failed: {}", strategy.name(), err);
                    failures.push(StrategyFailure {
                        strategy: strategy.name().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Err(ArchiveError::Unreadable { failures })
    }

    /// Read a file from disk and decode it
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<DocumentTree, ArchiveError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.extract(&bytes)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&ExtractOptions::default())
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("max_decompressed_bytes", &self.max_decompressed_bytes)
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
