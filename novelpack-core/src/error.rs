//! Error types for Novelpack Core

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using NovelpackError
pub type Result<T> = std::result::Result<T, NovelpackError>;

/// Top-level error type for all Novelpack operations
#[derive(Debug, Error)]
pub enum NovelpackError {
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading or writing an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Every extraction strategy failed
    #[error("Archive unreadable: {}", FailureList(.failures))]
    Unreadable { failures: Vec<StrategyFailure> },

    /// Decompressed output exceeded the configured ceiling
    #[error("Decompressed size limit exceeded: {attempted} bytes > {limit} bytes")]
    LimitExceeded { limit: u64, attempted: u64 },

    #[error("Container descriptor missing: META-INF/container.xml")]
    ContainerMissing,

    #[error("Invalid container descriptor: {0}")]
    InvalidContainer(String),

    #[error("Package document missing: {0}")]
    ManifestMissing(String),

    #[error("Invalid package document: {0}")]
    InvalidManifest(String),

    #[error("Bad archive entry: {0}")]
    Entry(String),

    #[error("ZIP error: {0}")]
    Zip(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Zip(err.to_string())
    }
}

/// One strategy's reason for giving up on an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyFailure {
    /// Strategy name (e.g. "central-directory")
    pub strategy: String,

    /// Rendered failure reason
    pub reason: String,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

struct FailureList<'a>(&'a [StrategyFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no extraction strategy configured");
        }
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

/// Errors in caller-supplied book models and options
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid composition mode: {0}")]
    InvalidMode(String),

    #[error("Invalid extraction strategy: {0}")]
    InvalidStrategy(String),

    #[error("Invalid book model: {0}")]
    Json(#[from] serde_json::Error),
}
