//! Novelpack Core Library
//!
//! Reads possibly-malformed EPUB archives into an in-memory document tree
//! and packages web novels (original text plus machine translations) as
//! EPUB archives. The read path lives in [`decoder`], the write path in
//! [`encoder`]; both share the plain data types in [`types`].

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod types;

pub use decoder::{
    resolve_manifest, DocumentTree, ExtractOptions, ExtractStrategy, Extractor, ManifestInfo,
    StrategyKind,
};
pub use encoder::{ArchiveWriter, Encoder, EpubEncoder};
pub use error::{ArchiveError, ModelError, NovelpackError, Result};
pub use types::{
    Block, Book, ChapterSources, CompositionMode, Engine, Localized, Metadata, NavigationEntry,
    OutputResource, ResourceSet, Source, TocItem,
};
