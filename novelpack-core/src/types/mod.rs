//! Core types for the Novelpack book model

mod block;
mod book;
mod chapter;
mod metadata;
mod mode;
mod resource;
mod toc;

pub use block::Block;
pub use book::Book;
pub use chapter::{ChapterSources, Engine, Source};
pub use metadata::{Author, Localized, Metadata};
pub use mode::CompositionMode;
pub use resource::{OutputResource, ResourceSet};
pub use toc::{NavigationEntry, TocItem};
