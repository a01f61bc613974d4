//! Ordered archive writer
//!
//! Readers sniff the format from the first bytes of the file, so entry order
//! is part of the contract: `mimetype` (stored, uncompressed) comes first,
//! then the container descriptor, then package documents, then everything
//! else by name.

use crate::error::ArchiveError;
use crate::types::{OutputResource, ResourceSet};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::CompressionMethod;

/// Name of the format-sniffing entry
pub const MIMETYPE_ENTRY: &str = "mimetype";

/// Content of the `mimetype` entry
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Archive path of the container descriptor
pub const CONTAINER_ENTRY: &str = "META-INF/container.xml";

/// Conventional suffix of package documents
pub const PACKAGE_SUFFIX: &str = ".opf";

/// Sort rank of an entry; higher ranks are written first
pub fn entry_rank(name: &str) -> u8 {
    let name = name.trim_start_matches('/');
    if name == MIMETYPE_ENTRY {
        3
    } else if name == CONTAINER_ENTRY {
        2
    } else if name.ends_with(PACKAGE_SUFFIX) {
        1
    } else {
        0
    }
}

/// Archive entry order: rank descending, then name ascending
pub fn entry_order(a: &str, b: &str) -> Ordering {
    entry_rank(b)
        .cmp(&entry_rank(a))
        .then_with(|| a.cmp(b))
}

/// Collects output resources and writes them as one archive.
///
/// `finish` consumes the writer, so nothing can be added once the archive
/// has been finalized. Adding a name twice keeps the later content.
#[derive(Debug, Default)]
pub struct ArchiveWriter {
    resources: BTreeMap<String, Vec<u8>>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a resource for writing
    pub fn add(&mut self, resource: OutputResource) -> &mut Self {
        let name = resource.name.trim_start_matches('/').to_string();
        if self.resources.insert(name, resource.bytes).is_some() {
            tracing::debug!("Replacing queued entry {}", resource.name);
        }
        self
    }

    /// Queue every resource of a set
    pub fn extend(&mut self, resources: ResourceSet) -> &mut Self {
        for resource in resources {
            self.add(resource);
        }
        self
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Entry names in the order they will be written
    pub fn entry_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        names.sort_by(|a, b| entry_order(a, b));
        names
    }

    /// Write every queued entry to `sink` and return it
    pub fn finish<W: Write + Seek>(self, sink: W) -> Result<W, ArchiveError> {
        let mut entries: Vec<(String, Vec<u8>)> = self.resources.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| entry_order(a, b));

        let stored = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(zip::DateTime::default());
        let deflated = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let mut zip = zip::ZipWriter::new(sink);
        for (name, bytes) in &entries {
            let options = if name == MIMETYPE_ENTRY { stored } else { deflated };
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        let sink = zip.finish()?;

        tracing::info!("Wrote archive with {} entries", entries.len());
        Ok(sink)
    }
}

/// Serialize a resource set into archive bytes
pub fn write_archive(resources: &ResourceSet) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ArchiveWriter::new();
    for (name, bytes) in resources.iter() {
        writer.add(OutputResource::new(name, bytes));
    }
    Ok(writer.finish(Cursor::new(Vec::new()))?.into_inner())
}

/// Write a file at `path` all at once.
///
/// `write` fills a temporary file next to `path`, which is renamed over the
/// target only when it succeeds. On error the temporary file is removed and
/// whatever was at `path` before stays untouched.
pub fn write_atomically<F, E>(path: impl AsRef<Path>, write: F) -> Result<(), E>
where
    F: FnOnce(&mut File) -> Result<(), E>,
    E: From<std::io::Error>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| E::from(err.error))?;
    Ok(())
}

/// Serialize a resource set straight into a file
pub fn write_archive_to_path(
    resources: &ResourceSet,
    path: impl AsRef<Path>,
) -> Result<(), ArchiveError> {
    write_atomically(path, |file| {
        let mut writer = ArchiveWriter::new();
        writer.extend(resources.clone());
        writer.finish(file)?;
        Ok(())
    })
}
