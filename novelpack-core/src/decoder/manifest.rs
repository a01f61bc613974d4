//! Container descriptor and package manifest resolution

use super::{normalize_entry_name, DocumentTree};
use crate::error::ArchiveError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

/// Fixed location of the container descriptor
pub const CONTAINER_PATH: &str = "/META-INF/container.xml";

/// Media types that mark a manifest item as a content document
pub const CONTENT_MEDIA_TYPES: [&str; 2] = ["application/xhtml+xml", "text/html"];

/// One `<item>` of the package manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestItem {
    pub id: Option<String>,

    /// Absolute path inside the archive
    pub path: String,

    pub media_type: String,
}

impl ManifestItem {
    /// Whether this item is a renderable content document
    pub fn is_content_document(&self) -> bool {
        CONTENT_MEDIA_TYPES.contains(&self.media_type.as_str())
    }
}

/// Resolved package layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestInfo {
    /// Absolute path of the package document
    pub package_path: String,

    /// Directory manifest hrefs are relative to ("/" for the archive root)
    pub manifest_dir: String,

    /// Every manifest item in declaration order
    pub items: Vec<ManifestItem>,

    /// Content document paths in declaration (reading) order
    pub content_documents: Vec<String>,
}

/// Resolve the content documents of an extracted archive
pub fn resolve_manifest(tree: &DocumentTree) -> Result<ManifestInfo, ArchiveError> {
    let container = tree
        .read_to_string(CONTAINER_PATH)
        .ok_or(ArchiveError::ContainerMissing)?;
    let rootfile = parse_rootfile(&container)?;
    let package_path = normalize_entry_name(&rootfile)
        .map_err(|e| ArchiveError::InvalidContainer(e.to_string()))?;

    let package = tree
        .read_to_string(&package_path)
        .ok_or_else(|| ArchiveError::ManifestMissing(package_path.clone()))?;

    let manifest_dir = match package_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => package_path[..i].to_string(),
    };

    let mut items = Vec::new();
    for (id, href, media_type) in parse_manifest_items(&package)? {
        let path = join_href(&manifest_dir, &href)?;
        items.push(ManifestItem {
            id,
            path,
            media_type,
        });
    }

    let content_documents = items
        .iter()
        .filter(|item| item.is_content_document())
        .map(|item| item.path.clone())
        .collect();

    Ok(ManifestInfo {
        package_path,
        manifest_dir,
        items,
        content_documents,
    })
}

/// Value of the first `<rootfile full-path=...>` in a container descriptor
fn parse_rootfile(xml: &str) -> Result<String, ArchiveError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"rootfile" => {
                return attribute(&e, b"full-path")
                    .map_err(ArchiveError::InvalidContainer)?
                    .ok_or_else(|| {
                        ArchiveError::InvalidContainer("rootfile without full-path".to_string())
                    });
            }
            Ok(Event::Eof) => {
                return Err(ArchiveError::InvalidContainer(
                    "no rootfile element".to_string(),
                ))
            }
            Err(e) => return Err(ArchiveError::InvalidContainer(e.to_string())),
            _ => {}
        }
    }
}

/// `(id, href, media-type)` of every item inside `<manifest>`
fn parse_manifest_items(
    xml: &str,
) -> Result<Vec<(Option<String>, String, String)>, ArchiveError> {
    let mut reader = Reader::from_str(xml);
    let mut in_manifest = false;
    let mut items = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"manifest" => in_manifest = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"manifest" => in_manifest = false,
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if in_manifest && e.local_name().as_ref() == b"item" =>
            {
                let href = attribute(&e, b"href").map_err(ArchiveError::InvalidManifest)?;
                let media_type =
                    attribute(&e, b"media-type").map_err(ArchiveError::InvalidManifest)?;
                let id = attribute(&e, b"id").map_err(ArchiveError::InvalidManifest)?;

                match (href, media_type) {
                    (Some(href), Some(media_type)) => items.push((id, href, media_type)),
                    _ => tracing::warn!("Skipping manifest item without href or media-type"),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ArchiveError::InvalidManifest(e.to_string())),
            _ => {}
        }
    }

    Ok(items)
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Join a manifest href onto the manifest directory
fn join_href(dir: &str, href: &str) -> Result<String, ArchiveError> {
    let href = href.split('#').next().unwrap_or_default();
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();

    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ArchiveError::InvalidManifest(format!(
                        "href escapes archive root: {}",
                        href
                    )));
                }
            }
            s => segments.push(s),
        }
    }

    Ok(format!("/{}", segments.join("/")))
}
