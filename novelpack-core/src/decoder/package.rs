//! Whole-package operations over an extracted archive

use super::{
    leading_entries, resolve_manifest, DocumentTree, EntryHeader, ExtractOptions, Extractor,
};
use crate::encoder::{
    placeholder_document, ArchiveWriter, CONTAINER_ENTRY, EPUB_MIMETYPE, MIMETYPE_ENTRY,
    PACKAGE_SUFFIX,
};
use crate::error::{ArchiveError, StrategyFailure};
use crate::types::OutputResource;
use scraper::{Html, Selector};
use serde::Serialize;
use std::io::Cursor;

/// Text content of one content document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentDocument {
    /// Absolute path inside the archive
    pub path: String,

    /// Document `<title>`, if any
    pub title: Option<String>,

    /// Text of each `<p>` element in document order
    pub paragraphs: Vec<String>,
}

impl ContentDocument {
    /// Parse an XHTML/HTML content document
    pub fn parse(path: impl Into<String>, markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let path = path.into();

        let (Ok(title_selector), Ok(paragraph_selector)) =
            (Selector::parse("title"), Selector::parse("p"))
        else {
            return Self {
                path,
                ..Default::default()
            };
        };

        let title = html
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let paragraphs = html
            .select(&paragraph_selector)
            .map(|el| el.text().collect::<String>())
            .collect();

        Self {
            path,
            title,
            paragraphs,
        }
    }

    fn empty(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }
}

/// Visit every content document in reading order.
///
/// Documents listed in the manifest but absent from the tree are passed as
/// empty documents.
pub fn for_each_document<F>(tree: &DocumentTree, mut f: F) -> Result<(), ArchiveError>
where
    F: FnMut(ContentDocument),
{
    let manifest = resolve_manifest(tree)?;

    for path in &manifest.content_documents {
        match tree.read_to_string(path) {
            Some(markup) => f(ContentDocument::parse(path.as_str(), &markup)),
            None => {
                tracing::warn!("Content document {} listed in manifest but missing", path);
                f(ContentDocument::empty(path));
            }
        }
    }

    Ok(())
}

/// Collect every content document in reading order
pub fn read_documents(tree: &DocumentTree) -> Result<Vec<ContentDocument>, ArchiveError> {
    let mut documents = Vec::new();
    for_each_document(tree, |doc| documents.push(doc))?;
    Ok(documents)
}

/// Rewrite an archive entry by entry.
///
/// Every file is passed through `transform` (with its entry name, no leading
/// slash) and written back in archive order: `mimetype` first, then the
/// container descriptor, then package documents. Content documents the
/// manifest lists but the tree lacks are replaced by a placeholder.
pub fn repack<F>(tree: &DocumentTree, mut transform: F) -> Result<Vec<u8>, ArchiveError>
where
    F: FnMut(&str, Vec<u8>) -> Vec<u8>,
{
    let mut writer = ArchiveWriter::new();

    if !tree.contains_file(MIMETYPE_ENTRY) {
        tracing::warn!("Archive has no mimetype entry, adding one");
        writer.add(OutputResource::new(MIMETYPE_ENTRY, EPUB_MIMETYPE));
    }

    match resolve_manifest(tree) {
        Ok(manifest) => {
            for path in manifest
                .content_documents
                .iter()
                .filter(|p| !tree.contains_file(p))
            {
                tracing::warn!("Substituting placeholder for missing document {}", path);
                writer.add(OutputResource::new(
                    path.trim_start_matches('/'),
                    placeholder_document(""),
                ));
            }
        }
        Err(err) => tracing::warn!("Repacking without manifest check: {}", err),
    }

    for (path, bytes) in tree.files() {
        let name = path.trim_start_matches('/');
        writer.add(OutputResource::new(name, transform(name, bytes.to_vec())));
    }

    let sink = writer.finish(Cursor::new(Vec::new()))?;
    Ok(sink.into_inner())
}

/// Structural report on an archive
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Strategy that extracted the archive
    pub strategy: String,

    /// Strategies that failed first
    pub failures: Vec<StrategyFailure>,

    pub file_count: usize,

    /// Total decompressed bytes
    pub decompressed_bytes: u64,

    /// First local headers as they appear in the file
    pub leading_entries: Vec<EntryHeader>,

    pub mimetype_first_stored: bool,
    pub container_second: bool,
    pub package_third: bool,

    /// Package document path, when the container resolved
    pub package_path: Option<String>,

    /// Content documents listed in the manifest
    pub content_documents: usize,

    /// Manifest content documents absent from the archive
    pub missing_documents: Vec<String>,

    /// Container or manifest resolution error
    pub manifest_error: Option<String>,
}

impl ValidationReport {
    /// Whether the archive satisfies every structural check
    pub fn is_valid(&self) -> bool {
        self.issues().is_empty()
    }

    /// Human-readable list of problems
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.failures.is_empty() {
            issues.push(format!(
                "central directory unusable, recovered with '{}'",
                self.strategy
            ));
        }
        if !self.mimetype_first_stored {
            issues.push("first entry is not an uncompressed mimetype".to_string());
        }
        if !self.container_second {
            issues.push(format!("second entry is not {}", CONTAINER_ENTRY));
        }
        if !self.package_third {
            issues.push("third entry is not the package document".to_string());
        }
        if let Some(err) = &self.manifest_error {
            issues.push(err.clone());
        }
        for path in &self.missing_documents {
            issues.push(format!("missing content document {}", path));
        }
        issues
    }
}

/// Extract `bytes` and check the archive layout
pub fn validate_archive(
    bytes: &[u8],
    options: &ExtractOptions,
) -> Result<ValidationReport, ArchiveError> {
    let extraction = Extractor::new(options).extract_reporting(bytes)?;
    let tree = &extraction.tree;
    let leading = leading_entries(bytes, 3);

    let mimetype_first_stored = leading
        .first()
        .is_some_and(|e| e.name == MIMETYPE_ENTRY && e.is_stored());
    let container_second = leading.get(1).is_some_and(|e| e.name == CONTAINER_ENTRY);
    let package_third = leading
        .get(2)
        .is_some_and(|e| e.name.ends_with(PACKAGE_SUFFIX));

    let mut report = ValidationReport {
        strategy: extraction.strategy.clone(),
        failures: extraction.failures.clone(),
        file_count: tree.file_count(),
        decompressed_bytes: tree.total_bytes(),
        leading_entries: leading,
        mimetype_first_stored,
        container_second,
        package_third,
        package_path: None,
        content_documents: 0,
        missing_documents: Vec::new(),
        manifest_error: None,
    };

    match resolve_manifest(tree) {
        Ok(manifest) => {
            report.content_documents = manifest.content_documents.len();
            report.missing_documents = manifest
                .content_documents
                .iter()
                .filter(|p| !tree.contains_file(p))
                .cloned()
                .collect();
            report.package_path = Some(manifest.package_path);
        }
        Err(err) => report.manifest_error = Some(err.to_string()),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: &str = r#"<container><rootfiles><rootfile full-path="OEBPS/content.opf"/></rootfiles></container>"#;

    const PACKAGE: &str = r#"<package><manifest>
<item id="e2" href="Text/episode2.xhtml" media-type="application/xhtml+xml"/>
<item id="e1" href="Text/episode1.xhtml" media-type="application/xhtml+xml"/>
</manifest></package>"#;

    fn sample_tree(with_episode2: bool) -> DocumentTree {
        let mut tree = DocumentTree::new();
        tree.insert_file("mimetype", EPUB_MIMETYPE.as_bytes().to_vec())
            .unwrap();
        tree.insert_file("META-INF/container.xml", CONTAINER.as_bytes().to_vec())
            .unwrap();
        tree.insert_file("OEBPS/content.opf", PACKAGE.as_bytes().to_vec())
            .unwrap();
        tree.insert_file(
            "OEBPS/Text/episode1.xhtml",
            b"<html><head><title>One</title></head><body><p>a</p><p>b</p></body></html>".to_vec(),
        )
        .unwrap();
        if with_episode2 {
            tree.insert_file(
                "OEBPS/Text/episode2.xhtml",
                b"<html><body><p>c</p></body></html>".to_vec(),
            )
            .unwrap();
        }
        tree
    }

    #[test]
    fn test_documents_in_manifest_order() {
        let docs = read_documents(&sample_tree(true)).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].path, "/OEBPS/Text/episode2.xhtml");
        assert_eq!(docs[0].paragraphs, vec!["c"]);
        assert_eq!(docs[0].title, None);
        assert_eq!(docs[1].title.as_deref(), Some("One"));
        assert_eq!(docs[1].paragraphs, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_document_is_visited_empty() {
        let mut seen = Vec::new();
        for_each_document(&sample_tree(false), |doc| seen.push(doc)).unwrap();

        assert_eq!(seen.len(), 2);
        assert!(seen[0].paragraphs.is_empty());
        assert_eq!(seen[0].path, "/OEBPS/Text/episode2.xhtml");
    }

    #[test]
    fn test_repack_orders_and_transforms() {
        let mut names = Vec::new();
        let bytes = repack(&sample_tree(true), |name, content| {
            names.push(name.to_string());
            if name.ends_with(".xhtml") {
                String::from_utf8_lossy(&content)
                    .replace("<p>a</p>", "<p>A</p>")
                    .into_bytes()
            } else {
                content
            }
        })
        .unwrap();

        assert!(names.contains(&"mimetype".to_string()));
        assert!(names.iter().all(|n| !n.starts_with('/')));

        let heads: Vec<_> = leading_entries(&bytes, 3)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(
            heads,
            vec!["mimetype", "META-INF/container.xml", "OEBPS/content.opf"]
        );

        let tree = Extractor::default().extract(&bytes).unwrap();
        let docs = read_documents(&tree).unwrap();
        assert_eq!(docs[1].paragraphs, vec!["A", "b"]);
    }

    #[test]
    fn test_repack_fills_missing_documents() {
        let bytes = repack(&sample_tree(false), |_, content| content).unwrap();
        let tree = Extractor::default().extract(&bytes).unwrap();

        assert!(tree.contains_file("/OEBPS/Text/episode2.xhtml"));
        let docs = read_documents(&tree).unwrap();
        assert_eq!(docs[0].paragraphs, vec![crate::encoder::MISSING_CHAPTER_HINT]);
    }

    #[test]
    fn test_validate_repacked_archive() {
        let bytes = repack(&sample_tree(true), |_, content| content).unwrap();
        let report = validate_archive(&bytes, &ExtractOptions::default()).unwrap();

        assert_eq!(report.strategy, "central-directory");
        assert!(report.mimetype_first_stored);
        assert!(report.container_second);
        assert!(report.package_third);
        assert_eq!(report.content_documents, 2);
        assert!(report.is_valid(), "{:?}", report.issues());
    }

    #[test]
    fn test_validate_reports_missing_documents() {
        let tree = sample_tree(false);
        let resources: crate::types::ResourceSet = tree
            .files()
            .map(|(p, b)| OutputResource::new(p.trim_start_matches('/'), b))
            .collect();
        let bytes = crate::encoder::write_archive(&resources).unwrap();
        let report = validate_archive(&bytes, &ExtractOptions::default()).unwrap();

        assert_eq!(report.missing_documents, vec!["/OEBPS/Text/episode2.xhtml"]);
        assert!(!report.is_valid());
    }
}
