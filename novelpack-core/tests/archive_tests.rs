//! Archive read/write integration tests
//!
//! Packs books, damages archives on the byte level and reads them back
//! through the public API.

use novelpack_core::decoder::{
    leading_entries, read_documents, resolve_manifest, ExtractOptions, Extractor,
};
use novelpack_core::encoder::{entry_order, write_archive, EpubEncoder, MISSING_CHAPTER_HINT};
use novelpack_core::types::{
    Book, ChapterSources, CompositionMode, Engine, Localized, OutputResource, ResourceSet, Source,
    TocItem,
};
use novelpack_core::ArchiveError;
use proptest::prelude::*;
use std::io::{Cursor, Write};

fn sample_book() -> Book {
    let mut book = Book::new("異世界転生");
    book.add_toc_item(TocItem::divider(Localized::new("第一章").with_translation("第一章")));
    book.add_toc_item(TocItem::chapter(
        Localized::new("プロローグ").with_translation("序章"),
        "p",
    ));
    book.add_toc_item(TocItem::chapter(Localized::new("出会い"), "m"));
    book.add_toc_item(TocItem::divider(Localized::new("第二章")));
    book.add_toc_item(TocItem::chapter(Localized::new("旅立ち"), "missing"));
    book.add_chapter(
        "p",
        ChapterSources::new(vec!["昔々".into(), "".into(), "おしまい".into()])
            .with_translation(Engine::Baidu, vec!["从前".into(), "".into(), "结束".into()])
            .with_translation(Engine::Youdao, vec!["很久以前".into(), "".into(), "完".into()]),
    );
    book.add_chapter("m", ChapterSources::new(vec!["出会った".into()]));
    book
}

fn all_modes() -> Vec<CompositionMode> {
    vec![
        CompositionMode::SourceOnly(Source::Original),
        CompositionMode::SourceOnly(Source::Translation(Engine::Youdao)),
        CompositionMode::Sequential(Source::Translation(Engine::Baidu)),
        CompositionMode::Interleaved(Source::Translation(Engine::Baidu), Source::Original),
        CompositionMode::Trilingual,
    ]
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[test]
fn test_first_three_entries_byte_level() {
    let bytes = EpubEncoder::default().to_bytes(&sample_book()).unwrap();

    // Local header of "mimetype" at offset 0, stored, content right after the name
    assert_eq!(&bytes[0..4], b"PK\x03\x04");
    assert_eq!(u16_at(&bytes, 8), 0, "mimetype must be stored");
    assert_eq!(u16_at(&bytes, 26), 8);
    assert_eq!(u16_at(&bytes, 28), 0, "no extra field before the mimetype content");
    assert_eq!(&bytes[30..38], b"mimetype");
    assert_eq!(&bytes[38..58], b"application/epub+zip");

    // Second header follows immediately
    assert_eq!(&bytes[58..62], b"PK\x03\x04");
    let name_len = u16_at(&bytes, 58 + 26) as usize;
    assert_eq!(&bytes[88..88 + name_len], b"META-INF/container.xml");

    let names: Vec<_> = leading_entries(&bytes, 3).into_iter().map(|e| e.name).collect();
    assert_eq!(
        names,
        vec!["mimetype", "META-INF/container.xml", "OEBPS/content.opf"]
    );
}

#[test]
fn test_falls_back_when_end_of_central_directory_is_damaged() {
    let mut bytes = EpubEncoder::default().to_bytes(&sample_book()).unwrap();
    let eocd = bytes
        .windows(4)
        .rposition(|w| w == b"PK\x05\x06")
        .expect("archive has an end-of-central-directory record");
    bytes[eocd..eocd + 4].copy_from_slice(&[0, 0, 0, 0]);

    let extraction = Extractor::default().extract_reporting(&bytes).unwrap();
    assert_eq!(extraction.strategy, "local-headers");
    assert_eq!(extraction.failures.len(), 1);
    assert_eq!(extraction.failures[0].strategy, "central-directory");

    let manifest = resolve_manifest(&extraction.tree).unwrap();
    assert_eq!(manifest.content_documents.len(), 3);
}

#[test]
fn test_strict_only_rejects_damaged_archive() {
    let mut bytes = EpubEncoder::default().to_bytes(&sample_book()).unwrap();
    let eocd = bytes.windows(4).rposition(|w| w == b"PK\x05\x06").unwrap();
    bytes.truncate(eocd);

    let options = ExtractOptions::default().with_strategies(vec!["central".parse().unwrap()]);
    match Extractor::new(&options).extract(&bytes) {
        Err(ArchiveError::Unreadable { failures }) => assert_eq!(failures.len(), 1),
        other => panic!("Expected Unreadable, got {:?}", other.map(|t| t.file_count())),
    }
}

#[test]
fn test_damaged_middle_header_is_unreadable() {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for name in ["a.txt", "b.txt", "c.txt"] {
        zip.start_file(name, options).unwrap();
        zip.write_all(name.as_bytes()).unwrap();
    }
    let mut bytes = zip.finish().unwrap().into_inner();

    let headers: Vec<usize> = bytes
        .windows(4)
        .enumerate()
        .filter(|(_, w)| *w == b"PK\x03\x04")
        .map(|(at, _)| at)
        .collect();
    assert_eq!(headers.len(), 3);
    bytes[headers[1]..headers[1] + 4].copy_from_slice(b"XXXX");
    let eocd = bytes.windows(4).rposition(|w| w == b"PK\x05\x06").unwrap();
    bytes[eocd..eocd + 4].copy_from_slice(b"XXXX");

    match Extractor::default().extract_reporting(&bytes) {
        Err(ArchiveError::Unreadable { failures }) => {
            let strategies: Vec<_> = failures.iter().map(|f| f.strategy.as_str()).collect();
            assert_eq!(strategies, vec!["central-directory", "local-headers"]);
        }
        Ok(extraction) => panic!(
            "Expected Unreadable, got {} files via {}",
            extraction.tree.file_count(),
            extraction.strategy
        ),
        Err(other) => panic!("Expected Unreadable, got {:?}", other),
    }
}

#[test]
fn test_bomb_guard_stops_every_strategy() {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("mimetype", zip::write::FileOptions::default())
        .unwrap();
    zip.write_all(b"application/epub+zip").unwrap();
    zip.start_file("zeros.bin", zip::write::FileOptions::default())
        .unwrap();
    zip.write_all(&vec![0u8; 4 * 1024 * 1024]).unwrap();
    let bytes = zip.finish().unwrap().into_inner();
    assert!(bytes.len() < 64 * 1024, "payload should compress well");

    let options = ExtractOptions::default().with_max_decompressed_bytes(1024 * 1024);
    let err = Extractor::new(&options).extract(&bytes).unwrap_err();

    match &err {
        ArchiveError::Unreadable { failures } => {
            assert_eq!(failures.len(), 2);
            for failure in failures {
                assert!(failure.reason.contains("limit exceeded"), "{}", failure);
            }
        }
        other => panic!("Expected Unreadable, got {:?}", other),
    }
    assert!(err.to_string().contains("central-directory"));
}

#[test]
fn test_navigation_round_trips_through_archive() {
    let book = sample_book();

    for mode in all_modes() {
        let encoder = EpubEncoder::new(mode);
        let expected: Vec<String> = encoder
            .navigation(&book)
            .into_iter()
            .filter_map(|entry| entry.document)
            .map(|document| format!("/OEBPS/Text/{}", document))
            .collect();

        let bytes = encoder.to_bytes(&book).unwrap();
        let tree = Extractor::default().extract(&bytes).unwrap();
        let manifest = resolve_manifest(&tree).unwrap();

        assert_eq!(manifest.content_documents, expected, "mode {}", mode);
    }
}

#[test]
fn test_missing_chapter_packaged_as_placeholder() {
    let bytes = EpubEncoder::new(CompositionMode::Trilingual)
        .to_bytes(&sample_book())
        .unwrap();
    let tree = Extractor::default().extract(&bytes).unwrap();
    let documents = read_documents(&tree).unwrap();

    assert_eq!(documents.len(), 3);
    assert_eq!(documents[0].title.as_deref(), Some("序章"));
    assert_eq!(
        documents[0].paragraphs,
        vec!["プロローグ", "很久以前", "从前", "昔々", "", "完", "结束", "おしまい"]
    );
    // Chapter "m" has no translations, chapter "missing" has no sources at all
    assert_eq!(documents[1].paragraphs, vec![MISSING_CHAPTER_HINT]);
    assert_eq!(documents[2].paragraphs, vec![MISSING_CHAPTER_HINT]);
}

#[test]
fn test_manifest_declaration_order_is_reading_order() {
    let container = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles><rootfile full-path="content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#;
    let package = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <manifest>
    <item id="b" href="b.xhtml" media-type="application/xhtml+xml"/>
    <item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
</package>"#;
    let resources: ResourceSet = [
        OutputResource::new("mimetype", "application/epub+zip"),
        OutputResource::new("META-INF/container.xml", container),
        OutputResource::new("content.opf", package),
        OutputResource::new("a.xhtml", "<html><body><p>A</p></body></html>"),
        OutputResource::new("b.xhtml", "<html><body><p>B</p></body></html>"),
    ]
    .into_iter()
    .collect();

    let bytes = write_archive(&resources).unwrap();
    let tree = Extractor::default().extract(&bytes).unwrap();
    let manifest = resolve_manifest(&tree).unwrap();

    assert_eq!(manifest.content_documents, vec!["/b.xhtml", "/a.xhtml"]);
    let texts: Vec<_> = read_documents(&tree)
        .unwrap()
        .into_iter()
        .flat_map(|doc| doc.paragraphs)
        .collect();
    assert_eq!(texts, vec!["B", "A"]);
}

#[test]
fn test_write_and_extract_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.epub");

    EpubEncoder::default()
        .write_to_path(&sample_book(), &path)
        .unwrap();
    let tree = Extractor::default().extract_file(&path).unwrap();

    assert!(tree.contains_file("/mimetype"));
    assert!(tree.contains_dir("/OEBPS/Text"));
}

#[test]
fn test_extract_file_missing() {
    let err = Extractor::default()
        .extract_file("/nonexistent/book.epub")
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Io(_)));
}

fn entry_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("mimetype".to_string()),
        Just("META-INF/container.xml".to_string()),
        "[a-zA-Z]{1,6}(/[a-z]{1,6}){0,2}\\.(opf|xhtml|css|ncx)",
    ]
}

proptest! {
    #[test]
    fn prop_writer_orders_entries(names in prop::collection::btree_set(entry_name(), 1..16)) {
        let resources: ResourceSet = names
            .iter()
            .map(|name| OutputResource::new(name.as_str(), name.as_bytes()))
            .collect();
        let bytes = write_archive(&resources).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let written: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();

        let mut expected: Vec<String> = names.iter().cloned().collect();
        expected.sort_by(|a, b| entry_order(a, b));
        prop_assert_eq!(&written, &expected);

        if names.contains("mimetype") {
            prop_assert_eq!(written[0].as_str(), "mimetype");
            prop_assert_eq!(
                archive.by_index(0).unwrap().compression(),
                zip::CompressionMethod::Stored
            );
        }
    }

    #[test]
    fn prop_interleaved_never_partial(
        original in prop::collection::vec("[ a-z]{0,4}", 1..12),
        translated in prop::collection::vec("[a-z]{1,4}", 0..12),
    ) {
        let chapter = ChapterSources::new(original.clone())
            .with_translation(Engine::Youdao, translated.clone());
        let mode = CompositionMode::Interleaved(Source::Translation(Engine::Youdao), Source::Original);
        let blocks = novelpack_core::encoder::compose_paragraphs(Some(&chapter), &mode);

        let complete = original
            .iter()
            .enumerate()
            .all(|(i, line)| line.trim().is_empty() || i < translated.len());
        if complete {
            let expected: usize = original
                .iter()
                .map(|line| if line.trim().is_empty() { 1 } else { 2 })
                .sum();
            prop_assert_eq!(blocks.len(), expected);
        } else {
            prop_assert_eq!(blocks.len(), 1);
            prop_assert_eq!(blocks[0].text(), MISSING_CHAPTER_HINT);
        }
    }
}
