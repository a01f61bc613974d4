//! Chapter compositor: merges paragraph sources into rendered blocks
//!
//! Composition never fails. A chapter that lacks what the mode needs is
//! rendered as a single placeholder paragraph, so packaging a partially
//! fetched novel still produces every episode.

use super::navigation::TitleLanguage;
use crate::types::{Block, ChapterSources, CompositionMode, Localized, Source, TocItem};

/// Text of the placeholder paragraph for chapters that cannot be rendered
pub const MISSING_CHAPTER_HINT: &str = "该章节缺失。";

/// A chapter ready to be rendered as a content document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedChapter {
    /// Document title
    pub title: String,

    /// Heading blocks followed by body blocks
    pub blocks: Vec<Block>,
}

fn placeholder() -> Vec<Block> {
    vec![Block::paragraph(MISSING_CHAPTER_HINT)]
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Body blocks of one chapter under `mode`
pub fn compose_paragraphs(chapter: Option<&ChapterSources>, mode: &CompositionMode) -> Vec<Block> {
    let Some(chapter) = chapter.filter(|c| c.has_original()) else {
        return placeholder();
    };

    let blocks: Option<Vec<Block>> = match *mode {
        CompositionMode::SourceOnly(source) | CompositionMode::Sequential(source) => chapter
            .paragraphs(source)
            .map(|lines| lines.iter().map(Block::paragraph).collect()),
        CompositionMode::Interleaved(primary, secondary) => interleave(
            chapter.paragraphs(primary),
            chapter.paragraphs(secondary),
        ),
        CompositionMode::Trilingual => trilingual(chapter),
    };

    blocks.unwrap_or_else(placeholder)
}

/// `primary[i]` followed by `secondary[i]` as an annotation, over the
/// indices of `secondary`. `None` if any needed line is missing.
fn interleave(primary: Option<&[String]>, secondary: Option<&[String]>) -> Option<Vec<Block>> {
    let (primary, secondary) = (primary?, secondary?);
    let mut blocks = Vec::with_capacity(secondary.len() * 2);

    for (i, line) in secondary.iter().enumerate() {
        if is_blank(line) {
            blocks.push(Block::paragraph(line.as_str()));
            continue;
        }
        blocks.push(Block::paragraph(primary.get(i)?.trim_end()));
        blocks.push(Block::secondary(line.trim_start()));
    }

    Some(blocks)
}

fn trilingual(chapter: &ChapterSources) -> Option<Vec<Block>> {
    let translations = CompositionMode::TRILINGUAL_ORDER
        .map(|engine| chapter.paragraphs(Source::Translation(engine)));
    let [Some(first), Some(second)] = translations else {
        return None;
    };

    let mut blocks = Vec::with_capacity(chapter.original.len() * 3);
    for (i, line) in chapter.original.iter().enumerate() {
        if is_blank(line) {
            blocks.push(Block::paragraph(line.as_str()));
            continue;
        }
        blocks.push(Block::paragraph(first.get(i)?.as_str()));
        blocks.push(Block::paragraph(second.get(i)?.as_str()));
        blocks.push(Block::secondary(line.as_str()));
    }

    Some(blocks)
}

/// Heading blocks for a chapter title under `mode`
pub fn compose_heading(title: &Localized, mode: &CompositionMode) -> Vec<Block> {
    match mode {
        CompositionMode::SourceOnly(Source::Original) => {
            vec![Block::Heading(title.original.clone())]
        }
        CompositionMode::SourceOnly(Source::Translation(_)) | CompositionMode::Sequential(_) => {
            vec![Block::Heading(title.translated_or_original().to_string())]
        }
        CompositionMode::Interleaved(..) | CompositionMode::Trilingual => match &title.translated {
            Some(translated) => vec![
                Block::Heading(translated.clone()),
                Block::secondary(title.original.as_str()),
            ],
            None => vec![Block::Heading(title.original.clone())],
        },
    }
}

/// Compose heading and body of one TOC row
pub fn compose_chapter(
    item: &TocItem,
    chapter: Option<&ChapterSources>,
    mode: &CompositionMode,
) -> ComposedChapter {
    let mut blocks = compose_heading(&item.title, mode);
    blocks.extend(compose_paragraphs(chapter, mode));

    ComposedChapter {
        title: TitleLanguage::for_mode(mode)
            .select(&item.title)
            .to_string(),
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Engine;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sources() -> ChapterSources {
        ChapterSources::new(lines(&["  jp1", "", "jp2  "]))
            .with_translation(Engine::Baidu, lines(&["bd1  ", "", "bd2"]))
            .with_translation(Engine::Youdao, lines(&["yd1", "", "yd2"]))
    }

    fn all_modes() -> Vec<CompositionMode> {
        vec![
            CompositionMode::SourceOnly(Source::Original),
            CompositionMode::SourceOnly(Source::Translation(Engine::Baidu)),
            CompositionMode::Sequential(Source::Translation(Engine::Youdao)),
            CompositionMode::Interleaved(Source::Translation(Engine::Baidu), Source::Original),
            CompositionMode::Trilingual,
        ]
    }

    #[test]
    fn test_missing_chapter_is_placeholder_in_every_mode() {
        let empty = ChapterSources::new(Vec::new())
            .with_translation(Engine::Baidu, lines(&["bd1"]));
        for mode in all_modes() {
            assert_eq!(compose_paragraphs(None, &mode), placeholder(), "{}", mode);
            assert_eq!(compose_paragraphs(Some(&empty), &mode), placeholder(), "{}", mode);
        }
    }

    #[test]
    fn test_source_only_is_verbatim() {
        let blocks = compose_paragraphs(
            Some(&sources()),
            &CompositionMode::SourceOnly(Source::Translation(Engine::Baidu)),
        );
        assert_eq!(
            blocks,
            vec![
                Block::paragraph("bd1  "),
                Block::paragraph(""),
                Block::paragraph("bd2"),
            ]
        );
    }

    #[test]
    fn test_absent_source_is_placeholder() {
        let chapter = ChapterSources::new(lines(&["jp1"]));
        let mode = CompositionMode::Sequential(Source::Translation(Engine::Youdao));
        assert_eq!(compose_paragraphs(Some(&chapter), &mode), placeholder());
    }

    #[test]
    fn test_interleaved_trims_and_passes_blank_lines() {
        let mode = CompositionMode::Interleaved(Source::Translation(Engine::Baidu), Source::Original);
        let blocks = compose_paragraphs(Some(&sources()), &mode);

        assert_eq!(
            blocks,
            vec![
                Block::paragraph("bd1"),
                Block::secondary("jp1"),
                Block::paragraph(""),
                Block::paragraph("bd2"),
                Block::secondary("jp2  "),
            ]
        );
    }

    #[test]
    fn test_interleaved_short_translation_is_placeholder() {
        let chapter = ChapterSources::new(lines(&["jp1", "jp2"]))
            .with_translation(Engine::Baidu, lines(&["bd1"]));
        let mode = CompositionMode::Interleaved(Source::Translation(Engine::Baidu), Source::Original);
        assert_eq!(compose_paragraphs(Some(&chapter), &mode), placeholder());
    }

    #[test]
    fn test_interleaved_short_translation_over_blank_tail() {
        let chapter = ChapterSources::new(lines(&["jp1", " "]))
            .with_translation(Engine::Baidu, lines(&["bd1"]));
        let mode = CompositionMode::Interleaved(Source::Translation(Engine::Baidu), Source::Original);
        assert_eq!(
            compose_paragraphs(Some(&chapter), &mode),
            vec![
                Block::paragraph("bd1"),
                Block::secondary("jp1"),
                Block::paragraph(" "),
            ]
        );
    }

    #[test]
    fn test_trilingual_order() {
        let blocks = compose_paragraphs(Some(&sources()), &CompositionMode::Trilingual);
        let texts: Vec<_> = blocks.iter().map(Block::text).collect();

        assert_eq!(texts, vec!["yd1", "bd1  ", "  jp1", "", "yd2", "bd2", "jp2  "]);
        assert_eq!(blocks[2], Block::secondary("  jp1"));
    }

    #[test]
    fn test_trilingual_requires_both_translations() {
        let chapter = ChapterSources::new(lines(&["jp1"]))
            .with_translation(Engine::Youdao, lines(&["yd1"]));
        assert_eq!(
            compose_paragraphs(Some(&chapter), &CompositionMode::Trilingual),
            placeholder()
        );

        let short = chapter.with_translation(Engine::Baidu, Vec::new());
        assert_eq!(
            compose_paragraphs(Some(&short), &CompositionMode::Trilingual),
            placeholder()
        );
    }

    #[test]
    fn test_heading_by_mode() {
        let title = Localized::new("プロローグ").with_translation("Prologue");
        let untranslated = Localized::new("閑話");

        assert_eq!(
            compose_heading(&title, &CompositionMode::SourceOnly(Source::Original)),
            vec![Block::Heading("プロローグ".into())]
        );
        assert_eq!(
            compose_heading(
                &title,
                &CompositionMode::SourceOnly(Source::Translation(Engine::Youdao))
            ),
            vec![Block::Heading("Prologue".into())]
        );
        assert_eq!(
            compose_heading(
                &untranslated,
                &CompositionMode::SourceOnly(Source::Translation(Engine::Youdao))
            ),
            vec![Block::Heading("閑話".into())]
        );
        assert_eq!(
            compose_heading(&title, &CompositionMode::Sequential(Source::Original)),
            vec![Block::Heading("Prologue".into())]
        );
        assert_eq!(
            compose_heading(&title, &CompositionMode::Trilingual),
            vec![Block::Heading("Prologue".into()), Block::secondary("プロローグ")]
        );
        assert_eq!(
            compose_heading(&untranslated, &CompositionMode::Trilingual),
            vec![Block::Heading("閑話".into())]
        );
    }

    #[test]
    fn test_translated_source_heading_matches_title() {
        let item = TocItem::chapter(Localized::new("一").with_translation("One"), "c1");
        let mode = CompositionMode::SourceOnly(Source::Translation(Engine::Baidu));
        let chapter = compose_chapter(&item, None, &mode);

        assert_eq!(chapter.title, "One");
        assert_eq!(chapter.blocks[0], Block::Heading(chapter.title.clone()));
    }

    #[test]
    fn test_compose_chapter_title_and_blocks() {
        let item = TocItem::chapter(Localized::new("一").with_translation("One"), "c1");
        let chapter = compose_chapter(&item, None, &CompositionMode::SourceOnly(Source::Original));

        assert_eq!(chapter.title, "一");
        assert_eq!(
            chapter.blocks,
            vec![Block::Heading("一".into()), Block::paragraph(MISSING_CHAPTER_HINT)]
        );

        let chapter = compose_chapter(&item, Some(&sources()), &CompositionMode::Trilingual);
        assert_eq!(chapter.title, "One");
        assert_eq!(chapter.blocks.len(), 2 + 7);
    }
}
