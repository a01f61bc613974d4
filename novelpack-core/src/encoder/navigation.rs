//! Navigation entries and the nested navigation tree

use crate::types::{CompositionMode, Localized, NavigationEntry, TocItem};

/// Content document filename of the `n`th episode (1-based)
pub fn document_filename(n: usize) -> String {
    format!("episode{}.xhtml", n)
}

/// Build navigation entries from a table of contents.
///
/// Rows with a chapter id claim the next episode filename; structural rows
/// keep their place in the navigation without a document.
pub fn build_navigation<F>(toc: &[TocItem], title: F) -> Vec<NavigationEntry>
where
    F: Fn(&TocItem) -> String,
{
    let mut counter = 0;
    toc.iter()
        .map(|item| {
            let document = item.chapter_id.as_ref().map(|_| {
                counter += 1;
                document_filename(counter)
            });
            NavigationEntry {
                document,
                title: title(item),
            }
        })
        .collect()
}

/// Which title of a [`Localized`] pair to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleLanguage {
    Original,

    /// Translated, falling back to the original
    Translated,
}

impl TitleLanguage {
    /// Title language used for a composition mode
    pub fn for_mode(mode: &CompositionMode) -> Self {
        if mode.uses_translated_language() {
            TitleLanguage::Translated
        } else {
            TitleLanguage::Original
        }
    }

    pub fn select<'a>(&self, title: &'a Localized) -> &'a str {
        match self {
            TitleLanguage::Original => &title.original,
            TitleLanguage::Translated => title.translated_or_original(),
        }
    }
}

/// Navigation entries with titles chosen for `mode`
pub fn navigation_for_mode(toc: &[TocItem], mode: &CompositionMode) -> Vec<NavigationEntry> {
    let language = TitleLanguage::for_mode(mode);
    build_navigation(toc, |item| language.select(&item.title).to_string())
}

/// Node of the nested navigation tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    pub title: String,

    /// Target document filename
    pub document: String,

    pub children: Vec<NavPoint>,
}

/// Nest navigation entries under the structural row preceding them.
///
/// A structural row points at its first episode. Structural rows with no
/// episode after them are dropped.
pub fn nav_tree(entries: &[NavigationEntry]) -> Vec<NavPoint> {
    let mut points = Vec::new();
    let mut group: Option<(String, Vec<NavPoint>)> = None;

    for entry in entries {
        match &entry.document {
            None => {
                if let Some(finished) = group.take() {
                    push_group(&mut points, finished);
                }
                group = Some((entry.title.clone(), Vec::new()));
            }
            Some(document) => {
                let point = NavPoint {
                    title: entry.title.clone(),
                    document: document.clone(),
                    children: Vec::new(),
                };
                match group.as_mut() {
                    Some((_, children)) => children.push(point),
                    None => points.push(point),
                }
            }
        }
    }
    if let Some(finished) = group {
        push_group(&mut points, finished);
    }

    points
}

fn push_group(points: &mut Vec<NavPoint>, (title, children): (String, Vec<NavPoint>)) {
    let Some(first) = children.first() else {
        tracing::debug!("Dropping empty navigation group '{}'", title);
        return;
    };
    points.push(NavPoint {
        title,
        document: first.document.clone(),
        children,
    });
}
