//! XML templates for the EPUB package files

use super::navigation::NavPoint;
use super::MISSING_CHAPTER_HINT;
use crate::types::Block;
use chrono::{DateTime, SecondsFormat, Utc};

/// Default stylesheet; annotation lines are dimmed
pub const DEFAULT_STYLESHEET: &str = "p {\n  margin: 0.5em 0;\n}\n\n.secondary {\n  opacity: 0.4;\n}\n";

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn block_to_xhtml(block: &Block) -> String {
    match block {
        Block::Heading(text) => format!("<h1>{}</h1>\n", escape_html(text)),
        Block::Paragraph(text) => format!("<p>{}</p>\n", escape_html(text)),
        Block::Secondary(text) => format!("<p class=\"secondary\">{}</p>\n", escape_html(text)),
    }
}

/// Content document for one chapter
pub fn chapter_document(title: &str, language: &str, stylesheet_href: &str, blocks: &[Block]) -> String {
    let body: String = blocks.iter().map(block_to_xhtml).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}">
<head>
    <title>{title}</title>
    <link rel="stylesheet" type="text/css" href="{css}"/>
</head>
<body>
{body}</body>
</html>"#,
        lang = escape_html(language),
        title = escape_html(title),
        css = escape_html(stylesheet_href),
        body = body
    )
}

/// Stand-in for a content document whose bytes are missing
pub fn placeholder_document(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
    <title>{}</title>
</head>
<body>
<p>{}</p>
</body>
</html>"#,
        escape_html(title),
        MISSING_CHAPTER_HINT
    )
}

/// Container descriptor pointing at `package_path`
pub fn container_xml(package_path: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#,
        escape_html(package_path)
    )
}

/// Dublin Core fields of the package document
#[derive(Debug, Clone, Default)]
pub struct PackageMetadata<'a> {
    pub identifier: &'a str,
    pub title: &'a str,
    pub language: &'a str,
    pub creators: Vec<&'a str>,
    pub description: &'a str,
    pub modified: Option<DateTime<Utc>>,
}

/// One manifest `<item>`
#[derive(Debug, Clone)]
pub struct PackageItem {
    pub id: String,
    pub href: String,
    pub media_type: &'static str,
    pub in_spine: bool,
}

/// EPUB 2.0.1 package document
pub fn package_document(metadata: &PackageMetadata<'_>, items: &[PackageItem], toc_id: &str) -> String {
    let mut dc = String::new();
    dc.push_str(&format!(
        "        <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape_html(metadata.identifier)
    ));
    dc.push_str(&format!("        <dc:title>{}</dc:title>\n", escape_html(metadata.title)));
    dc.push_str(&format!(
        "        <dc:language>{}</dc:language>\n",
        escape_html(metadata.language)
    ));
    for creator in &metadata.creators {
        dc.push_str(&format!(
            "        <dc:creator opf:role=\"aut\">{}</dc:creator>\n",
            escape_html(creator)
        ));
    }
    if !metadata.description.is_empty() {
        dc.push_str(&format!(
            "        <dc:description>{}</dc:description>\n",
            escape_html(metadata.description)
        ));
    }
    if let Some(modified) = metadata.modified {
        dc.push_str(&format!(
            "        <dc:date opf:event=\"modification\">{}</dc:date>\n",
            modified.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }

    let manifest: String = items
        .iter()
        .map(|item| {
            format!(
                "        <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
                escape_html(&item.id),
                escape_html(&item.href),
                item.media_type
            )
        })
        .collect();

    let spine: String = items
        .iter()
        .filter(|item| item.in_spine)
        .map(|item| format!("        <itemref idref=\"{}\"/>\n", escape_html(&item.id)))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
{dc}    </metadata>
    <manifest>
{manifest}    </manifest>
    <spine toc="{toc}">
{spine}    </spine>
</package>"#,
        dc = dc,
        manifest = manifest,
        toc = escape_html(toc_id),
        spine = spine
    )
}

/// NCX navigation document.
///
/// A parent point shares the play order of its first child, since both
/// target the same document.
pub fn ncx_document(identifier: &str, title: &str, points: &[NavPoint], href_prefix: &str) -> String {
    let mut nav_map = String::new();
    let mut play_order = 0;
    let mut ids = 0;
    let depth = points
        .iter()
        .map(|p| if p.children.is_empty() { 1 } else { 2 })
        .max()
        .unwrap_or(1);

    for point in points {
        write_nav_point(&mut nav_map, point, href_prefix, &mut play_order, &mut ids, 2);
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
    <head>
        <meta name="dtb:uid" content="{uid}"/>
        <meta name="dtb:depth" content="{depth}"/>
        <meta name="dtb:totalPageCount" content="0"/>
        <meta name="dtb:maxPageNumber" content="0"/>
    </head>
    <docTitle>
        <text>{title}</text>
    </docTitle>
    <navMap>
{nav_map}    </navMap>
</ncx>"#,
        uid = escape_html(identifier),
        depth = depth,
        title = escape_html(title),
        nav_map = nav_map
    )
}

fn write_nav_point(
    out: &mut String,
    point: &NavPoint,
    href_prefix: &str,
    play_order: &mut usize,
    ids: &mut usize,
    indent: usize,
) {
    let pad = "    ".repeat(indent);
    *ids += 1;
    let order = if point.children.is_empty() {
        *play_order += 1;
        *play_order
    } else {
        *play_order + 1
    };

    out.push_str(&format!(
        "{pad}<navPoint id=\"navPoint-{id}\" playOrder=\"{order}\">\n\
         {pad}    <navLabel><text>{title}</text></navLabel>\n\
         {pad}    <content src=\"{src}\"/>\n",
        pad = pad,
        id = ids,
        order = order,
        title = escape_html(&point.title),
        src = escape_html(&format!("{}{}", href_prefix, point.document)),
    ));
    for child in &point.children {
        write_nav_point(out, child, href_prefix, play_order, ids, indent + 1);
    }
    out.push_str(&format!("{}</navPoint>\n", pad));
}
