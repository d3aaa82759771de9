//! Outline extraction
//!
//! Uses the document's own bookmarks when there are enough of them, and
//! otherwise classifies lines by font style relative to the body text.

use crate::config::OutlineConfig;
use crate::gibberish::is_gibberish_with;
use crate::model::{
    DocumentOutline, HeadingCandidate, HeadingLevel, OutlineEntry, SourceDocument, Style,
};
use crate::styles::{profile_styles, BodyZone};
use crate::title::resolve_title;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static PAGE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Which strategy produced an outline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineSource {
    /// The PDF's bookmark tree
    NativeToc,
    /// Font-style classification of body text
    Heuristic,
}

/// Extract title and outline with default thresholds
pub fn extract_outline(doc: &SourceDocument) -> DocumentOutline {
    extract_outline_with_config(doc, &OutlineConfig::default()).0
}

/// Extract title and outline, reporting which strategy was used
pub fn extract_outline_with_config(
    doc: &SourceDocument,
    config: &OutlineConfig,
) -> (DocumentOutline, OutlineSource) {
    let title = resolve_title(doc, config).text;

    if let Some(outline) = outline_from_toc(doc, config) {
        log::info!(
            "Using {} native bookmarks for '{}'",
            doc.toc.len(),
            doc.name
        );
        return (DocumentOutline { title, outline }, OutlineSource::NativeToc);
    }

    let outline = heuristic_outline(doc, config);
    log::info!(
        "Inferred {} headings for '{}' from font styles",
        outline.len(),
        doc.name
    );
    (DocumentOutline { title, outline }, OutlineSource::Heuristic)
}

/// Convert native bookmarks, or `None` when there are too few to trust
///
/// Duplicate titles are kept: bookmarks are authored, not inferred.
pub fn outline_from_toc(doc: &SourceDocument, config: &OutlineConfig) -> Option<Vec<OutlineEntry>> {
    if doc.toc.len() <= config.min_native_toc_entries {
        return None;
    }

    let outline = doc
        .toc
        .iter()
        .filter(|entry| !is_gibberish_with(&entry.title, &config.gibberish))
        .map(|entry| {
            OutlineEntry::new(
                HeadingLevel::from_depth(entry.level),
                entry.title.trim(),
                entry.page,
            )
        })
        .collect();

    Some(outline)
}

/// Classify body-zone lines into at most three heading levels
pub fn heuristic_outline(doc: &SourceDocument, config: &OutlineConfig) -> Vec<OutlineEntry> {
    let profile = profile_styles(doc, config);
    let Some(body_style) = profile.body_style() else {
        log::debug!("No body text found in '{}'", doc.name);
        return Vec::new();
    };

    let candidates = collect_candidates(doc, &body_style, config);
    let levels = assign_levels(&candidates, config.heading_levels());
    assemble_outline(&candidates, &levels)
}

/// Collect lines more prominent than body text, in reading order
pub fn collect_candidates(
    doc: &SourceDocument,
    body_style: &Style,
    config: &OutlineConfig,
) -> Vec<HeadingCandidate> {
    let skip_first = config.skip_first_page && doc.pages.len() > 1;
    let mut candidates = Vec::new();

    for (page_idx, page) in doc.pages.iter().enumerate() {
        if page_idx == 0 && skip_first {
            continue;
        }

        let zone = BodyZone::for_page(page, config);
        for block in page.blocks.iter().filter(|b| zone.contains(&b.bbox)) {
            for line in &block.lines {
                let Some(style) = line.style() else {
                    continue;
                };
                let text = line.text();
                if !is_heading_text(&text, config) || !style.is_more_prominent_than(body_style) {
                    continue;
                }

                log::debug!("Page {}: candidate {:?} {:?}", page_idx + 1, style, text);
                candidates.push(HeadingCandidate {
                    style,
                    text,
                    page: page_idx as u32 + 1,
                });
            }
        }
    }

    candidates
}

/// Whether a trimmed line could be a heading, ignoring its style
pub fn is_heading_text(text: &str, config: &OutlineConfig) -> bool {
    !text.is_empty()
        && text.split_whitespace().count() <= config.max_heading_words
        && !text.ends_with(['.', ':', ','])
        && !is_gibberish_with(text, &config.gibberish)
        && !PAGE_NUMBER_RE.is_match(text)
}

/// Map the most prominent distinct candidate styles to heading levels
pub fn assign_levels(
    candidates: &[HeadingCandidate],
    max_levels: usize,
) -> HashMap<Style, HeadingLevel> {
    let mut styles: Vec<Style> = candidates
        .iter()
        .map(|c| c.style)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    styles.sort_by(|a, b| b.cmp(a));

    styles
        .into_iter()
        .take(max_levels)
        .enumerate()
        .filter_map(|(rank, style)| HeadingLevel::from_rank(rank).map(|level| (style, level)))
        .collect()
}

/// Emit levelled candidates, keeping the first occurrence of each text
fn assemble_outline(
    candidates: &[HeadingCandidate],
    levels: &HashMap<Style, HeadingLevel>,
) -> Vec<OutlineEntry> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut outline = Vec::new();

    for candidate in candidates {
        let Some(level) = levels.get(&candidate.style) else {
            continue;
        };
        if !seen.insert(candidate.text.as_str()) {
            continue;
        }
        outline.push(OutlineEntry::new(
            *level,
            candidate.text.clone(),
            candidate.page as i32,
        ));
    }

    outline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Block, Line, Page, Span, TocEntry};

    fn line_block(y: f32, text: &str, size: f32, bold: bool) -> Block {
        Block::new(
            BBox::new(72.0, y, 540.0, y + size),
            vec![Line::new(vec![Span::new(text, size, bold)])],
        )
    }

    fn body_block(y: f32) -> Block {
        let lines = (0..4)
            .map(|i| Line::new(vec![Span::new(format!("Paragraph text line {}", i), 12.0, false)]))
            .collect();
        Block::new(BBox::new(72.0, y, 540.0, y + 60.0), lines)
    }

    fn page(blocks: Vec<Block>) -> Page {
        Page::new(800.0, blocks)
    }

    #[test]
    fn test_is_heading_text_rejections() {
        let config = OutlineConfig::default();
        assert!(is_heading_text("Introduction", &config));
        assert!(is_heading_text("2.1 Method", &config));
        assert!(!is_heading_text("", &config));
        assert!(!is_heading_text("42", &config));
        assert!(!is_heading_text("This sentence ends.", &config));
        assert!(!is_heading_text("Note:", &config));
        assert!(!is_heading_text("first,", &config));
        assert!(!is_heading_text("w o r d s l i k e t h i s", &config));
        let long = vec!["word"; 21].join(" ");
        assert!(!is_heading_text(&long, &config));
        let twenty = vec!["word"; 20].join(" ");
        assert!(is_heading_text(&twenty, &config));
    }

    #[test]
    fn test_levels_follow_prominence() {
        let doc = SourceDocument::new("d", vec![
            page(vec![line_block(100.0, "Cover", 30.0, true)]),
            page(vec![
                line_block(100.0, "Subsection", 14.0, true),
                line_block(130.0, "Chapter", 20.0, true),
                line_block(160.0, "Section", 16.0, false),
                line_block(190.0, "Minor", 13.0, false),
                body_block(220.0),
                body_block(300.0),
            ]),
        ]);

        let outline = heuristic_outline(&doc, &OutlineConfig::default());
        assert_eq!(
            outline,
            vec![
                OutlineEntry::new(HeadingLevel::H3, "Subsection", 2),
                OutlineEntry::new(HeadingLevel::H1, "Chapter", 2),
                OutlineEntry::new(HeadingLevel::H2, "Section", 2),
            ]
        );
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let doc = SourceDocument::new("d", vec![
            page(vec![body_block(200.0)]),
            page(vec![line_block(100.0, "Overview", 18.0, true), body_block(200.0)]),
            page(vec![line_block(100.0, "Overview", 14.0, true), body_block(200.0)]),
        ]);

        let outline = heuristic_outline(&doc, &OutlineConfig::default());
        assert_eq!(outline, vec![OutlineEntry::new(HeadingLevel::H1, "Overview", 2)]);
    }

    #[test]
    fn test_single_page_document_is_scanned() {
        let doc = SourceDocument::new("d", vec![page(vec![
            line_block(100.0, "Only Page Heading", 18.0, false),
            body_block(200.0),
        ])]);

        let outline = heuristic_outline(&doc, &OutlineConfig::default());
        assert_eq!(
            outline,
            vec![OutlineEntry::new(HeadingLevel::H1, "Only Page Heading", 1)]
        );
    }

    #[test]
    fn test_bold_body_size_is_heading_when_body_regular() {
        let doc = SourceDocument::new("d", vec![
            page(vec![]),
            page(vec![line_block(100.0, "Bold Label", 12.0, true), body_block(200.0)]),
        ]);
        let outline = heuristic_outline(&doc, &OutlineConfig::default());
        assert_eq!(outline, vec![OutlineEntry::new(HeadingLevel::H1, "Bold Label", 2)]);
    }

    #[test]
    fn test_page_numbers_and_zone_text_ignored() {
        let doc = SourceDocument::new("d", vec![
            page(vec![]),
            page(vec![
                line_block(30.0, "Running Header", 16.0, true),
                line_block(100.0, "17", 16.0, true),
                body_block(200.0),
                line_block(760.0, "Footer Banner", 16.0, true),
            ]),
        ]);
        assert!(heuristic_outline(&doc, &OutlineConfig::default()).is_empty());
    }

    #[test]
    fn test_empty_line_skipped() {
        let mut block = body_block(200.0);
        block.lines.insert(0, Line::default());
        let doc = SourceDocument::new("d", vec![page(vec![]), page(vec![block])]);
        assert!(heuristic_outline(&doc, &OutlineConfig::default()).is_empty());
    }

    #[test]
    fn test_native_toc_used_when_long_enough() {
        let mut doc = SourceDocument::new("d", vec![page(vec![body_block(200.0)])]);
        doc.toc = vec![
            TocEntry::new(1, " Intro ", 1),
            TocEntry::new(2, "Details", 2),
            TocEntry::new(2, "Details", 3),
            TocEntry::new(4, "Deep", 4),
        ];

        let (result, source) = extract_outline_with_config(&doc, &OutlineConfig::default());
        assert_eq!(source, OutlineSource::NativeToc);
        assert_eq!(
            result.outline,
            vec![
                OutlineEntry::new(HeadingLevel::H1, "Intro", 1),
                OutlineEntry::new(HeadingLevel::H2, "Details", 2),
                OutlineEntry::new(HeadingLevel::H2, "Details", 3),
                OutlineEntry::new(HeadingLevel::H3, "Deep", 4),
            ]
        );
    }

    #[test]
    fn test_short_native_toc_ignored() {
        let mut doc = SourceDocument::new("d", vec![page(vec![body_block(200.0)])]);
        doc.toc = vec![
            TocEntry::new(1, "A", 1),
            TocEntry::new(1, "B", 1),
            TocEntry::new(1, "C", 1),
        ];
        let (result, source) = extract_outline_with_config(&doc, &OutlineConfig::default());
        assert_eq!(source, OutlineSource::Heuristic);
        assert!(result.outline.is_empty());
    }

    #[test]
    fn test_assign_levels_limits_depth() {
        let candidates: Vec<HeadingCandidate> = [24, 20, 16, 14]
            .iter()
            .map(|&size| HeadingCandidate {
                style: Style::new(size, false),
                text: format!("H{}", size),
                page: 2,
            })
            .collect();

        let levels = assign_levels(&candidates, 3);
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[&Style::new(24, false)], HeadingLevel::H1);
        assert_eq!(levels[&Style::new(16, false)], HeadingLevel::H3);
        assert!(!levels.contains_key(&Style::new(14, false)));

        let two = assign_levels(&candidates, 2);
        assert_eq!(two.len(), 2);
    }
}
