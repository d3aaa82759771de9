//! Document-wide font style statistics
//!
//! Tallies `(rounded size, bold)` pairs over the body zone of every page.
//! The most common style is taken to be paragraph text; anything more
//! prominent is a heading candidate.

use crate::config::OutlineConfig;
use crate::model::{BBox, Page, SourceDocument, Style};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Vertical band of a page between the running header and footer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyZone {
    /// Blocks must start strictly below this y
    pub top: f32,
    /// Blocks must end strictly above this y
    pub bottom: f32,
}

impl BodyZone {
    pub fn for_page(page: &Page, config: &OutlineConfig) -> Self {
        Self {
            top: page.height * config.header_zone_ratio,
            bottom: page.height * config.footer_zone_ratio,
        }
    }

    /// A block touching either boundary is outside the zone
    pub fn contains(&self, bbox: &BBox) -> bool {
        bbox.y0 > self.top && bbox.y1 < self.bottom
    }
}

/// Style frequency table for one document
#[derive(Debug, Clone, Default)]
pub struct StyleProfile {
    counts: HashMap<Style, usize>,
}

impl StyleProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, style: Style) {
        *self.counts.entry(style).or_insert(0) += 1;
    }

    pub fn count(&self, style: &Style) -> usize {
        self.counts.get(style).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most frequent style; on equal counts the smaller style wins
    pub fn body_style(&self) -> Option<Style> {
        self.counts
            .iter()
            .max_by_key(|(style, count)| (**count, Reverse(**style)))
            .map(|(style, _)| *style)
    }

    /// Distinct styles, most prominent first
    pub fn ranked_styles(&self) -> Vec<Style> {
        let mut styles: Vec<Style> = self.counts.keys().copied().collect();
        styles.sort_by(|a, b| b.cmp(a));
        styles
    }
}

/// Build the style profile of a document's body text
pub fn profile_styles(doc: &SourceDocument, config: &OutlineConfig) -> StyleProfile {
    let mut profile = StyleProfile::new();

    for page in &doc.pages {
        let zone = BodyZone::for_page(page, config);
        for block in page.blocks.iter().filter(|b| zone.contains(&b.bbox)) {
            for span in block.spans() {
                profile.record(span.style());
            }
        }
    }

    log::debug!(
        "Profiled {} distinct styles for '{}', body style {:?}",
        profile.counts.len(),
        doc.name,
        profile.body_style()
    );

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Line, Span};

    fn block(y0: f32, y1: f32, spans: Vec<Span>) -> Block {
        Block::new(BBox::new(72.0, y0, 540.0, y1), vec![Line::new(spans)])
    }

    #[test]
    fn test_body_zone_is_exclusive() {
        let page = Page::new(1000.0, vec![]);
        let zone = BodyZone::for_page(&page, &OutlineConfig::default());
        assert!(zone.contains(&BBox::new(0.0, 100.5, 10.0, 899.5)));
        assert!(!zone.contains(&BBox::new(0.0, 100.0, 10.0, 200.0)));
        assert!(!zone.contains(&BBox::new(0.0, 800.0, 10.0, 900.0)));
        assert!(!zone.contains(&BBox::new(0.0, 50.0, 10.0, 150.0)));
    }

    #[test]
    fn test_body_style_is_most_common() {
        let doc = SourceDocument::new("d", vec![Page::new(
            1000.0,
            vec![
                block(200.0, 220.0, vec![Span::new("Heading", 18.0, true)]),
                block(
                    230.0,
                    400.0,
                    vec![
                        Span::new("one", 12.2, false),
                        Span::new("two", 11.8, false),
                        Span::new("three", 12.0, false),
                    ],
                ),
            ],
        )]);

        let profile = profile_styles(&doc, &OutlineConfig::default());
        assert_eq!(profile.body_style(), Some(Style::new(12, false)));
        assert_eq!(profile.count(&Style::new(12, false)), 3);
        assert_eq!(
            profile.ranked_styles(),
            vec![Style::new(18, true), Style::new(12, false)]
        );
    }

    #[test]
    fn test_footer_text_not_counted() {
        let doc = SourceDocument::new("d", vec![Page::new(
            1000.0,
            vec![
                block(950.0, 980.0, vec![Span::new("Confidential", 20.0, true)]),
                block(20.0, 60.0, vec![Span::new("Header", 20.0, true)]),
            ],
        )]);

        let profile = profile_styles(&doc, &OutlineConfig::default());
        assert!(profile.is_empty());
        assert_eq!(profile.body_style(), None);
        assert!(profile.ranked_styles().is_empty());
    }

    #[test]
    fn test_tie_prefers_smaller_style() {
        let mut profile = StyleProfile::new();
        profile.record(Style::new(14, false));
        profile.record(Style::new(10, false));
        profile.record(Style::new(10, true));
        assert_eq!(profile.body_style(), Some(Style::new(10, false)));

        profile.record(Style::new(14, false));
        assert_eq!(profile.body_style(), Some(Style::new(14, false)));
    }
}
