//! Document title resolution
//!
//! Candidates are tried in priority order: the largest text on the first
//! page, the metadata `/Title`, then the file name. Resolution never fails.

use crate::config::OutlineConfig;
use crate::gibberish::is_gibberish_with;
use crate::model::SourceDocument;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Title used when a document has no usable name at all
pub const UNTITLED: &str = "Untitled";

/// Outcome of looking for a title on the first page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstPageTitle {
    /// Largest-font text, whitespace collapsed
    Found(String),
    /// The document has no pages
    NoPage,
    /// The first page has no non-blank text
    NoText,
    /// The largest-font text looks like an extraction artifact
    Gibberish(String),
}

/// Where a resolved title came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    FirstPage,
    Metadata,
    FileName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    pub text: String,
    pub source: TitleSource,
}

/// Find the document title with default thresholds
pub fn find_title(doc: &SourceDocument) -> String {
    resolve_title(doc, &OutlineConfig::default()).text
}

/// Resolve the title and report which fallback produced it
pub fn resolve_title(doc: &SourceDocument, config: &OutlineConfig) -> ResolvedTitle {
    match first_page_title(doc, config) {
        FirstPageTitle::Found(text) => {
            return ResolvedTitle {
                text,
                source: TitleSource::FirstPage,
            }
        }
        other => log::debug!("No first-page title for '{}': {:?}", doc.name, other),
    }

    if let Some(text) = metadata_title(doc) {
        return ResolvedTitle {
            text,
            source: TitleSource::Metadata,
        };
    }

    ResolvedTitle {
        text: file_name_title(doc),
        source: TitleSource::FileName,
    }
}

/// Collect the spans set in the largest font on page 1
pub fn first_page_title(doc: &SourceDocument, config: &OutlineConfig) -> FirstPageTitle {
    let Some(page) = doc.pages.first() else {
        return FirstPageTitle::NoPage;
    };

    let max_size = page
        .spans()
        .map(|s| s.size)
        .fold(None, |acc: Option<f32>, size| {
            Some(acc.map_or(size, |m| m.max(size)))
        });

    let Some(max_size) = max_size else {
        return FirstPageTitle::NoText;
    };

    let joined = page
        .spans()
        .filter(|s| (s.size - max_size).abs() < config.title_size_tolerance)
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let candidate = joined.trim();

    if candidate.is_empty() {
        return FirstPageTitle::NoText;
    }
    if is_gibberish_with(candidate, &config.gibberish) {
        return FirstPageTitle::Gibberish(candidate.to_string());
    }

    FirstPageTitle::Found(collapse_whitespace(candidate))
}

/// Non-blank `/Title` from the document information dictionary
pub fn metadata_title(doc: &SourceDocument) -> Option<String> {
    doc.metadata_title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
}

fn file_name_title(doc: &SourceDocument) -> String {
    let name = doc.name.trim();
    if name.is_empty() {
        UNTITLED.to_string()
    } else {
        name.to_string()
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Block, Line, Page, Span};

    fn page_with(spans: Vec<Span>) -> Page {
        let lines = spans.into_iter().map(|s| Line::new(vec![s])).collect();
        Page::new(792.0, vec![Block::new(BBox::new(72.0, 100.0, 500.0, 300.0), lines)])
    }

    #[test]
    fn test_largest_spans_joined_in_order() {
        let mut doc = SourceDocument::new("report", vec![page_with(vec![
            Span::new("Annual", 24.0, true),
            Span::new("prepared by the board", 12.0, false),
            Span::new("Report   2024", 24.04, true),
        ])]);
        doc.metadata_title = Some("Ignored".into());

        let resolved = resolve_title(&doc, &OutlineConfig::default());
        assert_eq!(resolved.text, "Annual Report 2024");
        assert_eq!(resolved.source, TitleSource::FirstPage);
    }

    #[test]
    fn test_size_outside_tolerance_excluded() {
        let doc = SourceDocument::new("x", vec![page_with(vec![
            Span::new("Main", 20.0, false),
            Span::new("Sub", 19.8, false),
        ])]);
        assert_eq!(find_title(&doc), "Main");
    }

    #[test]
    fn test_gibberish_falls_back_to_metadata() {
        let mut doc = SourceDocument::new("file", vec![page_with(vec![Span::new(
            "T h e T i t l e",
            30.0,
            false,
        )])]);
        doc.metadata_title = Some("The Title".into());

        assert!(matches!(
            first_page_title(&doc, &OutlineConfig::default()),
            FirstPageTitle::Gibberish(_)
        ));
        let resolved = resolve_title(&doc, &OutlineConfig::default());
        assert_eq!(resolved.text, "The Title");
        assert_eq!(resolved.source, TitleSource::Metadata);
    }

    #[test]
    fn test_no_pages_uses_file_name() {
        let doc = SourceDocument::new("quarterly-summary", vec![]);
        assert_eq!(
            first_page_title(&doc, &OutlineConfig::default()),
            FirstPageTitle::NoPage
        );
        let resolved = resolve_title(&doc, &OutlineConfig::default());
        assert_eq!(resolved.text, "quarterly-summary");
        assert_eq!(resolved.source, TitleSource::FileName);
    }

    #[test]
    fn test_blank_page_and_blank_metadata() {
        let mut doc = SourceDocument::new("scan", vec![Page::new(792.0, vec![])]);
        doc.metadata_title = Some("   ".into());
        assert_eq!(
            first_page_title(&doc, &OutlineConfig::default()),
            FirstPageTitle::NoText
        );
        assert_eq!(find_title(&doc), "scan");
    }

    #[test]
    fn test_never_empty() {
        let doc = SourceDocument::default();
        assert_eq!(find_title(&doc), UNTITLED);
    }
}
