//! Document model shared by the extraction backend and the outline heuristics
//!
//! The backend fills a [`SourceDocument`] (pages of blocks, lines and spans,
//! plus metadata and the native bookmark tree); the heuristics only ever read
//! from it and produce a [`DocumentOutline`].

use serde::{Deserialize, Serialize};

/// A run of text drawn with a single font and size
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Rendered font size in points
    pub size: f32,
    /// Bold weight, from the font descriptor or the font name
    pub bold: bool,
    /// Base font name (subset prefix removed)
    pub font: String,
}

impl Span {
    pub fn new(text: impl Into<String>, size: f32, bold: bool) -> Self {
        Self {
            text: text.into(),
            size,
            bold,
            font: String::new(),
        }
    }

    pub fn style(&self) -> Style {
        Style::from_span(self)
    }
}

/// A line of spans sharing a baseline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Text of all spans joined with single spaces and trimmed
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// Style of the first span, `None` for a line with no spans
    pub fn style(&self) -> Option<Style> {
        self.spans.first().map(Span::style)
    }
}

/// Bounding box in top-down page coordinates (y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A layout block: consecutive lines with a common bounding box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub bbox: BBox,
    pub lines: Vec<Line>,
}

impl Block {
    pub fn new(bbox: BBox, lines: Vec<Line>) -> Self {
        Self { bbox, lines }
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }
}

/// One page of extracted content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Page height in points
    pub height: f32,
    /// Blocks in reading order
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(height: f32, blocks: Vec<Block>) -> Self {
        Self { height, blocks }
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks.iter().flat_map(Block::spans)
    }
}

/// An entry of the document's own bookmark tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Nesting depth, 1 for top-level bookmarks
    pub level: u32,
    pub title: String,
    /// 1-based target page, -1 when the destination does not resolve
    pub page: i32,
}

impl TocEntry {
    pub fn new(level: u32, title: impl Into<String>, page: i32) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}

/// Everything the outline heuristics need to know about one PDF
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDocument {
    /// File base name without extension
    pub name: String,
    pub pages: Vec<Page>,
    /// `/Title` from the document information dictionary
    pub metadata_title: Option<String>,
    /// Native bookmarks in reading order
    pub toc: Vec<TocEntry>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            name: name.into(),
            pages,
            ..Default::default()
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Discrete text style used as a classification key
///
/// Ordered by size, then weight (`bold: false` < `bold: true`), so sorting
/// in descending order puts the most prominent style first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Style {
    pub size: i32,
    pub bold: bool,
}

impl Style {
    pub fn new(size: i32, bold: bool) -> Self {
        Self { size, bold }
    }

    /// Round a raw font size to the nearest point, ties to even
    pub fn round_size(size: f32) -> i32 {
        size.round_ties_even() as i32
    }

    pub fn from_span(span: &Span) -> Self {
        Self::new(Self::round_size(span.size), span.bold)
    }

    /// Larger than `body`, or bold where body text is not
    pub fn is_more_prominent_than(&self, body: &Style) -> bool {
        self.size > body.size || (self.bold && !body.bold)
    }
}

/// Outline heading level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub const MAX_DEPTH: usize = 3;

    /// Map a 1-based depth onto a level, clamping deeper levels to H3
    pub fn from_depth(depth: u32) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Map a 0-based prominence rank onto a level
    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            0 => Some(HeadingLevel::H1),
            1 => Some(HeadingLevel::H2),
            2 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heading line found by the heuristic pass
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    pub style: Style,
    pub text: String,
    /// 1-based page number
    pub page: u32,
}

/// One entry of the produced outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: i32,
}

impl OutlineEntry {
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: i32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Extraction result, serialized as the JSON sidecar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}
