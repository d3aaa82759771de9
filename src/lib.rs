//! PDF outline extraction using lopdf
//!
//! This crate provides:
//! - Span extraction (text, size, weight, bounding box) from PDF content streams
//! - Title resolution from the first page, metadata or file name
//! - Heading inference by font style, with header/footer and gibberish filtering
//! - Native bookmark outlines when the document carries enough of them
//! - Batch conversion of a directory of PDFs to JSON outline files

pub mod batch;
pub mod bookmarks;
pub mod config;
pub mod extractor;
pub mod gibberish;
pub mod model;
pub mod outline;
pub mod source;
pub mod styles;
pub mod title;

pub use config::{GibberishConfig, OutlineConfig};
pub use gibberish::is_gibberish;
pub use model::{
    BBox, Block, DocumentOutline, HeadingLevel, Line, OutlineEntry, Page, SourceDocument, Span,
    Style, TocEntry,
};
pub use outline::{extract_outline, extract_outline_with_config, OutlineSource};
pub use source::{load_source, load_source_mem};
pub use styles::{profile_styles, StyleProfile};
pub use title::find_title;

use std::path::Path;

/// High-level outline extraction result
#[derive(Debug)]
pub struct PdfProcessResult {
    /// Title and outline, ready to serialize
    pub outline: DocumentOutline,
    /// Strategy that produced the outline
    pub source: OutlineSource,
    /// Page count
    pub page_count: u32,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Extract the outline of a PDF file with default thresholds
pub fn process_pdf<P: AsRef<Path>>(path: P) -> Result<PdfProcessResult, PdfError> {
    process_pdf_with_config(path, &OutlineConfig::default())
}

/// Extract the outline of a PDF file
pub fn process_pdf_with_config<P: AsRef<Path>>(
    path: P,
    config: &OutlineConfig,
) -> Result<PdfProcessResult, PdfError> {
    let start = std::time::Instant::now();
    let doc = load_source(path)?;
    Ok(finish(&doc, config, start))
}

/// Extract the outline of a PDF held in memory; `name` is the fallback title
pub fn process_pdf_mem(buffer: &[u8], name: &str) -> Result<PdfProcessResult, PdfError> {
    process_pdf_mem_with_config(buffer, name, &OutlineConfig::default())
}

pub fn process_pdf_mem_with_config(
    buffer: &[u8],
    name: &str,
    config: &OutlineConfig,
) -> Result<PdfProcessResult, PdfError> {
    let start = std::time::Instant::now();
    let doc = load_source_mem(buffer, name)?;
    Ok(finish(&doc, config, start))
}

fn finish(doc: &SourceDocument, config: &OutlineConfig, start: std::time::Instant) -> PdfProcessResult {
    let (outline, source) = extract_outline_with_config(doc, config);
    PdfProcessResult {
        outline,
        source,
        page_count: doc.page_count() as u32,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("Invalid PDF structure")]
    InvalidStructure,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Parse(e.to_string())
    }
}
