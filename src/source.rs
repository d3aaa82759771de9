//! Loading PDFs into the [`SourceDocument`] model
//!
//! The parsed `lopdf::Document` never outlives these functions: everything
//! the heuristics need is copied out before it is dropped.

use crate::bookmarks::read_bookmarks;
use crate::extractor::{decode_pdf_string, extract_pages, resolve, resolve_dict};
use crate::model::SourceDocument;
use crate::PdfError;
use lopdf::{Document, Object};
use std::path::Path;

/// Load a PDF file
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<SourceDocument, PdfError> {
    let path = path.as_ref();
    let doc = Document::load(path)?;
    source_from_document(&doc, base_name(path))
}

/// Load a PDF from a memory buffer; `name` is the fallback title
pub fn load_source_mem(buffer: &[u8], name: &str) -> Result<SourceDocument, PdfError> {
    let doc = Document::load_mem(buffer)?;
    source_from_document(&doc, name.to_string())
}

/// Copy pages, metadata title and bookmarks out of a loaded document
pub fn source_from_document(doc: &Document, name: String) -> Result<SourceDocument, PdfError> {
    if doc.is_encrypted() {
        return Err(PdfError::Encrypted);
    }
    if doc.catalog().is_err() {
        return Err(PdfError::InvalidStructure);
    }

    let pages = extract_pages(doc);
    let toc = read_bookmarks(doc);
    let metadata_title = get_document_title(doc);

    log::debug!(
        "Loaded '{}': {} pages, {} bookmarks, metadata title {:?}",
        name,
        pages.len(),
        toc.len(),
        metadata_title
    );

    Ok(SourceDocument {
        name,
        pages,
        metadata_title,
        toc,
    })
}

/// File name without directory or extension
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Get document title from Info dictionary
fn get_document_title(doc: &Document) -> Option<String> {
    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|o| resolve_dict(doc, o))?;
    let title_obj = info.get(b"Title").ok().and_then(|o| resolve(doc, o))?;

    match title_obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_extension() {
        assert_eq!(base_name(Path::new("/data/in/Report.Final.PDF")), "Report.Final");
        assert_eq!(base_name(Path::new("notes.pdf")), "notes");
        assert_eq!(base_name(Path::new("")), "");
    }

    #[test]
    fn test_garbage_buffer_is_an_error() {
        let result = load_source_mem(b"definitely not a pdf", "junk");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }
}
