//! Span extraction from PDF content streams using lopdf
//!
//! Produces the page → block → line → span stream consumed by the outline
//! heuristics, with bounding boxes in top-down page coordinates.

use crate::model::{BBox, Block, Line, Page, Span};
use crate::PdfError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};

/// US Letter height, used when a page has no usable MediaBox
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Baselines closer than this belong to the same line
const LINE_Y_TOLERANCE: f32 = 3.0;

/// Consecutive lines further apart than this many line heights start a new block
const BLOCK_GAP_FACTOR: f32 = 1.6;

/// Glyph descent below the baseline, as a fraction of the font size
const DESCENT_RATIO: f32 = 0.2;

/// Average glyph advance, as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Font descriptor ForceBold flag (bit 19)
const FORCE_BOLD_FLAG: i64 = 1 << 18;

/// A text item with position information
#[derive(Debug, Clone)]
pub struct TextItem {
    /// The text content
    pub text: String,
    /// X position on page
    pub x: f32,
    /// Baseline Y position (PDF coordinates, origin at bottom-left)
    pub y: f32,
    /// Estimated width of text
    pub width: f32,
    /// Base font name
    pub font: String,
    /// Rendered font size
    pub font_size: f32,
    pub is_bold: bool,
}

/// A line of text (grouped text items)
#[derive(Debug, Clone)]
pub struct TextLine {
    pub items: Vec<TextItem>,
    pub y: f32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|i| i.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn max_font_size(&self) -> f32 {
        self.items.iter().map(|i| i.font_size).fold(0.0, f32::max)
    }
}

/// Vertical extent of a page's visible area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Y of the top edge in PDF coordinates
    pub top: f32,
    pub height: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            top: DEFAULT_PAGE_HEIGHT,
            height: DEFAULT_PAGE_HEIGHT,
        }
    }
}

impl PageGeometry {
    /// Convert a PDF y coordinate to a distance from the top edge
    pub fn to_top_down(&self, y: f32) -> f32 {
        self.top - y
    }
}

/// Font properties needed for styling spans
#[derive(Debug, Clone, Default)]
struct FontInfo {
    name: String,
    bold: bool,
}

/// Extract all pages of a document
///
/// A page whose content cannot be decoded is logged and kept empty so that
/// page numbering stays intact.
pub fn extract_pages(doc: &Document) -> Vec<Page> {
    doc.get_pages()
        .into_iter()
        .map(|(page_num, page_id)| match extract_page(doc, page_id) {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Skipping content of page {}: {}", page_num, e);
                Page::new(page_geometry(doc, page_id).height, Vec::new())
            }
        })
        .collect()
}

/// Extract the blocks of a single page
pub fn extract_page(doc: &Document, page_id: ObjectId) -> Result<Page, PdfError> {
    let geometry = page_geometry(doc, page_id);
    let items = extract_page_text_items(doc, page_id)?;
    let lines = group_into_lines(items);
    let blocks = group_into_blocks(lines, &geometry);
    Ok(Page::new(geometry.height, blocks))
}

/// Visible page area: the CropBox clipped to the MediaBox, or the MediaBox
///
/// Both boxes are inheritable through `/Parent`.
pub fn page_geometry(doc: &Document, page_id: ObjectId) -> PageGeometry {
    let media = inherited_box(doc, page_id, b"MediaBox");
    let crop = inherited_box(doc, page_id, b"CropBox");

    let visible = match (crop, media) {
        (Some(crop), Some(media)) => intersect_boxes(&crop, &media).unwrap_or(media),
        (Some(crop), None) => crop,
        (None, Some(media)) => media,
        (None, None) => return PageGeometry::default(),
    };

    PageGeometry {
        top: visible[3],
        height: visible[3] - visible[1],
    }
}

/// Look up a page box as `[x0, y0, x1, y1]` with `x0 < x1` and `y0 < y1`
fn inherited_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<[f32; 4]> {
    let mut node = doc.get_dictionary(page_id).ok();
    // Guards against Parent cycles in malformed files
    let mut depth = 0;

    while let Some(dict) = node {
        if let Some(array) = dict
            .get(key)
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
        {
            let coords: Vec<f32> = array
                .iter()
                .filter_map(|o| resolve(doc, o).and_then(get_number))
                .collect();
            if coords.len() >= 4 {
                let rect = [
                    coords[0].min(coords[2]),
                    coords[1].min(coords[3]),
                    coords[0].max(coords[2]),
                    coords[1].max(coords[3]),
                ];
                if rect[3] > rect[1] {
                    return Some(rect);
                }
            }
        }

        depth += 1;
        if depth > 32 {
            break;
        }
        node = dict
            .get(b"Parent")
            .ok()
            .and_then(|o| o.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }

    None
}

/// Overlap of two boxes, `None` when they share no area
fn intersect_boxes(a: &[f32; 4], b: &[f32; 4]) -> Option<[f32; 4]> {
    let rect = [
        a[0].max(b[0]),
        a[1].max(b[1]),
        a[2].min(b[2]),
        a[3].min(b[3]),
    ];
    (rect[2] > rect[0] && rect[3] > rect[1]).then_some(rect)
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translation(tx: f32, ty: f32) -> [f32; 6] {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

/// Text and graphics state while walking a content stream
struct TextState {
    ctm: [f32; 6],
    ctm_stack: Vec<[f32; 6]>,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    in_text_block: bool,
}

impl TextState {
    fn new() -> Self {
        Self {
            ctm: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            ctm_stack: Vec::new(),
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            text_matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            line_matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            in_text_block: false,
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply_matrices(&translation(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Approximate line height when the stream never sets TL
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    /// Record a shown string and advance the text position past it
    fn show(&mut self, text: String, fonts: &HashMap<Vec<u8>, FontInfo>, items: &mut Vec<TextItem>) {
        let advance = text.chars().count() as f32 * self.font_size * AVG_GLYPH_WIDTH;
        let combined = multiply_matrices(&self.text_matrix, &self.ctm);
        let scale = effective_scale(&combined);

        if !text.trim().is_empty() {
            let info = fonts.get(&self.font).cloned().unwrap_or_else(|| FontInfo {
                name: String::from_utf8_lossy(&self.font).to_string(),
                bold: false,
            });
            items.push(TextItem {
                text,
                x: combined[4],
                y: combined[5],
                width: advance * scale,
                font: info.name,
                font_size: self.font_size * scale,
                is_bold: info.bold,
            });
        }

        self.text_matrix = multiply_matrices(&translation(advance, 0.0), &self.text_matrix);
    }
}

/// Extract text items from a single page in content stream order
fn extract_page_text_items(doc: &Document, page_id: ObjectId) -> Result<Vec<TextItem>, PdfError> {
    use lopdf::content::Content;

    let mut items = Vec::new();

    // Get fonts for encoding
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let font_info = describe_fonts(doc, &fonts);

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::Parse(e.to_string()))?;

    let content = Content::decode(&content_data).map_err(|e| PdfError::Parse(e.to_string()))?;

    let mut state = TextState::new();

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => state.ctm_stack.push(state.ctm),
            "Q" => {
                if let Some(saved) = state.ctm_stack.pop() {
                    state.ctm = saved;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let new_matrix = [
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    ];
                    state.ctm = multiply_matrices(&new_matrix, &state.ctm);
                }
            }
            "BT" => {
                state.in_text_block = true;
                state.text_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                state.line_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
            }
            "ET" => state.in_text_block = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Ok(name) = op.operands[0].as_name() {
                        state.font = name.to_vec();
                    }
                    if let Some(size) = get_number(&op.operands[1]) {
                        state.font_size = size;
                    }
                }
            }
            "TL" => {
                if let Some(leading) = op.operands.first().and_then(get_number) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    for (i, operand) in op.operands.iter().take(6).enumerate() {
                        state.text_matrix[i] =
                            get_number(operand).unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 });
                    }
                    state.line_matrix = state.text_matrix;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if state.in_text_block && !op.operands.is_empty() {
                    if let Some(text) =
                        extract_text_from_operand(&op.operands[0], doc, &fonts, &state.font)
                    {
                        state.show(text, &font_info, &mut items);
                    }
                }
            }
            "TJ" => {
                if state.in_text_block && !op.operands.is_empty() {
                    if let Ok(array) = op.operands[0].as_array() {
                        let text = combine_tj_array(array, doc, &fonts, &state.font);
                        state.show(text, &font_info, &mut items);
                    }
                }
            }
            "'" => {
                state.next_line();
                if let Some(text) = op
                    .operands
                    .first()
                    .and_then(|o| extract_text_from_operand(o, doc, &fonts, &state.font))
                {
                    state.show(text, &font_info, &mut items);
                }
            }
            "\"" => {
                state.next_line();
                if let Some(text) = op
                    .operands
                    .get(2)
                    .and_then(|o| extract_text_from_operand(o, doc, &fonts, &state.font))
                {
                    state.show(text, &font_info, &mut items);
                }
            }
            _ => {}
        }
    }

    Ok(items)
}

/// Join the strings of a TJ array, turning wide negative kerns into spaces
fn combine_tj_array(
    array: &[Object],
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    current_font: &[u8],
) -> String {
    let mut combined = String::new();
    for item in array {
        match item {
            Object::Integer(_) | Object::Real(_) => {
                let kern = get_number(item).unwrap_or(0.0);
                if kern < -200.0 && !combined.is_empty() && !combined.ends_with(' ') {
                    combined.push(' ');
                }
            }
            _ => {
                if let Some(text) = extract_text_from_operand(item, doc, fonts, current_font) {
                    combined.push_str(&text);
                }
            }
        }
    }
    combined
}

/// Helper to get f32 from Object
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Follow an indirect reference, if any
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj).and_then(|o| o.as_dict().ok())
}

/// Decode a PDF text string (UTF-16BE with BOM, else UTF-8 or Latin-1)
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(text) = decode_utf16be(bytes) {
        return text;
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Decode bytes that start with the UTF-16BE byte order mark
fn decode_utf16be(bytes: &[u8]) -> Option<String> {
    let body = bytes.strip_prefix(&[0xFE, 0xFF])?;
    let utf16: Vec<u16> = body
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect();
    Some(String::from_utf16_lossy(&utf16))
}

/// Combined horizontal/vertical scale of a transformation matrix
fn effective_scale(matrix: &[f32; 6]) -> f32 {
    let scale_x = (matrix[0].powi(2) + matrix[1].powi(2)).sqrt();
    let scale_y = (matrix[2].powi(2) + matrix[3].powi(2)).sqrt();
    // Use the larger of the two scales (usually they're equal for non-rotated text)
    scale_x.max(scale_y)
}

/// Extract text from a text operand, handling encoding
fn extract_text_from_operand(
    obj: &Object,
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    current_font: &[u8],
) -> Option<String> {
    if let Object::String(bytes, _) = obj {
        // Try to decode using font encoding
        if let Some(font_dict) = fonts.get(current_font) {
            if let Ok(encoding) = font_dict.get_font_encoding(doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return Some(text);
                }
            }
        }

        // Fallback: try UTF-16BE then Latin-1
        decode_utf16be(bytes).or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
    } else {
        None
    }
}

/// Resolve base names and weights for a page's font resources
fn describe_fonts(
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
) -> HashMap<Vec<u8>, FontInfo> {
    fonts
        .iter()
        .map(|(resource, dict)| {
            let name = dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string())
                .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
            let bold = is_bold_font(&name) || descriptor_is_bold(doc, dict);
            (resource.clone(), FontInfo { name, bold })
        })
        .collect()
}

/// Check if font name indicates a bold weight
pub fn is_bold_font(font_name: &str) -> bool {
    font_name.to_lowercase().contains("bold")
}

/// Remove the `ABCDEF+` tag of subset-embedded fonts
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

fn descriptor_is_bold(doc: &Document, font: &Dictionary) -> bool {
    let Some(descriptor) = font_descriptor(doc, font) else {
        return false;
    };

    let heavy = descriptor
        .get(b"FontWeight")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(get_number)
        .is_some_and(|w| w >= 700.0);
    let force_bold = descriptor
        .get(b"Flags")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_i64().ok())
        .is_some_and(|f| f & FORCE_BOLD_FLAG != 0);

    heavy || force_bold
}

/// Font descriptor of a simple font, or of the first descendant of a Type0 font
fn font_descriptor<'a>(doc: &'a Document, font: &'a Dictionary) -> Option<&'a Dictionary> {
    if let Some(descriptor) = font
        .get(b"FontDescriptor")
        .ok()
        .and_then(|o| resolve_dict(doc, o))
    {
        return Some(descriptor);
    }

    let descendants = font
        .get(b"DescendantFonts")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())?;
    let descendant = descendants.first().and_then(|o| resolve_dict(doc, o))?;
    descendant
        .get(b"FontDescriptor")
        .ok()
        .and_then(|o| resolve_dict(doc, o))
}

/// Group items into lines
/// Preserves PDF stream order (which is typically reading order) and only groups
/// consecutive items on the same line by their X position.
pub fn group_into_lines(items: Vec<TextItem>) -> Vec<TextLine> {
    // DO NOT sort by Y - preserve PDF stream order which is usually reading order
    let mut lines: Vec<TextLine> = Vec::new();

    for item in items {
        match lines.last_mut() {
            Some(last) if (last.y - item.y).abs() < LINE_Y_TOLERANCE => last.items.push(item),
            _ => {
                let y = item.y;
                lines.push(TextLine {
                    items: vec![item],
                    y,
                });
            }
        }
    }

    // Sort items within each line by X position (left to right)
    for line in &mut lines {
        line.items
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }

    lines
}

/// Group consecutive, closely spaced lines into layout blocks
pub fn group_into_blocks(lines: Vec<TextLine>, geometry: &PageGeometry) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut prev: Option<(f32, f32)> = None;

    for line in lines {
        let size = line.max_font_size();
        let bbox = line_bbox(&line, geometry);

        // Baselines descend in PDF space while reading down the page
        let continues_block = prev.is_some_and(|(prev_y, prev_size)| {
            let gap = prev_y - line.y;
            gap > 0.0 && gap <= prev_size.max(size) * BLOCK_GAP_FACTOR
        });
        prev = Some((line.y, size));

        let spans = line
            .items
            .into_iter()
            .map(|item| Span {
                text: item.text,
                size: item.font_size,
                bold: item.is_bold,
                font: item.font,
            })
            .collect();
        let model_line = Line::new(spans);

        match blocks.last_mut() {
            Some(block) if continues_block => {
                block.bbox = block.bbox.union(&bbox);
                block.lines.push(model_line);
            }
            _ => blocks.push(Block::new(bbox, vec![model_line])),
        }
    }

    blocks
}

fn line_bbox(line: &TextLine, geometry: &PageGeometry) -> BBox {
    let size = line.max_font_size();
    let baseline = geometry.to_top_down(line.y);
    let x0 = line.items.iter().map(|i| i.x).fold(f32::INFINITY, f32::min);
    let x1 = line
        .items
        .iter()
        .map(|i| i.x + i.width)
        .fold(f32::NEG_INFINITY, f32::max);
    BBox::new(x0, baseline - size, x1, baseline + size * DESCENT_RATIO)
}
