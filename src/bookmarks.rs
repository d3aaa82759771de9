//! Native bookmark (document outline) reading
//!
//! Flattens the `/Outlines` tree into `(level, title, page)` entries in
//! reading order. Destinations are resolved to 1-based page numbers, or -1
//! when they point nowhere in this document.

use crate::extractor::{decode_pdf_string, resolve, resolve_dict};
use crate::model::TocEntry;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};

/// Nesting and indirection limit for malformed files
const MAX_DEPTH: u32 = 64;

/// Page number recorded for bookmarks without a resolvable destination
pub const UNRESOLVED_PAGE: i32 = -1;

/// Read the document's bookmark tree; empty when there is none
pub fn read_bookmarks(doc: &Document) -> Vec<TocEntry> {
    let Some(first) = doc
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Outlines").ok())
        .and_then(|o| resolve_dict(doc, o))
        .and_then(|outlines| outlines.get(b"First").ok())
        .and_then(|o| o.as_reference().ok())
    else {
        return Vec::new();
    };

    let reader = BookmarkReader {
        doc,
        pages: doc
            .get_pages()
            .into_iter()
            .map(|(num, id)| (id, num))
            .collect(),
    };

    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    reader.walk_siblings(first, 1, &mut visited, &mut entries);
    entries
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}

struct BookmarkReader<'a> {
    doc: &'a Document,
    /// Page object id → 1-based page number
    pages: HashMap<ObjectId, u32>,
}

impl<'a> BookmarkReader<'a> {
    /// Visit a `First`/`Next` chain, descending into children depth-first
    fn walk_siblings(
        &self,
        first: ObjectId,
        level: u32,
        visited: &mut HashSet<ObjectId>,
        entries: &mut Vec<TocEntry>,
    ) {
        if level > MAX_DEPTH {
            log::warn!("Bookmark tree nested deeper than {} levels, truncating", MAX_DEPTH);
            return;
        }

        let mut current = Some(first);
        while let Some(id) = current {
            if !visited.insert(id) {
                log::warn!("Bookmark cycle at object {:?}, stopping", id);
                return;
            }
            let Ok(item) = self.doc.get_dictionary(id) else {
                log::warn!("Bookmark object {:?} is not a dictionary", id);
                return;
            };

            let title = item
                .get(b"Title")
                .ok()
                .and_then(|o| resolve(self.doc, o))
                .and_then(string_bytes)
                .map(decode_pdf_string)
                .unwrap_or_default();
            let page = self
                .destination_page(item)
                .map_or(UNRESOLVED_PAGE, |p| p as i32);
            entries.push(TocEntry::new(level, title, page));

            if let Some(child) = item.get(b"First").ok().and_then(|o| o.as_reference().ok()) {
                self.walk_siblings(child, level + 1, visited, entries);
            }

            current = item.get(b"Next").ok().and_then(|o| o.as_reference().ok());
        }
    }

    /// Page targeted by an outline item's `/Dest` or GoTo action
    fn destination_page(&self, item: &Dictionary) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.resolve_destination(dest, 0);
        }

        let action = item.get(b"A").ok().and_then(|o| resolve_dict(self.doc, o))?;
        let is_goto = action
            .get(b"S")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map_or(true, |s| s == b"GoTo");
        if !is_goto {
            return None;
        }
        self.resolve_destination(action.get(b"D").ok()?, 0)
    }

    fn resolve_destination(&self, dest: &Object, depth: u32) -> Option<u32> {
        if depth > MAX_DEPTH {
            return None;
        }

        match resolve(self.doc, dest)? {
            Object::Array(array) => match array.first()? {
                Object::Reference(page_id) => self.pages.get(page_id).copied(),
                // Page index form used by some producers
                Object::Integer(index) => u32::try_from(*index)
                    .ok()
                    .filter(|i| (*i as usize) < self.pages.len())
                    .map(|i| i + 1),
                _ => None,
            },
            Object::Dictionary(dict) => self.resolve_destination(dict.get(b"D").ok()?, depth + 1),
            Object::Name(name) => self.resolve_named(name, depth),
            Object::String(name, _) => self.resolve_named(name, depth),
            _ => None,
        }
    }

    /// Look a named destination up in `/Dests` or the `/Names` tree
    fn resolve_named(&self, name: &[u8], depth: u32) -> Option<u32> {
        let catalog = self.doc.catalog().ok()?;

        let from_dests = catalog
            .get(b"Dests")
            .ok()
            .and_then(|o| resolve_dict(self.doc, o))
            .and_then(|dests| dests.get(name).ok());

        let target = from_dests.or_else(|| {
            let tree = catalog
                .get(b"Names")
                .ok()
                .and_then(|o| resolve_dict(self.doc, o))?
                .get(b"Dests")
                .ok()
                .and_then(|o| resolve_dict(self.doc, o))?;
            self.search_name_tree(tree, name, 0)
        })?;

        self.resolve_destination(target, depth + 1)
    }

    fn search_name_tree(&self, node: &'a Dictionary, name: &[u8], depth: u32) -> Option<&'a Object> {
        if depth > MAX_DEPTH {
            return None;
        }

        if let Some(names) = node
            .get(b"Names")
            .ok()
            .and_then(|o| resolve(self.doc, o))
            .and_then(|o| o.as_array().ok())
        {
            for pair in names.chunks_exact(2) {
                let key = resolve(self.doc, &pair[0]).and_then(string_bytes);
                if key == Some(name) {
                    return Some(&pair[1]);
                }
            }
        }

        let kids = node
            .get(b"Kids")
            .ok()
            .and_then(|o| resolve(self.doc, o))
            .and_then(|o| o.as_array().ok())?;
        kids.iter()
            .filter_map(|kid| resolve_dict(self.doc, kid))
            .find_map(|kid| self.search_name_tree(kid, name, depth + 1))
    }
}
