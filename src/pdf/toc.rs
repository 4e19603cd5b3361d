use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct TocEntry {
    pub title: String,
    /// 1-based page the bookmark jumps to, if it could be resolved
    pub page: Option<u32>,
    pub level: u32,
    pub children: Vec<TocEntry>,
}

/// Read the bookmark tree of a PDF held in memory
pub fn read_toc(bytes: &[u8]) -> Result<Vec<TocEntry>> {
    let doc = Document::load_mem(bytes).context("Failed to open PDF")?;
    extract_toc_from_doc(&doc)
}

pub fn extract_toc_from_doc(doc: &Document) -> Result<Vec<TocEntry>> {
    let catalog = doc.catalog().context("Failed to get document catalog")?;

    let Some(outlines) = catalog
        .get(b"Outlines")
        .and_then(Object::as_reference)
        .ok()
        .and_then(|id| doc.get_dictionary(id).ok())
    else {
        return Ok(Vec::new());
    };

    let Ok(first) = outlines.get(b"First").and_then(Object::as_reference) else {
        return Ok(Vec::new());
    };

    let reader = OutlineReader {
        doc,
        page_map: doc
            .get_pages()
            .into_iter()
            .map(|(num, id)| (id, num))
            .collect(),
    };
    let mut seen = HashSet::new();
    Ok(reader.read_level(first, 0, &mut seen))
}

struct OutlineReader<'a> {
    doc: &'a Document,
    page_map: HashMap<ObjectId, u32>,
}

impl OutlineReader<'_> {
    fn read_level(&self, first: ObjectId, level: u32, seen: &mut HashSet<ObjectId>) -> Vec<TocEntry> {
        let mut entries = Vec::new();
        let mut current = Some(first);

        while let Some(id) = current {
            // Sibling and child links can loop in damaged files
            if !seen.insert(id) {
                break;
            }
            let Ok(item) = self.doc.get_dictionary(id) else {
                break;
            };

            let title = match item.get(b"Title") {
                Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
                _ => "Untitled".to_string(),
            };
            let children = match item.get(b"First").and_then(Object::as_reference) {
                Ok(child) => self.read_level(child, level + 1, seen),
                Err(_) => Vec::new(),
            };

            entries.push(TocEntry {
                title,
                page: self.target_page(item),
                level,
                children,
            });

            current = item.get(b"Next").and_then(Object::as_reference).ok();
        }

        entries
    }

    fn target_page(&self, item: &Dictionary) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.resolve(dest);
        }

        // GoTo action, inline or by reference
        let action = match item.get(b"A").ok()? {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        match action.get(b"S") {
            Ok(Object::Name(kind)) if kind == b"GoTo" => self.resolve(action.get(b"D").ok()?),
            _ => None,
        }
    }

    fn resolve(&self, dest: &Object) -> Option<u32> {
        match dest {
            Object::Array(arr) => match arr.first() {
                Some(Object::Reference(page_id)) => self.page_map.get(page_id).copied(),
                _ => None,
            },
            Object::Reference(id) => self.resolve(self.doc.get_object(*id).ok()?),
            // Some writers wrap the array as << /D [...] >>
            Object::Dictionary(dict) => self.resolve(dict.get(b"D").ok()?),
            Object::String(name, _) | Object::Name(name) => self.resolve_named(name),
            _ => None,
        }
    }

    fn resolve_named(&self, name: &[u8]) -> Option<u32> {
        let catalog = self.doc.catalog().ok()?;

        let names_tree = catalog
            .get(b"Names")
            .and_then(Object::as_reference)
            .and_then(|id| self.doc.get_dictionary(id))
            .and_then(|names| names.get(b"Dests"))
            .and_then(Object::as_reference);
        if let Ok(root) = names_tree {
            if let Some(page) = self.search_name_tree(root, name, 0) {
                return Some(page);
            }
        }

        // PDF 1.1 style /Dests dictionary
        let dests = catalog
            .get(b"Dests")
            .and_then(Object::as_reference)
            .and_then(|id| self.doc.get_dictionary(id))
            .ok()?;
        self.resolve(dests.get(name).ok()?)
    }

    fn search_name_tree(&self, node_id: ObjectId, name: &[u8], depth: usize) -> Option<u32> {
        if depth > 32 {
            return None;
        }
        let node = self.doc.get_dictionary(node_id).ok()?;

        if let Ok(Object::Array(names)) = node.get(b"Names") {
            for pair in names.chunks_exact(2) {
                if let Object::String(key, _) = &pair[0] {
                    if key.as_slice() == name {
                        return self.resolve(&pair[1]);
                    }
                }
            }
        }

        if let Ok(Object::Array(kids)) = node.get(b"Kids") {
            for kid in kids {
                if let Object::Reference(kid_id) = kid {
                    if let Some(page) = self.search_name_tree(*kid_id, name, depth + 1) {
                        return Some(page);
                    }
                }
            }
        }

        None
    }
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(utf8).into_owned()
    } else {
        // PDFDocEncoding, approximated as Latin-1
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Flatten TOC entries into a simple list with indentation info
pub fn flatten_toc(entries: &[TocEntry]) -> Vec<FlatTocEntry> {
    let mut result = Vec::new();
    flatten_into(entries, &mut result);
    result
}

fn flatten_into(entries: &[TocEntry], result: &mut Vec<FlatTocEntry>) {
    for entry in entries {
        result.push(FlatTocEntry {
            title: entry.title.clone(),
            page: entry.page,
            level: entry.level,
        });
        flatten_into(&entry.children, result);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTocEntry {
    pub title: String,
    pub page: Option<u32>,
    pub level: u32,
}
