use anyhow::{anyhow, Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};

use super::document::{page_ids, PdfDocument};
use super::outline::Outline;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic /Parent chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// Builds a new PDF out of pages copied from one or more source documents.
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    /// Catalogs, page tree nodes and pages of imported sources; never written out
    retired: HashSet<ObjectId>,
    /// Source page -> its latest copy in the output
    copies: HashMap<ObjectId, ObjectId>,
}

/// A source document whose objects have been copied into a writer
pub struct ImportedPages {
    name: String,
    page_ids: Vec<ObjectId>,
}

impl ImportedPages {
    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        PdfWriter {
            doc,
            pages_id,
            kids: Vec::new(),
            retired: HashSet::new(),
            copies: HashMap::new(),
        }
    }

    /// Number of pages added so far
    pub fn page_count(&self) -> u32 {
        self.kids.len() as u32
    }

    /// Copy every object of `source` into this writer under fresh IDs.
    ///
    /// Nothing shows up in the output until pages are added with `add_page`.
    /// The source's own catalog and page tree are dropped on `finish`, along
    /// with every object only they reach.
    pub fn import(&mut self, source: &PdfDocument) -> ImportedPages {
        let mut doc = source.doc.clone();
        doc.renumber_objects_with(self.doc.max_id + 1);

        let page_ids = page_ids(&doc);
        if let Ok(root) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
            self.retired.insert(root);
        }
        for &page_id in &page_ids {
            self.retired.insert(page_id);
            self.retired.extend(ancestors(&doc, page_id));
        }
        self.doc.max_id = self.doc.max_id.max(doc.max_id);
        self.doc.objects.extend(doc.objects);

        ImportedPages {
            name: source.name.clone(),
            page_ids,
        }
    }

    /// Append the page at 0-based `index` of an imported document
    pub fn add_page(&mut self, source: &ImportedPages, index: u32) -> Result<()> {
        let page_id = *source.page_ids.get(index as usize).ok_or_else(|| {
            anyhow!(
                "Page {} is out of range (1-{}) in {}",
                index + 1,
                source.page_count(),
                source.name
            )
        })?;

        let mut page = flattened_page(&self.doc, page_id)
            .with_context(|| format!("Failed to copy page {} of {}", index + 1, source.name))?;
        page.set("Parent", Object::Reference(self.pages_id));

        let new_id = self.doc.new_object_id();
        if let Some(annots) = self.copy_annotations(&page, new_id) {
            page.set("Annots", Object::Array(annots));
        }
        self.doc.objects.insert(new_id, Object::Dictionary(page));
        self.copies.insert(page_id, new_id);
        self.kids.push(new_id);
        Ok(())
    }

    /// Give a copied page its own annotation objects, with `/P` pointing at it
    fn copy_annotations(&mut self, page: &Dictionary, new_page: ObjectId) -> Option<Vec<Object>> {
        let annots = match page.get(b"Annots").ok()? {
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .and_then(Object::as_array)
                .ok()?
                .clone(),
            Object::Array(items) => items.clone(),
            _ => return None,
        };

        let mut copied = Vec::with_capacity(annots.len());
        for annot in annots {
            copied.push(match annot {
                Object::Reference(id) => match self.doc.get_dictionary(id) {
                    Ok(dict) => {
                        let mut dict = dict.clone();
                        dict.set("P", Object::Reference(new_page));
                        Object::Reference(self.doc.add_object(dict))
                    }
                    Err(_) => Object::Reference(id),
                },
                Object::Dictionary(mut dict) => {
                    dict.set("P", Object::Reference(new_page));
                    Object::Dictionary(dict)
                }
                other => other,
            });
        }
        Some(copied)
    }

    /// Drop the imported sources' page trees. References into them go to the
    /// copy of the page where there is one and become null otherwise.
    fn detach_sources(&mut self) {
        for id in &self.retired {
            self.doc.objects.remove(id);
        }

        let retired = &self.retired;
        let copies = &self.copies;
        self.doc.traverse_objects(|object| {
            let Object::Reference(id) = *object else {
                return;
            };
            if let Some(&copy) = copies.get(&id) {
                *object = Object::Reference(copy);
            } else if retired.contains(&id) {
                *object = Object::Null;
            }
        });
    }

    /// Assemble the page tree and outline and serialize the document
    pub fn finish(mut self, outline: &Outline) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let pages = Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(i64::from(self.page_count()))),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]);
        if let Some(outlines_id) = outline.write(&mut self.doc, &self.kids)? {
            catalog.set("Outlines", Object::Reference(outlines_id));
            catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
        }
        let catalog_id = self.doc.add_object(catalog);

        self.doc.trailer = Dictionary::new();
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        self.detach_sources();
        self.doc.prune_objects();
        self.doc.renumber_objects();
        self.doc
            .trailer
            .set("Size", Object::Integer(i64::from(self.doc.max_id) + 1));
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .context("Failed to serialize PDF")?;
        Ok(buffer)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Page tree nodes above a page, nearest first
fn ancestors(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let mut found = Vec::new();
    let mut current = doc
        .get_dictionary(page_id)
        .and_then(|page| page.get(b"Parent"))
        .and_then(Object::as_reference)
        .ok();
    while let Some(id) = current {
        if found.len() >= MAX_TREE_DEPTH || found.contains(&id) {
            break;
        }
        found.push(id);
        current = doc
            .get_dictionary(id)
            .and_then(|node| node.get(b"Parent"))
            .and_then(Object::as_reference)
            .ok();
    }
    found
}

/// Clone a page dictionary, pulling in the attributes it inherits from the page tree
fn flattened_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc
        .get_dictionary(page_id)
        .context("Page object is not a dictionary")?
        .clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }

        depth += 1;
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}
