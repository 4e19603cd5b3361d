use anyhow::{anyhow, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

/// Bookmark tree for a document being assembled.
///
/// Nodes are stored in insertion order; each keeps the ordered list of its
/// children, so the nesting never depends on the order bookmarks were added.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    nodes: Vec<OutlineNode>,
    roots: Vec<usize>,
}

#[derive(Debug, Clone)]
struct OutlineNode {
    title: String,
    /// 0-based page index in the output document
    page_index: u32,
    children: Vec<usize>,
}

/// Handle to a bookmark, used to nest further bookmarks under it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookmarkId(usize);

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        page_index: u32,
        parent: Option<BookmarkId>,
    ) -> BookmarkId {
        let id = self.nodes.len();
        self.nodes.push(OutlineNode {
            title: title.into(),
            page_index,
            children: Vec::new(),
        });
        match parent {
            Some(BookmarkId(parent)) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }
        BookmarkId(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Write the tree as an /Outlines dictionary into `doc`.
    ///
    /// `pages` maps output page indexes to page object IDs. Returns `None` when
    /// there is nothing to write.
    pub(crate) fn write(&self, doc: &mut Document, pages: &[ObjectId]) -> Result<Option<ObjectId>> {
        if self.is_empty() {
            return Ok(None);
        }

        let outlines_id = doc.new_object_id();
        let ids: Vec<ObjectId> = self.nodes.iter().map(|_| doc.new_object_id()).collect();
        let visible = self.write_level(doc, &self.roots, outlines_id, &ids, pages)?;

        let mut outlines = Dictionary::new();
        outlines.set("Type", Object::Name(b"Outlines".to_vec()));
        outlines.set("First", Object::Reference(ids[self.roots[0]]));
        outlines.set("Last", Object::Reference(ids[self.roots[self.roots.len() - 1]]));
        outlines.set("Count", Object::Integer(visible));
        doc.objects.insert(outlines_id, Object::Dictionary(outlines));

        Ok(Some(outlines_id))
    }

    /// Returns how many items this level shows, counting open descendants
    fn write_level(
        &self,
        doc: &mut Document,
        level: &[usize],
        parent: ObjectId,
        ids: &[ObjectId],
        pages: &[ObjectId],
    ) -> Result<i64> {
        let mut visible = 0;

        for (pos, &node_index) in level.iter().enumerate() {
            let node = &self.nodes[node_index];
            let page_id = pages.get(node.page_index as usize).copied().ok_or_else(|| {
                anyhow!(
                    "Bookmark '{}' points at page {} but the document has {} page(s)",
                    node.title,
                    node.page_index + 1,
                    pages.len()
                )
            })?;

            let mut item = Dictionary::new();
            item.set(
                "Title",
                Object::String(encode_text_string(&node.title), StringFormat::Hexadecimal),
            );
            item.set("Parent", Object::Reference(parent));
            item.set(
                "Dest",
                Object::Array(vec![
                    Object::Reference(page_id),
                    Object::Name(b"Fit".to_vec()),
                ]),
            );
            if pos > 0 {
                item.set("Prev", Object::Reference(ids[level[pos - 1]]));
            }
            if let Some(&next) = level.get(pos + 1) {
                item.set("Next", Object::Reference(ids[next]));
            }

            if let (Some(&first), Some(&last)) = (node.children.first(), node.children.last()) {
                let descendants =
                    self.write_level(doc, &node.children, ids[node_index], ids, pages)?;
                item.set("First", Object::Reference(ids[first]));
                item.set("Last", Object::Reference(ids[last]));
                item.set("Count", Object::Integer(descendants));
                visible += descendants;
            }

            doc.objects.insert(ids[node_index], Object::Dictionary(item));
            visible += 1;
        }

        Ok(visible)
    }
}

/// PDF text string: UTF-16BE with a byte order mark
fn encode_text_string(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::PdfDocument;
    use crate::pdf::fixtures::sample_pdf;
    use crate::pdf::toc::{flatten_toc, read_toc};
    use crate::pdf::writer::PdfWriter;

    fn write_with(outline: &Outline, pages: u32) -> Vec<u8> {
        let source = PdfDocument::from_bytes("src.pdf", &sample_pdf(pages, "S")).unwrap();
        let mut writer = PdfWriter::new();
        let imported = writer.import(&source);
        for index in 0..pages {
            writer.add_page(&imported, index).unwrap();
        }
        writer.finish(outline).unwrap()
    }

    #[test]
    fn test_written_outline_reads_back() {
        let mut outline = Outline::new();
        let a = outline.add("a.pdf", 0, None);
        outline.add("a.pdf - páginas 1", 0, Some(a));
        outline.add("a.pdf - páginas 2-3", 1, Some(a));
        outline.add("b.pdf", 3, None);

        let bytes = write_with(&outline, 4);
        let toc = read_toc(&bytes).unwrap();
        let flat: Vec<_> = flatten_toc(&toc)
            .into_iter()
            .map(|e| (e.level, e.title, e.page))
            .collect();
        assert_eq!(
            flat,
            vec![
                (0, "a.pdf".to_string(), Some(1)),
                (1, "a.pdf - páginas 1".to_string(), Some(1)),
                (1, "a.pdf - páginas 2-3".to_string(), Some(2)),
                (0, "b.pdf".to_string(), Some(4)),
            ]
        );
    }

    #[test]
    fn test_empty_outline_writes_nothing() {
        let bytes = write_with(&Outline::new(), 2);
        assert!(read_toc(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_dangling_page_index_fails() {
        let mut outline = Outline::new();
        outline.add("late", 5, None);
        let source = PdfDocument::from_bytes("src.pdf", &sample_pdf(1, "S")).unwrap();
        let mut writer = PdfWriter::new();
        let imported = writer.import(&source);
        writer.add_page(&imported, 0).unwrap();
        let err = writer.finish(&outline).unwrap_err();
        assert!(err.to_string().contains("late"));
    }

    #[test]
    fn test_text_string_encoding() {
        assert_eq!(encode_text_string("á"), vec![0xFE, 0xFF, 0x00, 0xE1]);
    }
}
