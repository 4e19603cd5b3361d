use anyhow::{Context, Result};
use lopdf::{Document, ObjectId};

/// A parsed source document, opened from an upload's bytes.
pub struct PdfDocument {
    pub doc: Document,
    pub name: String,
}

impl PdfDocument {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let doc =
            Document::load_mem(bytes).with_context(|| format!("Failed to open PDF: {}", name))?;
        Ok(PdfDocument {
            doc,
            name: name.to_string(),
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }
}

pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    // get_pages is keyed by 1-based page number, so values come out in order
    doc.get_pages().into_values().collect()
}
