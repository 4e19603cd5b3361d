//! In-memory PDFs for tests.
//!
//! Every page carries a `/Marker (<prefix>-<n>)` entry so tests can tell which
//! source page ended up where after pages are copied around.

use lopdf::{Dictionary, Document, Object, Stream, StringFormat};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Layout {
    Plain,
    Inherited,
    Linked,
}

pub fn sample_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    build(num_pages, prefix, Layout::Plain)
}

/// Like `sample_pdf`, but MediaBox and Resources live on the page tree root
/// and every page inherits them.
pub fn sample_pdf_with_inherited_attributes(num_pages: u32, prefix: &str) -> Vec<u8> {
    build(num_pages, prefix, Layout::Inherited)
}

/// Like `sample_pdf`, but every page has a Link annotation whose `/P` is the
/// page itself and whose `/Dest` is the next page (the last links to the first).
pub fn sample_pdf_with_links(num_pages: u32, prefix: &str) -> Vec<u8> {
    build(num_pages, prefix, Layout::Linked)
}

fn build(num_pages: u32, prefix: &str, layout: Layout) -> Vec<u8> {
    let inherited = layout == Layout::Inherited;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_ids: Vec<_> = (0..num_pages).map(|_| doc.new_object_id()).collect();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]);
    let media_box = Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]);

    let mut kids = Vec::new();
    for (page_num, &page_id) in (1..=num_pages).zip(&page_ids) {
        let marker = format!("{}-{}", prefix, page_num);
        let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", marker);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set(
            "Marker",
            Object::String(marker.into_bytes(), StringFormat::Literal),
        );
        if !inherited {
            page.set("MediaBox", media_box.clone());
            page.set("Resources", resources.clone());
        }
        if layout == Layout::Linked {
            let next = page_ids[page_num as usize % page_ids.len()];
            let link_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Annot".to_vec())),
                ("Subtype", Object::Name(b"Link".to_vec())),
                ("Rect", Object::Array(vec![50.into(), 690.into(), 150.into(), 710.into()])),
                ("P", Object::Reference(page_id)),
                (
                    "Dest",
                    Object::Array(vec![Object::Reference(next), Object::Name(b"Fit".to_vec())]),
                ),
            ]));
            page.set("Annots", Object::Array(vec![Object::Reference(link_id)]));
        }
        doc.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(i64::from(num_pages)));
    pages.set("Kids", Object::Array(kids));
    if inherited {
        pages.set("MediaBox", media_box);
        pages.set("Resources", resources);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// `/Marker` of every page, in page order
pub fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            match page.get(b"Marker") {
                Ok(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
                _ => String::new(),
            }
        })
        .collect()
}

pub fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

/// Number of `/Type /Page` objects in the file, whether or not the page tree uses them
pub fn page_object_count(bytes: &[u8]) -> usize {
    let doc = Document::load_mem(bytes).unwrap();
    doc.objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .filter(|dict| matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Page"))
        .count()
}
