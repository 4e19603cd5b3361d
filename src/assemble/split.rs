use anyhow::Result;
use clap::ValueEnum;
use tracing::debug;

use super::bookmark_title;
use crate::archive::ZipBuilder;
use crate::filename::base_name;
use crate::page_range::{PageRange, SelectionMap};
use crate::pdf::outline::BookmarkId;
use crate::pdf::writer::ImportedPages;
use crate::pdf::{Outline, PdfDocument, PdfWriter, SourceDocument};

/// How documents are cut into pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitMode {
    /// One piece per page
    All,
    /// One piece per range chosen for each document
    Ranges,
}

/// Result of a split: nothing, one consolidated PDF, or a zip of parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutput {
    None,
    Pdf(Vec<u8>),
    Zip(Vec<u8>),
}

impl SplitOutput {
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            SplitOutput::None => None,
            SplitOutput::Pdf(_) => Some("application/pdf"),
            SplitOutput::Zip(_) => Some("application/zip"),
        }
    }

    pub fn extension(&self) -> Option<&'static str> {
        match self {
            SplitOutput::None => None,
            SplitOutput::Pdf(_) => Some("pdf"),
            SplitOutput::Zip(_) => Some("zip"),
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            SplitOutput::None => None,
            SplitOutput::Pdf(bytes) | SplitOutput::Zip(bytes) => Some(bytes),
        }
    }
}

/// Cut `documents` into pieces.
///
/// With `consolidate`, every piece is appended to a single PDF whose outline
/// has one entry per document and one child per piece. Without it, each piece
/// becomes its own PDF named `<base>_p<label>.pdf` and all of them are zipped.
pub fn split(
    documents: &[SourceDocument],
    mode: SplitMode,
    selections: &SelectionMap,
    consolidate: bool,
) -> Result<SplitOutput> {
    let mut shared = consolidate.then(|| (PdfWriter::new(), Outline::new()));
    let mut parts: Vec<(String, Vec<u8>)> = Vec::new();

    for source in documents {
        let ranges = match mode {
            SplitMode::All => (1..=source.page_count).map(PageRange::single).collect(),
            SplitMode::Ranges => match selections.get(&source.name) {
                Some(ranges) if !ranges.is_empty() => ranges.clone(),
                _ => {
                    debug!(file = %source.name, "no ranges selected, skipping");
                    continue;
                }
            },
        };

        let pdf = source.open()?;
        match shared.as_mut() {
            Some((writer, outline)) => {
                let imported = writer.import(&pdf);
                let mut parent = None;
                for range in &ranges {
                    append_slice(writer, outline, &imported, source, range, &mut parent)?;
                }
            }
            None => {
                let base = base_name(&source.name);
                for range in &ranges {
                    if let Some(part) = standalone_slice(&pdf, source, range)? {
                        parts.push((format!("{}_p{}.pdf", base, range), part));
                    }
                }
            }
        }
    }

    if let Some((writer, outline)) = shared {
        if writer.page_count() == 0 {
            return Ok(SplitOutput::None);
        }
        return Ok(SplitOutput::Pdf(writer.finish(&outline)?));
    }

    if parts.is_empty() {
        return Ok(SplitOutput::None);
    }
    let mut zip = ZipBuilder::new();
    for (name, bytes) in &parts {
        zip.add(name, bytes)?;
    }
    Ok(SplitOutput::Zip(zip.finish()?))
}

/// Append one range to the consolidated output; only non-empty slices get bookmarks
fn append_slice(
    writer: &mut PdfWriter,
    outline: &mut Outline,
    imported: &ImportedPages,
    source: &SourceDocument,
    range: &PageRange,
    parent: &mut Option<BookmarkId>,
) -> Result<()> {
    let start_page = writer.page_count();
    for index in range.indexes() {
        writer.add_page(imported, index)?;
    }
    if writer.page_count() == start_page {
        return Ok(());
    }

    let parent_id =
        *parent.get_or_insert_with(|| outline.add(source.name.as_str(), start_page, None));
    outline.add(
        bookmark_title(&source.name, &range.to_string()),
        start_page,
        Some(parent_id),
    );
    debug!(file = %source.name, range = %range, start_page, "appended slice");
    Ok(())
}

/// One range as its own PDF, or `None` if it holds no pages
fn standalone_slice(
    pdf: &PdfDocument,
    source: &SourceDocument,
    range: &PageRange,
) -> Result<Option<Vec<u8>>> {
    let mut writer = PdfWriter::new();
    let imported = writer.import(pdf);
    for index in range.indexes() {
        writer.add_page(&imported, index)?;
    }
    if writer.page_count() == 0 {
        return Ok(None);
    }

    let mut outline = Outline::new();
    outline.add(bookmark_title(&source.name, &range.to_string()), 0, None);
    debug!(file = %source.name, range = %range, "extracted slice");
    writer.finish(&outline).map(Some)
}
