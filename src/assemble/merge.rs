use anyhow::Result;
use clap::ValueEnum;
use tracing::debug;

use super::bookmark_title;
use crate::page_range::{format_ranges, SelectionMap};
use crate::pdf::{Outline, PdfWriter, SourceDocument};

/// Which pages each document contributes to a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MergeMode {
    /// Every page
    All,
    /// Only the first page
    First,
    /// Only the last page
    Last,
    /// The ranges chosen for each document
    Selected,
}

/// Merge pages of `documents` into one PDF with a bookmark per document.
///
/// In `Selected` mode a document without ranges in `selections` is skipped.
/// Callers reject an empty document list before getting here.
pub fn merge(
    documents: &[SourceDocument],
    mode: MergeMode,
    selections: &SelectionMap,
) -> Result<Vec<u8>> {
    let mut writer = PdfWriter::new();
    let mut outline = Outline::new();

    for source in documents {
        let Some((indexes, title)) = contribution(source, mode, selections) else {
            debug!(file = %source.name, "document contributes no pages");
            continue;
        };

        let pdf = source.open()?;
        let imported = writer.import(&pdf);
        let start_page = writer.page_count();
        for index in &indexes {
            writer.add_page(&imported, *index)?;
        }

        outline.add(title, start_page, None);
        debug!(file = %source.name, pages = indexes.len(), start_page, "merged document");
    }

    writer.finish(&outline)
}

/// 0-based pages a document contributes and the title of its bookmark
fn contribution(
    source: &SourceDocument,
    mode: MergeMode,
    selections: &SelectionMap,
) -> Option<(Vec<u32>, String)> {
    if source.page_count == 0 {
        return None;
    }

    let (indexes, title) = match mode {
        MergeMode::All => ((0..source.page_count).collect(), source.name.clone()),
        MergeMode::First => (vec![0], source.name.clone()),
        MergeMode::Last => (vec![source.page_count - 1], source.name.clone()),
        MergeMode::Selected => {
            let ranges = selections.get(&source.name)?;
            let indexes = ranges.iter().flat_map(|range| range.indexes()).collect();
            (indexes, bookmark_title(&source.name, &format_ranges(ranges)))
        }
    };

    if indexes.is_empty() {
        None
    } else {
        Some((indexes, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::{parse_ranges, PageRange};
    use crate::pdf::fixtures::{page_markers, sample_pdf};
    use crate::pdf::loader::{load, Upload};
    use crate::pdf::toc::{flatten_toc, read_toc};

    fn documents(specs: &[(&str, u32, &str)]) -> Vec<SourceDocument> {
        let uploads = specs
            .iter()
            .map(|&(name, pages, prefix)| Upload {
                name: name.to_string(),
                bytes: sample_pdf(pages, prefix),
            })
            .collect();
        load(uploads).documents
    }

    fn bookmarks(bytes: &[u8]) -> Vec<(u32, String, Option<u32>)> {
        flatten_toc(&read_toc(bytes).unwrap())
            .into_iter()
            .map(|e| (e.level, e.title, e.page))
            .collect()
    }

    #[test]
    fn test_all_pages() {
        let docs = documents(&[("a.pdf", 2, "A"), ("b.pdf", 3, "B")]);
        let merged = merge(&docs, MergeMode::All, &SelectionMap::new()).unwrap();

        assert_eq!(page_markers(&merged), vec!["A-1", "A-2", "B-1", "B-2", "B-3"]);
        assert_eq!(
            bookmarks(&merged),
            vec![
                (0, "a.pdf".to_string(), Some(1)),
                (0, "b.pdf".to_string(), Some(3)),
            ]
        );
    }

    #[test]
    fn test_first_pages() {
        let docs = documents(&[("a.pdf", 3, "A"), ("b.pdf", 3, "B")]);
        let merged = merge(&docs, MergeMode::First, &SelectionMap::new()).unwrap();

        assert_eq!(page_markers(&merged), vec!["A-1", "B-1"]);
        assert_eq!(
            bookmarks(&merged),
            vec![
                (0, "a.pdf".to_string(), Some(1)),
                (0, "b.pdf".to_string(), Some(2)),
            ]
        );
    }

    #[test]
    fn test_last_pages() {
        let docs = documents(&[("a.pdf", 3, "A"), ("b.pdf", 1, "B")]);
        let merged = merge(&docs, MergeMode::Last, &SelectionMap::new()).unwrap();
        assert_eq!(page_markers(&merged), vec!["A-3", "B-1"]);
    }

    #[test]
    fn test_selected_pages_follow_selection_order() {
        let docs = documents(&[("a.pdf", 10, "A"), ("b.pdf", 4, "B")]);
        let mut selections = SelectionMap::new();
        selections.insert("a.pdf".to_string(), parse_ranges("9:10, 2, 2", 10).ranges);
        selections.insert("b.pdf".to_string(), vec![PageRange::new(3, 4)]);

        let merged = merge(&docs, MergeMode::Selected, &selections).unwrap();
        assert_eq!(
            page_markers(&merged),
            vec!["A-9", "A-10", "A-2", "A-2", "B-3", "B-4"]
        );
        assert_eq!(
            bookmarks(&merged),
            vec![
                (0, "a.pdf - páginas 9-10, 2, 2".to_string(), Some(1)),
                (0, "b.pdf - páginas 3-4".to_string(), Some(5)),
            ]
        );
    }

    #[test]
    fn test_selected_without_ranges_contributes_nothing() {
        let docs = documents(&[("a.pdf", 3, "A"), ("b.pdf", 2, "B"), ("c.pdf", 2, "C")]);
        let mut selections = SelectionMap::new();
        selections.insert("a.pdf".to_string(), Vec::new());
        selections.insert("c.pdf".to_string(), vec![PageRange::single(2)]);

        let merged = merge(&docs, MergeMode::Selected, &selections).unwrap();
        assert_eq!(page_markers(&merged), vec!["C-2"]);
        assert_eq!(
            bookmarks(&merged),
            vec![(0, "c.pdf - páginas 2".to_string(), Some(1))]
        );
    }

    #[test]
    fn test_nothing_selected_yields_empty_document() {
        let docs = documents(&[("a.pdf", 3, "A")]);
        let merged = merge(&docs, MergeMode::Selected, &SelectionMap::new()).unwrap();
        assert!(page_markers(&merged).is_empty());
        assert!(bookmarks(&merged).is_empty());
    }
}
