//! Page assembly: re-sequencing pages of loaded documents into new PDFs.

pub mod merge;
pub mod split;

pub use merge::{merge, MergeMode};
pub use split::{split, SplitMode, SplitOutput};

/// Bookmark title for a piece of a document, e.g. "a.pdf - páginas 1, 4-6"
pub(crate) fn bookmark_title(name: &str, label: &str) -> String {
    format!("{} - páginas {}", name, label)
}
