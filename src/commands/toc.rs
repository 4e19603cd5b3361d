use anyhow::{Context, Result};
use std::path::Path;

use crate::pdf::toc::{flatten_toc, read_toc, FlatTocEntry};

/// Bookmarks of a PDF on disk, depth first
pub fn execute<P: AsRef<Path>>(path: P) -> Result<Vec<FlatTocEntry>> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = read_toc(&bytes)?;
    Ok(flatten_toc(&entries))
}

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let flat = execute(path)?;

    if flat.is_empty() {
        println!("No table of contents found.");
        return Ok(());
    }

    for entry in flat {
        let indent = "  ".repeat(entry.level as usize);
        let page_str = entry
            .page
            .map(|p| format!(" (p. {})", p))
            .unwrap_or_default();
        println!("{}{}{}", indent, entry.title, page_str);
    }

    Ok(())
}
