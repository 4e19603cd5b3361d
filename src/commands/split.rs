use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

use super::{issue_reports, load_batch, select_pages, write_output, IssueReport, RangeReport};
use crate::assemble::{split, SplitMode};
use crate::page_range::SelectionMap;

pub struct SplitOptions {
    pub inputs: Vec<PathBuf>,
    pub output: String,
    pub mode: SplitMode,
    /// Range text per file name, used in `Ranges` mode
    pub pages: HashMap<String, String>,
    pub consolidate: bool,
    pub keep_order: bool,
}

#[derive(Debug, Serialize)]
pub struct SplitSummary {
    pub output_path: String,
    pub content_type: &'static str,
    pub documents: usize,
    pub issues: Vec<IssueReport>,
    pub ranges: Vec<RangeReport>,
}

pub fn execute(options: &SplitOptions) -> Result<SplitSummary> {
    let batch = load_batch(&options.inputs, options.keep_order)?;
    if batch.documents.is_empty() {
        bail!("No PDFs supplied: provide at least one readable PDF to split");
    }

    let (selections, ranges) = if options.mode == SplitMode::Ranges {
        select_pages(&batch.documents, &options.pages)
    } else {
        (SelectionMap::new(), Vec::new())
    };

    let output = split(
        &batch.documents,
        options.mode,
        &selections,
        options.consolidate,
    )?;
    let (Some(bytes), Some(extension), Some(content_type)) =
        (output.bytes(), output.extension(), output.content_type())
    else {
        bail!("No valid pages found to split");
    };

    let path = write_output(&options.output, extension, bytes)?;
    info!(
        documents = batch.documents.len(),
        mode = ?options.mode,
        consolidate = options.consolidate,
        path = %path.display(),
        "split completed"
    );

    Ok(SplitSummary {
        output_path: path.display().to_string(),
        content_type,
        documents: batch.documents.len(),
        issues: issue_reports(&batch.issues),
        ranges,
    })
}

pub fn run(options: &SplitOptions) -> Result<()> {
    let summary = execute(options)?;

    for range in &summary.ranges {
        println!("{}: pages {}", range.file, range.selected);
    }
    let what = if summary.content_type == "application/zip" {
        "archive"
    } else {
        "PDF"
    };
    println!(
        "Split {} file(s) into {} {}",
        summary.documents, what, summary.output_path
    );

    Ok(())
}
