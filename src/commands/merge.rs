use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

use super::{issue_reports, load_batch, select_pages, write_output, IssueReport, RangeReport};
use crate::assemble::{merge, MergeMode};
use crate::filename::DEFAULT_EXTENSION;
use crate::page_range::SelectionMap;

pub struct MergeOptions {
    pub inputs: Vec<PathBuf>,
    pub output: String,
    pub mode: MergeMode,
    /// Range text per file name, used in `Selected` mode
    pub pages: HashMap<String, String>,
    pub keep_order: bool,
}

#[derive(Debug, Serialize)]
pub struct MergeSummary {
    pub output_path: String,
    pub content_type: &'static str,
    pub documents: usize,
    pub issues: Vec<IssueReport>,
    pub ranges: Vec<RangeReport>,
}

pub fn execute(options: &MergeOptions) -> Result<MergeSummary> {
    let batch = load_batch(&options.inputs, options.keep_order)?;
    if batch.documents.is_empty() {
        bail!("No PDFs supplied: provide at least one readable PDF to merge");
    }

    let (selections, ranges) = if options.mode == MergeMode::Selected {
        select_pages(&batch.documents, &options.pages)
    } else {
        (SelectionMap::new(), Vec::new())
    };

    let merged = merge(&batch.documents, options.mode, &selections)?;
    let path = write_output(&options.output, DEFAULT_EXTENSION, &merged)?;
    info!(
        documents = batch.documents.len(),
        mode = ?options.mode,
        path = %path.display(),
        "merge completed"
    );

    Ok(MergeSummary {
        output_path: path.display().to_string(),
        content_type: "application/pdf",
        documents: batch.documents.len(),
        issues: issue_reports(&batch.issues),
        ranges,
    })
}

pub fn run(options: &MergeOptions) -> Result<()> {
    let summary = execute(options)?;

    for range in &summary.ranges {
        println!("{}: pages {}", range.file, range.selected);
    }
    println!(
        "Merged {} file(s) into {}",
        summary.documents, summary.output_path
    );

    Ok(())
}
