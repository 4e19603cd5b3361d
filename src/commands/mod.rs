//! Request handling shared by the command line and the MCP server.

pub mod info;
pub mod merge;
pub mod split;
pub mod toc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::filename::normalize_filename;
use crate::page_range::{default_range_text, format_ranges, parse_ranges, SelectionMap};
use crate::pdf::loader::{load, sort_by_name};
use crate::pdf::{LoadIssue, LoadReport, SourceDocument};
use crate::upload::collect_uploads;

/// Documents ready for processing, plus what went wrong with the rest
pub struct Batch {
    pub documents: Vec<SourceDocument>,
    pub issues: Vec<LoadIssue>,
}

/// Read and open `paths`. Unless `keep_order` is set, documents are sorted by
/// name, and that order is used both for listing and for processing.
pub fn load_batch<P: AsRef<Path>>(paths: &[P], keep_order: bool) -> Result<Batch> {
    let uploads = collect_uploads(paths)?;
    let LoadReport {
        mut documents,
        issues,
    } = load(uploads);
    if !keep_order {
        sort_by_name(&mut documents);
    }
    Ok(Batch { documents, issues })
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueReport {
    pub file: String,
    pub level: &'static str,
    pub message: String,
}

impl From<&LoadIssue> for IssueReport {
    fn from(issue: &LoadIssue) -> Self {
        IssueReport {
            file: issue.name().to_string(),
            level: if issue.is_error() { "error" } else { "warning" },
            message: issue.to_string(),
        }
    }
}

pub fn issue_reports(issues: &[LoadIssue]) -> Vec<IssueReport> {
    issues.iter().map(IssueReport::from).collect()
}

/// How the range text of one document was understood
#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub file: String,
    pub page_count: u32,
    pub text: String,
    pub selected: String,
    /// Tokens skipped because they are not a page or a range
    pub invalid: Vec<String>,
}

/// Parse the range text given for each document. Documents without text get
/// their whole page span ("1:<n>").
pub fn select_pages(
    documents: &[SourceDocument],
    page_texts: &HashMap<String, String>,
) -> (SelectionMap, Vec<RangeReport>) {
    let mut selections = SelectionMap::new();
    let mut reports = Vec::with_capacity(documents.len());

    for doc in documents {
        let text = page_texts
            .get(&doc.name)
            .cloned()
            .unwrap_or_else(|| default_range_text(doc.page_count));
        let parsed = parse_ranges(&text, doc.page_count);

        if !parsed.errors.is_empty() {
            warn!(
                file = %doc.name,
                invalid = %parsed.errors.join(", "),
                "skipped tokens with an invalid format"
            );
        }
        if parsed.ranges.is_empty() {
            warn!(file = %doc.name, "no valid pages, the document will be skipped");
        }

        reports.push(RangeReport {
            file: doc.name.clone(),
            page_count: doc.page_count,
            text,
            selected: format_ranges(&parsed.ranges),
            invalid: parsed.errors,
        });
        selections.insert(doc.name.clone(), parsed.ranges);
    }

    (selections, reports)
}

/// Turn repeated `NAME=RANGES` arguments into a map
pub fn parse_page_args(args: &[String]) -> Result<HashMap<String, String>> {
    args.iter()
        .map(|arg| match arg.rsplit_once('=') {
            Some((name, ranges)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), ranges.to_string()))
            }
            _ => bail!("Invalid page selection '{}', expected FILE=RANGES", arg),
        })
        .collect()
}

/// Write `bytes` under the normalized output name and return where it went
pub fn write_output(output: &str, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = PathBuf::from(normalize_filename(output, extension));
    std::fs::write(&path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(path)
}
