use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use super::{issue_reports, load_batch, IssueReport};
use crate::page_range::default_range_text;

#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    pub file: String,
    pub pages: u32,
    /// Range text that selects the whole document
    pub default_ranges: String,
}

#[derive(Debug, Serialize)]
pub struct InfoSummary {
    pub documents: Vec<DocumentInfo>,
    pub issues: Vec<IssueReport>,
}

/// List the documents in processing order with their page counts
pub fn execute<P: AsRef<Path>>(paths: &[P], keep_order: bool) -> Result<InfoSummary> {
    let batch = load_batch(paths, keep_order)?;
    let documents = batch
        .documents
        .iter()
        .map(|doc| DocumentInfo {
            file: doc.name.clone(),
            pages: doc.page_count,
            default_ranges: default_range_text(doc.page_count),
        })
        .collect();

    Ok(InfoSummary {
        documents,
        issues: issue_reports(&batch.issues),
    })
}

pub fn run<P: AsRef<Path>>(paths: &[P], keep_order: bool) -> Result<()> {
    let summary = execute(paths, keep_order)?;

    if summary.documents.is_empty() {
        println!("No readable PDFs found.");
    }
    for (i, doc) in summary.documents.iter().enumerate() {
        println!(
            "{:>3}. {} ({} pages, default ranges: {})",
            i + 1,
            doc.file,
            doc.pages,
            doc.default_ranges
        );
    }
    for issue in &summary.issues {
        println!("[{}] {}", issue.level, issue.message);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::sample_pdf;

    #[test]
    fn test_info_lists_documents_and_issues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), sample_pdf(1, "B")).unwrap();
        std::fs::write(dir.path().join("a.pdf"), sample_pdf(3, "A")).unwrap();
        std::fs::write(dir.path().join("broken.pdf"), b"definitely not a pdf").unwrap();

        let summary = execute(&[dir.path()], false).unwrap();
        let listed: Vec<_> = summary
            .documents
            .iter()
            .map(|d| (d.file.as_str(), d.pages, d.default_ranges.as_str()))
            .collect();
        assert_eq!(listed, vec![("a.pdf", 3, "1:3"), ("b.pdf", 1, "1")]);

        assert_eq!(summary.issues.len(), 1);
        assert_eq!(summary.issues[0].file, "broken.pdf");
        assert_eq!(summary.issues[0].level, "error");
    }
}
