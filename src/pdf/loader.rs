use thiserror::Error;
use tracing::{debug, error, warn};

use super::document::PdfDocument;

/// A file as handed over by the user: its name and a snapshot of its bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A successfully opened upload. Read-only once created.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

impl SourceDocument {
    pub fn open(&self) -> anyhow::Result<PdfDocument> {
        PdfDocument::from_bytes(&self.name, &self.bytes)
    }
}

/// Why an upload was left out of the batch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadIssue {
    #[error("{name} is empty, skipping it")]
    Empty { name: String },

    #[error("could not read {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

impl LoadIssue {
    pub fn name(&self) -> &str {
        match self {
            LoadIssue::Empty { name } | LoadIssue::Unreadable { name, .. } => name,
        }
    }

    /// Empty uploads are warnings, unreadable ones errors
    pub fn is_error(&self) -> bool {
        matches!(self, LoadIssue::Unreadable { .. })
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub documents: Vec<SourceDocument>,
    pub issues: Vec<LoadIssue>,
}

/// Open every upload, keeping the ones that parse as PDFs, in input order.
pub fn load(uploads: Vec<Upload>) -> LoadReport {
    let mut report = LoadReport::default();

    for upload in uploads {
        if upload.bytes.is_empty() {
            let issue = LoadIssue::Empty { name: upload.name };
            warn!(file = issue.name(), "{}", issue);
            report.issues.push(issue);
            continue;
        }

        match PdfDocument::from_bytes(&upload.name, &upload.bytes) {
            Ok(pdf) => {
                let page_count = pdf.page_count();
                debug!(file = %upload.name, pages = page_count, "loaded document");
                report.documents.push(SourceDocument {
                    name: upload.name,
                    bytes: upload.bytes,
                    page_count,
                });
            }
            Err(e) => {
                let issue = LoadIssue::Unreadable {
                    name: upload.name,
                    reason: e.root_cause().to_string(),
                };
                error!(file = issue.name(), "{}", issue);
                report.issues.push(issue);
            }
        }
    }

    report
}

/// Order documents by name. Apply before both listing and processing them.
pub fn sort_by_name(documents: &mut [SourceDocument]) {
    documents.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::sample_pdf;

    fn upload(name: &str, bytes: Vec<u8>) -> Upload {
        Upload {
            name: name.to_string(),
            bytes,
        }
    }

    #[test]
    fn test_loads_in_input_order() {
        let report = load(vec![
            upload("b.pdf", sample_pdf(2, "B")),
            upload("a.pdf", sample_pdf(5, "A")),
        ]);
        let loaded: Vec<_> = report
            .documents
            .iter()
            .map(|d| (d.name.as_str(), d.page_count))
            .collect();
        assert_eq!(loaded, vec![("b.pdf", 2), ("a.pdf", 5)]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_bad_uploads_do_not_abort_the_batch() {
        let report = load(vec![
            upload("empty.pdf", Vec::new()),
            upload("junk.pdf", b"definitely not a pdf".to_vec()),
            upload("good.pdf", sample_pdf(1, "G")),
        ]);

        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].name, "good.pdf");

        assert_eq!(report.issues.len(), 2);
        assert_eq!(
            report.issues[0],
            LoadIssue::Empty {
                name: "empty.pdf".to_string()
            }
        );
        assert!(!report.issues[0].is_error());
        assert_eq!(report.issues[1].name(), "junk.pdf");
        assert!(report.issues[1].is_error());
        assert!(report.issues[1].to_string().starts_with("could not read junk.pdf: "));
    }

    #[test]
    fn test_sort_by_name() {
        let mut documents = load(vec![
            upload("c.pdf", sample_pdf(1, "C")),
            upload("a.pdf", sample_pdf(1, "A")),
            upload("b.pdf", sample_pdf(1, "B")),
        ])
        .documents;
        sort_by_name(&mut documents);
        let names: Vec<_> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_reopen_source() {
        let report = load(vec![upload("a.pdf", sample_pdf(3, "A"))]);
        let doc = report.documents[0].open().unwrap();
        assert_eq!(doc.page_count(), 3);
    }
}
