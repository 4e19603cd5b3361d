pub mod document;
pub mod loader;
pub mod outline;
pub mod toc;
pub mod writer;

#[cfg(test)]
pub mod fixtures;

pub use document::PdfDocument;
pub use loader::{LoadIssue, LoadReport, SourceDocument, Upload};
pub use outline::Outline;
pub use writer::PdfWriter;
