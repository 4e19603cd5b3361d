use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

use crate::pdf::Upload;

/// Read every path into an upload. Directories are walked recursively for
/// `*.pdf` files, in file name order; files are taken whatever their extension.
pub fn collect_uploads<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Upload>> {
    let mut uploads = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && has_pdf_extension(entry.path()) {
                    uploads.push(read_upload(entry.path())?);
                }
            }
        } else {
            uploads.push(read_upload(path)?);
        }
    }

    Ok(uploads)
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Upload { name, bytes })
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
