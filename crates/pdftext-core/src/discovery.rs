use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ExtractError;

/// Returns true if the path has a `.pdf` extension (any case).
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Recursively list every PDF file under `dir`, sorted by path.
///
/// A missing or unreadable `dir` is an error; unreadable entries below it
/// are errors too, so a partial listing is never mistaken for a complete one.
/// Symlinks are not followed: a linked directory is not descended into and a
/// linked file is not counted.
pub fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut pdfs = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && is_pdf_path(entry.path()) {
            pdfs.push(entry.into_path());
        }
    }
    pdfs.sort();
    tracing::debug!(dir = %dir.display(), count = pdfs.len(), "pdf discovery complete");
    Ok(pdfs)
}

/// Find the one PDF under `dir`.
///
/// Fails with [`ExtractError::UnsupportedOperation`] when the directory holds
/// no PDFs or more than one.
pub fn find_single_pdf(dir: &Path) -> Result<PathBuf, ExtractError> {
    let mut pdfs = find_pdfs(dir)?;
    if pdfs.len() != 1 {
        return Err(ExtractError::UnsupportedOperation {
            dir: dir.to_path_buf(),
            found: pdfs.len(),
        });
    }
    Ok(pdfs.remove(0))
}
