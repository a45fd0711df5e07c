use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("page index {index} out of range (document has {page_count} pages)")]
    PageOutOfRange { index: usize, page_count: usize },
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// A backend only knows how to open a file; everything else (discovery,
/// joining pages, writing output) lives in [`crate::Extractor`].
pub trait PdfBackend: Send + Sync {
    /// Open and parse the PDF at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError>;
}

/// An opened PDF. Dropping the handle releases the underlying document.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Extract the text of the page at the zero-based `index`.
    ///
    /// Implementations must return [`BackendError::PageOutOfRange`] when
    /// `index >= self.page_count()`.
    fn page_text(&self, index: usize) -> Result<String, BackendError>;
}
