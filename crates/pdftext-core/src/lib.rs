use std::path::PathBuf;

use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod discovery;
pub mod extractor;
pub mod mock;
pub mod output;
pub mod transactions;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend, PdfDocument};
pub use discovery::{find_pdfs, find_single_pdf};
pub use extractor::{ExtractionReport, Extractor};
pub use output::{OUTPUT_SUFFIX, WriteOutcome, output_path_for, write_if_absent};
pub use transactions::{
    Amount, Statement, Transaction, TransactionCategory, TransactionError, TransactionKind,
    YearContext,
};

/// Literal placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "--page--";

/// Text of every page of a document, in page order.
///
/// Keeps page boundaries intact for callers that cannot rely on splitting
/// the joined text on [`PAGE_SEPARATOR`] (the separator may occur in real
/// page content).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTexts {
    pub pages: Vec<String>,
}

impl PageTexts {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Join pages with [`PAGE_SEPARATOR`] between consecutive pages.
    pub fn join(&self) -> String {
        self.pages.join(PAGE_SEPARATOR)
    }
}

impl From<Vec<String>> for PageTexts {
    fn from(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(
        "expected exactly one PDF under {}, found {found}: handling of multiple files is not implemented",
        .dir.display()
    )]
    UnsupportedOperation { dir: PathBuf, found: usize },
    #[error("{} is not a readable PDF: {reason}", .path.display())]
    MalformedInput { path: PathBuf, reason: String },
    #[error("page index {index} out of range (document has {page_count} pages)")]
    OutOfRange { index: usize, page_count: usize },
    #[error("text extraction failed for {}: {reason}", .path.display())]
    Extraction { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ExtractError {
    /// Attach the document path to a backend failure.
    pub(crate) fn from_backend(path: impl Into<PathBuf>, err: BackendError) -> Self {
        match err {
            BackendError::OpenError(reason) => ExtractError::MalformedInput {
                path: path.into(),
                reason,
            },
            BackendError::PageOutOfRange { index, page_count } => {
                ExtractError::OutOfRange { index, page_count }
            }
            BackendError::ExtractionError(reason) => ExtractError::Extraction {
                path: path.into(),
                reason,
            },
            BackendError::Io(e) => ExtractError::Io(e),
        }
    }
}
