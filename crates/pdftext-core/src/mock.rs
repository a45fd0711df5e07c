//! In-memory PDF backend for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, PdfBackend, PdfDocument};

/// A hand-rolled mock implementing [`PdfBackend`].
///
/// Documents are registered by path with their page texts. Opening any
/// other path fails with [`BackendError::OpenError`], which is how tests
/// simulate a file that is not a PDF.
#[derive(Default)]
pub struct MockBackend {
    documents: HashMap<PathBuf, Vec<String>>,
    open_count: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document at `path` with the given page texts.
    pub fn with_document<S: Into<String>>(
        mut self,
        path: impl Into<PathBuf>,
        pages: impl IntoIterator<Item = S>,
    ) -> Self {
        self.documents
            .insert(path.into(), pages.into_iter().map(Into::into).collect());
        self
    }

    /// Number of times [`PdfBackend::open`] was called.
    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::Relaxed)
    }
}

impl PdfBackend for MockBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        self.open_count.fetch_add(1, Ordering::Relaxed);
        let pages = self
            .documents
            .get(path)
            .cloned()
            .ok_or_else(|| BackendError::OpenError(format!("no mock document at {}", path.display())))?;
        Ok(Box::new(MockDocument { pages }))
    }
}

struct MockDocument {
    pages: Vec<String>,
}

impl PdfDocument for MockDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(BackendError::PageOutOfRange {
                index,
                page_count: self.pages.len(),
            })
    }
}
