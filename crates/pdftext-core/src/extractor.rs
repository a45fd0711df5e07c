use std::path::{Path, PathBuf};

use crate::backend::{PdfBackend, PdfDocument};
use crate::output::{WriteOutcome, output_path_for, write_if_absent};
use crate::{ExtractError, PageTexts};

/// Result of a full [`Extractor::run`].
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub page_count: usize,
    pub outcome: WriteOutcome,
    /// Pages joined with [`crate::PAGE_SEPARATOR`]; this is exactly what was
    /// (or would have been) written to `output`.
    pub text: String,
    pub pages: PageTexts,
}

/// Single-PDF text extractor.
///
/// Every operation opens the document through the backend and drops it
/// before returning; nothing is cached between calls.
pub struct Extractor<B> {
    backend: B,
}

impl<B: PdfBackend> Extractor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, ExtractError> {
        self.backend
            .open(path)
            .map_err(|e| ExtractError::from_backend(path, e))
    }

    /// Number of pages in the PDF at `path`.
    pub fn page_count(&self, path: &Path) -> Result<usize, ExtractError> {
        Ok(self.open(path)?.page_count())
    }

    /// Text of the page at zero-based `index`.
    pub fn extract_page_text(&self, path: &Path, index: usize) -> Result<String, ExtractError> {
        let document = self.open(path)?;
        page_text(path, document.as_ref(), index)
    }

    /// Text of every page, in page order.
    pub fn extract_pages(&self, path: &Path) -> Result<PageTexts, ExtractError> {
        let document = self.open(path)?;
        let page_count = document.page_count();
        tracing::info!(path = %path.display(), page_count, "pages in pdf");

        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            pages.push(page_text(path, document.as_ref(), index)?);
        }
        Ok(PageTexts::from(pages))
    }

    /// All page texts joined with [`crate::PAGE_SEPARATOR`].
    pub fn extract_full_text(&self, path: &Path) -> Result<String, ExtractError> {
        Ok(self.extract_pages(path)?.join())
    }

    /// Find the single PDF under `input_dir`, extract it, and write the text
    /// into `output_dir` (created if missing) unless an output file is
    /// already there.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<ExtractionReport, ExtractError> {
        let input = crate::discovery::find_single_pdf(input_dir)?;
        let pages = self.extract_pages(&input)?;
        let text = pages.join();

        std::fs::create_dir_all(output_dir)?;
        let output = output_path_for(&input, output_dir);
        let outcome = write_if_absent(&output, &text)?;

        Ok(ExtractionReport {
            input,
            output,
            page_count: pages.len(),
            outcome,
            text,
            pages,
        })
    }
}

fn page_text(path: &Path, document: &dyn PdfDocument, index: usize) -> Result<String, ExtractError> {
    let page_count = document.page_count();
    if index >= page_count {
        return Err(ExtractError::OutOfRange { index, page_count });
    }
    let text = document
        .page_text(index)
        .map_err(|e| ExtractError::from_backend(path, e))?;
    tracing::debug!(page = index, chars = text.chars().count(), "extracted page text");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    fn extractor() -> Extractor<MockBackend> {
        Extractor::new(
            MockBackend::new()
                .with_document("hello.pdf", ["Hello"])
                .with_document("ab.pdf", ["A", "B"])
                .with_document("blank.pdf", Vec::<String>::new()),
        )
    }

    #[test]
    fn single_page_has_no_separator() {
        let ex = extractor();
        assert_eq!(ex.extract_full_text(Path::new("hello.pdf")).unwrap(), "Hello");
    }

    #[test]
    fn two_pages_are_joined_with_separator() {
        let ex = extractor();
        assert_eq!(
            ex.extract_full_text(Path::new("ab.pdf")).unwrap(),
            "A--page--B"
        );
    }

    #[test]
    fn zero_page_document_yields_empty_text() {
        let ex = extractor();
        assert_eq!(ex.page_count(Path::new("blank.pdf")).unwrap(), 0);
        assert_eq!(ex.extract_full_text(Path::new("blank.pdf")).unwrap(), "");
    }

    #[test]
    fn page_count_and_valid_indices() {
        let ex = extractor();
        let path = Path::new("ab.pdf");
        let n = ex.page_count(path).unwrap();
        assert_eq!(n, 2);
        for i in 0..n {
            assert!(ex.extract_page_text(path, i).is_ok());
        }
        match ex.extract_page_text(path, n) {
            Err(ExtractError::OutOfRange { index, page_count }) => {
                assert_eq!(index, 2);
                assert_eq!(page_count, 2);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn unknown_document_is_malformed_input() {
        let ex = extractor();
        assert!(matches!(
            ex.page_count(Path::new("missing.pdf")),
            Err(ExtractError::MalformedInput { .. })
        ));
    }

    #[test]
    fn full_text_opens_document_once() {
        let ex = extractor();
        ex.extract_full_text(Path::new("ab.pdf")).unwrap();
        assert_eq!(ex.backend().open_count(), 1);
    }

    #[test]
    fn pages_keep_separator_inside_content() {
        let ex = Extractor::new(MockBackend::new().with_document("odd.pdf", ["x--page--y", "z"]));
        let pages = ex.extract_pages(Path::new("odd.pdf")).unwrap();
        assert_eq!(pages.pages, vec!["x--page--y", "z"]);
        assert_eq!(pages.join().split(crate::PAGE_SEPARATOR).count(), 3);
    }
}
