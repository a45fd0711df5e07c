use std::path::Path;

use mupdf::{Document, TextPageFlags};

use pdftext_core::{BackendError, PdfBackend, PdfDocument};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the rest of the workspace does not
/// transitively depend on it.
///
/// Header and footer exclusion are off by default, so page text is exactly
/// what MuPDF's structured text yields. Enabling them drops text blocks that
/// sit entirely inside the top or bottom band of each page (running titles,
/// page numbers).
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfBackend {
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    header_exclusion_ratio: Option<f32>,
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    footer_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }
}

impl PdfBackend for MupdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;
        let page_count = document
            .page_count()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        let page_count = page_count_from(page_count)?;

        Ok(Box::new(MupdfDocument {
            document,
            page_count,
            header_exclusion_ratio: self.header_exclusion_ratio,
            footer_exclusion_ratio: self.footer_exclusion_ratio,
        }))
    }
}

fn page_count_from(raw: i32) -> Result<usize, BackendError> {
    usize::try_from(raw).map_err(|_| BackendError::OpenError(format!("invalid page count {raw}")))
}

struct MupdfDocument {
    document: Document,
    page_count: usize,
    header_exclusion_ratio: Option<f32>,
    footer_exclusion_ratio: Option<f32>,
}

impl PdfDocument for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        let out_of_range = || BackendError::PageOutOfRange {
            index,
            page_count: self.page_count,
        };
        if index >= self.page_count {
            return Err(out_of_range());
        }
        let page_number = i32::try_from(index).map_err(|_| out_of_range())?;

        let page = self
            .document
            .load_page(page_number)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let page_bounds = page
            .bounds()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let page_height = page_bounds.y1 - page_bounds.y0;

        let header_threshold = self
            .header_exclusion_ratio
            .map(|r| page_bounds.y0 + page_height * r);
        let footer_threshold = self
            .footer_exclusion_ratio
            .map(|r| page_bounds.y1 - page_height * r);

        let mut lines = Vec::new();
        for block in text_page.blocks() {
            let block_bounds = block.bounds();

            // Block ends above the header line
            if let Some(threshold) = header_threshold {
                if block_bounds.y1 <= threshold {
                    continue;
                }
            }

            // Block starts below the footer line
            if let Some(threshold) = footer_threshold {
                if block_bounds.y0 >= threshold {
                    continue;
                }
            }

            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                lines.push(line_text);
            }
        }

        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_page_count_is_an_open_error() {
        match page_count_from(-1) {
            Err(BackendError::OpenError(reason)) => assert_eq!(reason, "invalid page count -1"),
            other => panic!("expected OpenError, got {other:?}"),
        }
    }

    #[test]
    fn zero_page_count_is_allowed() {
        assert_eq!(page_count_from(0).unwrap(), 0);
        assert_eq!(page_count_from(12).unwrap(), 12);
    }
}
