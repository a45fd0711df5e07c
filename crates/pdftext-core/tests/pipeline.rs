//! End-to-end tests for [`Extractor::run`] over the in-memory backend.
//!
//! The PDF files on disk only need to exist for discovery; their text comes
//! from the [`MockBackend`] registered under the same path.

use std::path::Path;

use pdftext_core::mock::MockBackend;
use pdftext_core::{
    Amount, ExtractError, Extractor, Statement, TransactionCategory, WriteOutcome, YearContext,
};

fn touch(path: &Path) {
    std::fs::write(path, b"%PDF-1.4\n").unwrap();
}

#[test]
fn single_page_pdf_is_written_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("hello.pdf");
    touch(&pdf);

    let extractor = Extractor::new(MockBackend::new().with_document(&pdf, ["Hello"]));
    let report = extractor.run(dir.path(), dir.path()).unwrap();

    assert_eq!(report.input, pdf);
    assert_eq!(report.output, dir.path().join("hello_extracted_text.txt"));
    assert_eq!(report.page_count, 1);
    assert_eq!(report.text, "Hello");
    assert_eq!(report.outcome, WriteOutcome::Written { bytes: 5 });
    assert_eq!(std::fs::read_to_string(&report.output).unwrap(), "Hello");
}

#[test]
fn output_contains_every_page_not_just_the_last() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("statement.pdf");
    touch(&pdf);
    let out_dir = dir.path().join("text");

    let extractor = Extractor::new(MockBackend::new().with_document(&pdf, ["A", "B", "C"]));
    let report = extractor.run(dir.path(), &out_dir).unwrap();

    assert_eq!(
        std::fs::read_to_string(out_dir.join("statement_extracted_text.txt")).unwrap(),
        "A--page--B--page--C"
    );
    assert_eq!(report.page_count, 3);
}

#[test]
fn second_run_leaves_existing_output_alone() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("hello.pdf");
    touch(&pdf);
    let out = dir.path().join("hello_extracted_text.txt");
    std::fs::write(&out, "edited by hand").unwrap();

    let extractor = Extractor::new(MockBackend::new().with_document(&pdf, ["Hello"]));
    let report = extractor.run(dir.path(), dir.path()).unwrap();

    assert_eq!(report.outcome, WriteOutcome::Skipped);
    assert_eq!(report.text, "Hello");
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "edited by hand");
}

#[test]
fn two_pdfs_fail_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    touch(&a);
    touch(&b);

    let extractor = Extractor::new(
        MockBackend::new()
            .with_document(&a, ["A"])
            .with_document(&b, ["B"]),
    );
    let err = extractor.run(dir.path(), dir.path()).unwrap_err();

    assert!(matches!(err, ExtractError::UnsupportedOperation { found: 2, .. }));
    assert_eq!(extractor.backend().open_count(), 0);
    let txt_files = std::fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|x| x == "txt"))
        .count();
    assert_eq!(txt_files, 0);
}

#[test]
fn unparseable_pdf_is_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("broken.pdf"));

    let extractor = Extractor::new(MockBackend::new());
    let err = extractor.run(dir.path(), dir.path()).unwrap_err();

    assert!(matches!(err, ExtractError::MalformedInput { .. }));
    assert!(!dir.path().join("broken_extracted_text.txt").exists());
}

#[test]
fn report_pages_feed_statement_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("march.pdf");
    touch(&pdf);

    let extractor = Extractor::new(MockBackend::new().with_document(
        &pdf,
        [
            "March 1, 2024 through March 31, 2024\nBeginning Balance 1,000.00",
            "03/12 Online Transfer To Sav ...9876 250.00 750.00\nEnding Balance 750.00",
        ],
    ));
    let report = extractor.run(dir.path(), dir.path()).unwrap();
    let statement = Statement::parse(&report.pages, YearContext::Year(1999)).unwrap();

    assert_eq!(statement.transactions.len(), 1);
    assert_eq!(statement.transactions[0].category, TransactionCategory::TransferOut);
    assert_eq!(statement.transactions[0].date.to_string(), "2024-03-12");
    assert_eq!(statement.beginning_balance, Some(Amount::from_cents(100_000)));
    assert_eq!(statement.ending_balance, Some(Amount::from_cents(75_000)));
}
