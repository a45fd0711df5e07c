use std::io::Write;

use owo_colors::OwoColorize;
use pdftext_core::{ExtractionReport, Statement, TransactionKind, WriteOutcome};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print what was extracted and where it went.
pub fn print_report(
    w: &mut dyn Write,
    report: &ExtractionReport,
    color: ColorMode,
) -> std::io::Result<()> {
    let file_name = report
        .input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| report.input.display().to_string());

    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} pages, {} chars)",
            "Extracted".bold().green(),
            file_name.bold(),
            report.page_count,
            report.text.chars().count()
        )?;
    } else {
        writeln!(
            w,
            "Extracted {} ({} pages, {} chars)",
            file_name,
            report.page_count,
            report.text.chars().count()
        )?;
    }

    match report.outcome {
        WriteOutcome::Written { bytes } => {
            writeln!(w, "Wrote {} bytes to {}", bytes, report.output.display())?;
        }
        WriteOutcome::Skipped => {
            let msg = format!(
                "{} already exists; left unchanged",
                report.output.display()
            );
            if color.enabled() {
                writeln!(w, "{}", msg.yellow())?;
            } else {
                writeln!(w, "{}", msg)?;
            }
        }
    }
    Ok(())
}

/// Print one line per parsed transaction, then the balances and totals.
pub fn print_statement(
    w: &mut dyn Write,
    statement: &Statement,
    color: ColorMode,
) -> std::io::Result<()> {
    if let Some(period) = &statement.period {
        writeln!(w, "Statement period {} to {}", period.begin, period.end)?;
    }
    for tx in &statement.transactions {
        let amount = match tx.kind() {
            TransactionKind::Credit => format!("+{}", tx.amount),
            TransactionKind::Debit => format!("-{}", tx.amount),
        };
        if color.enabled() {
            match tx.kind() {
                TransactionKind::Credit => {
                    writeln!(w, "  {}  {:>12}  {}", tx.date, amount.green(), tx.category.label())?
                }
                TransactionKind::Debit => {
                    writeln!(w, "  {}  {:>12}  {}", tx.date, amount.red(), tx.category.label())?
                }
            }
        } else {
            writeln!(w, "  {}  {:>12}  {}", tx.date, amount, tx.category.label())?;
        }
    }
    if let Some(balance) = statement.beginning_balance {
        writeln!(w, "Beginning balance {balance}")?;
    }
    if let Some(balance) = statement.ending_balance {
        writeln!(w, "Ending balance {balance}")?;
    }
    writeln!(
        w,
        "{} transactions: credits {}, debits {}, net {}",
        statement.transactions.len(),
        statement.total(TransactionKind::Credit),
        statement.total(TransactionKind::Debit),
        statement.net_change()
    )?;
    Ok(())
}
