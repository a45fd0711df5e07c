use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pdftext_core::{Extractor, Statement, YearContext};
use pdftext_core::config_file::{self, ConfigFile};
use pdftext_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Extract the text of the single PDF in a directory into a text file
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory searched (recursively) for exactly one PDF [default: current directory]
    pdf_dir: Option<PathBuf>,

    /// Directory the `<name>_extracted_text.txt` file is written to [default: PDF_DIR]
    txt_dir: Option<PathBuf>,

    /// Fraction of page height from the top to drop as header
    #[arg(long)]
    header_exclusion: Option<f32>,

    /// Fraction of page height from the bottom to drop as footer
    #[arg(long)]
    footer_exclusion: Option<f32>,

    /// Also print the extracted text to stdout
    #[arg(long)]
    print: bool,

    /// Parse the text as a bank statement and summarize its transactions
    #[arg(long)]
    transactions: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

/// Settings after applying CLI flags > env vars > config file > defaults.
#[derive(Debug)]
struct Settings {
    input_dir: PathBuf,
    output_dir: PathBuf,
    header_exclusion: f32,
    footer_exclusion: f32,
}

/// `env` looks up an environment variable; `main` passes `std::env::var`.
fn resolve_settings(
    cli: &Cli,
    config: &ConfigFile,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let input_dir = cli
        .pdf_dir
        .clone()
        .or_else(|| env("PDFTEXT_INPUT_DIR").map(PathBuf::from))
        .or_else(|| config.input_dir())
        .unwrap_or_else(|| PathBuf::from("."));
    let output_dir = cli
        .txt_dir
        .clone()
        .or_else(|| env("PDFTEXT_OUTPUT_DIR").map(PathBuf::from))
        .or_else(|| config.output_dir())
        .unwrap_or_else(|| input_dir.clone());

    Settings {
        input_dir,
        output_dir,
        header_exclusion: cli
            .header_exclusion
            .or_else(|| config.header_exclusion())
            .unwrap_or(0.0),
        footer_exclusion: cli
            .footer_exclusion
            .or_else(|| config.footer_exclusion())
            .unwrap_or(0.0),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config_file::load_config();
    let settings = resolve_settings(&cli, &config, |key| std::env::var(key).ok());
    tracing::debug!(?settings, "resolved settings");

    for (name, ratio) in [
        ("header", settings.header_exclusion),
        ("footer", settings.footer_exclusion),
    ] {
        if !(0.0..1.0).contains(&ratio) {
            anyhow::bail!("{name} exclusion must be in [0, 1), got {ratio}");
        }
    }

    if !settings.input_dir.is_dir() {
        anyhow::bail!("PDF directory not found: {}", settings.input_dir.display());
    }

    let backend = MupdfBackend::new()
        .with_header_exclusion(settings.header_exclusion)
        .with_footer_exclusion(settings.footer_exclusion);
    let extractor = Extractor::new(backend);

    let report = extractor
        .run(&settings.input_dir, &settings.output_dir)
        .with_context(|| {
            format!(
                "extracting text from PDF in {}",
                settings.input_dir.display()
            )
        })?;

    let statement = if cli.transactions {
        let statement = Statement::parse(&report.pages, YearContext::current())
            .with_context(|| format!("parsing transactions in {}", report.input.display()))?;
        Some(statement)
    } else {
        None
    };

    let color = ColorMode(!cli.no_color);
    // With --print the summary goes to stderr so stdout carries only the text
    let mut summary: Box<dyn Write> = if cli.print {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", report.text)?;
        stdout.flush()?;
        Box::new(std::io::stderr().lock())
    } else {
        Box::new(std::io::stdout().lock())
    };
    output::print_report(&mut summary, &report, color)?;
    if let Some(statement) = &statement {
        output::print_statement(&mut summary, statement, color)?;
    }

    Ok(())
}
