use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Appended to the input file stem to name the output text file.
pub const OUTPUT_SUFFIX: &str = "_extracted_text.txt";

/// What [`write_if_absent`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { bytes: usize },
    /// A file already existed at the target path and was left untouched.
    Skipped,
}

impl WriteOutcome {
    pub fn was_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }
}

/// Output path for `input`: `<output_dir>/<stem>_extracted_text.txt`.
///
/// Only a trailing `.pdf` extension (any case) is removed; other dots in the
/// name are kept.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = if crate::discovery::is_pdf_path(input) {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or(name)
    } else {
        name
    };
    output_dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Create `path` and write `content` to it, unless the file already exists.
///
/// The content goes to a temporary file in the same directory, which is then
/// linked into place without replacing anything. A failed write leaves no
/// file at `path`, and a file appearing at `path` meanwhile is never
/// overwritten.
pub fn write_if_absent(path: &Path, content: &str) -> std::io::Result<WriteOutcome> {
    write_new_with(path, content.len(), |file| file.write_all(content.as_bytes()))
}

fn write_new_with<F>(path: &Path, bytes: usize, fill: F) -> std::io::Result<WriteOutcome>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    if path.try_exists()? {
        return Ok(skipped(path));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(path) {
        Ok(_) => {
            tracing::info!(path = %path.display(), bytes, "wrote extracted text");
            Ok(WriteOutcome::Written { bytes })
        }
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(skipped(path)),
        Err(e) => Err(e.error),
    }
}

fn skipped(path: &Path) -> WriteOutcome {
    tracing::warn!(path = %path.display(), "output file already exists, leaving it untouched");
    WriteOutcome::Skipped
}
