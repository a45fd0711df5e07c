use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub paths: Option<PathsConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Fraction of page height from the top to drop as header (0 disables).
    pub header_exclusion: Option<f32>,
    /// Fraction of page height from the bottom to drop as footer (0 disables).
    pub footer_exclusion: Option<f32>,
}

impl ConfigFile {
    pub fn input_dir(&self) -> Option<PathBuf> {
        self.paths
            .as_ref()
            .and_then(|p| p.input_dir.as_ref())
            .map(PathBuf::from)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.paths
            .as_ref()
            .and_then(|p| p.output_dir.as_ref())
            .map(PathBuf::from)
    }

    pub fn header_exclusion(&self) -> Option<f32> {
        self.extraction.as_ref().and_then(|e| e.header_exclusion)
    }

    pub fn footer_exclusion(&self) -> Option<f32> {
        self.extraction.as_ref().and_then(|e| e.footer_exclusion)
    }
}

/// Platform config directory path: `<config_dir>/pdftext/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdftext").join("config.toml"))
}

/// Load config by cascading CWD `.pdftext.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdftext.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        paths: Some(PathsConfig {
            input_dir: overlay
                .paths
                .as_ref()
                .and_then(|p| p.input_dir.clone())
                .or_else(|| base.paths.as_ref().and_then(|p| p.input_dir.clone())),
            output_dir: overlay
                .paths
                .as_ref()
                .and_then(|p| p.output_dir.clone())
                .or_else(|| base.paths.as_ref().and_then(|p| p.output_dir.clone())),
        }),
        extraction: Some(ExtractionConfig {
            header_exclusion: overlay
                .header_exclusion()
                .or_else(|| base.header_exclusion()),
            footer_exclusion: overlay
                .footer_exclusion()
                .or_else(|| base.footer_exclusion()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_parses() {
        let toml_str = "[paths]\ninput_dir = \"statements\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.input_dir(), Some(PathBuf::from("statements")));
        assert!(parsed.output_dir().is_none());
        assert!(parsed.extraction.is_none());
    }

    #[test]
    fn extraction_ratios_parse() {
        let toml_str = "[extraction]\nheader_exclusion = 0.04\nfooter_exclusion = 0.05\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.header_exclusion(), Some(0.04));
        assert_eq!(parsed.footer_exclusion(), Some(0.05));
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            paths: Some(PathsConfig {
                input_dir: Some("/base/in".to_string()),
                output_dir: Some("/base/out".to_string()),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            paths: Some(PathsConfig {
                output_dir: Some("/overlay/out".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.input_dir(), Some(PathBuf::from("/base/in")));
        assert_eq!(merged.output_dir(), Some(PathBuf::from("/overlay/out")));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            extraction: Some(ExtractionConfig {
                footer_exclusion: Some(0.05),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.footer_exclusion(), Some(0.05));
        assert!(merged.header_exclusion().is_none());
    }

    #[test]
    fn load_from_path_reads_file_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[paths]\noutput_dir = \"out\"\n").unwrap();
        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[paths\n").unwrap();

        assert_eq!(
            load_from_path(&good).unwrap().output_dir(),
            Some(PathBuf::from("out"))
        );
        assert!(load_from_path(&bad).is_none());
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());
    }
}
