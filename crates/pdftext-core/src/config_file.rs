use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub display: Option<DisplayConfig>,
    pub logging: Option<LoggingConfig>,
}

/// Text flags handed to the PDF backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub preserve_ligatures: Option<bool>,
    pub preserve_whitespace: Option<bool>,
    pub dehyphenate: Option<bool>,
    /// Drop text that lies outside the page's mediabox.
    pub clip_to_mediabox: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A `tracing` filter directive, e.g. `"warn"` or `"pdftext_core=debug"`.
    pub level: Option<String>,
}

/// Platform config directory path: `<config_dir>/pdftext/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdftext").join("config.toml"))
}

/// Load config by cascading CWD `.pdftext.toml` over platform config.
/// CWD values override platform values.
///
/// Files that exist but can't be read or parsed are skipped and returned
/// alongside the config so the caller can report them once logging is up.
pub fn load_config() -> (ConfigFile, Vec<ConfigError>) {
    let mut paths: Vec<PathBuf> = config_path().into_iter().collect();
    paths.push(PathBuf::from(".pdftext.toml"));
    load_layered(&paths)
}

/// Load each path in order, later files overriding earlier ones.
pub fn load_layered(paths: &[PathBuf]) -> (ConfigFile, Vec<ConfigError>) {
    let mut config = ConfigFile::default();
    let mut ignored = Vec::new();
    for path in paths {
        match load_from_path(path) {
            Ok(Some(layer)) => config = merge(config, layer),
            Ok(None) => {}
            Err(e) => ignored.push(e),
        }
    }
    (config, ignored)
}

/// Load a config from a specific path. Returns `Ok(None)` if the file
/// doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    match load_required(path) {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::Read { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Load a config the user named explicitly. Unlike [`load_from_path`],
/// a missing file is an error.
pub fn load_required(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_ex = base.extraction.unwrap_or_default();
    let over_ex = overlay.extraction.unwrap_or_default();
    let base_display = base.display.unwrap_or_default();
    let over_display = overlay.display.unwrap_or_default();
    let base_log = base.logging.unwrap_or_default();
    let over_log = overlay.logging.unwrap_or_default();

    ConfigFile {
        extraction: Some(ExtractionConfig {
            preserve_ligatures: over_ex.preserve_ligatures.or(base_ex.preserve_ligatures),
            preserve_whitespace: over_ex.preserve_whitespace.or(base_ex.preserve_whitespace),
            dehyphenate: over_ex.dehyphenate.or(base_ex.dehyphenate),
            clip_to_mediabox: over_ex.clip_to_mediabox.or(base_ex.clip_to_mediabox),
        }),
        display: Some(DisplayConfig {
            color: over_display.color.or(base_display.color),
        }),
        logging: Some(LoggingConfig {
            level: over_log.level.or(base_log.level),
        }),
    }
}
