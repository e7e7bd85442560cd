//! Configuration types and loading for docbind.
//!
//! The main entry point is [`DocbindConfig`]. [`load_config`] layers, from
//! lowest to highest priority: built-in defaults, `.docbind/config.toml`,
//! and `DOCBIND_*` environment variables (`__` separates nested keys, e.g.
//! `DOCBIND_BACKEND__URL`). CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use docbind_core::{InvalidDatePolicy, Scale};

use crate::project_dir::DOCBIND_DIR_NAME;

/// File name of the configuration inside `.docbind/`.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "DOCBIND_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// A configuration layer could not be merged or extracted.
    #[error("failed to load configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// The configuration could not be written as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Where the binding settings document is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettingsSource {
    /// The backend's settings endpoints (default).
    #[default]
    Backend,
    /// A local JSON file.
    File,
}

/// Backend connection section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the evaluation backend.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Settings persistence section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default)]
    pub source: SettingsSource,

    /// Settings file used when `source = "file"`. Relative paths resolve
    /// against the `.docbind/` directory.
    #[serde(default = "default_settings_path")]
    pub path: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            source: SettingsSource::default(),
            path: default_settings_path(),
        }
    }
}

fn default_settings_path() -> String {
    "settings.json".to_string()
}

/// Preview rendering section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Prefix the backend puts on per-variable error strings.
    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,

    /// Line-chart handling of x values that are not dates.
    #[serde(default)]
    pub invalid_dates: InvalidDatePolicy,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            error_prefix: default_error_prefix(),
            invalid_dates: InvalidDatePolicy::default(),
        }
    }
}

fn default_error_prefix() -> String {
    "錯誤".to_string()
}

/// Document export section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name used when none is given.
    #[serde(default = "default_export_filename")]
    pub default_filename: String,

    /// Extension appended when the requested name lacks it.
    #[serde(default = "default_export_extension")]
    pub extension: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_filename: default_export_filename(),
            extension: default_export_extension(),
        }
    }
}

fn default_export_filename() -> String {
    "weekly_report.docx".to_string()
}

fn default_export_extension() -> String {
    "docx".to_string()
}

/// Chart rendering section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChartConfig {
    /// Scale used for quick-edit when none is given.
    #[serde(default)]
    pub default_scale: Scale,
}

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full docbind configuration.
///
/// All fields use `serde` defaults so that a partially-specified file
/// deserializes with sensible values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DocbindConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub chart: ChartConfig,
}

impl DocbindConfig {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        let url = self.backend.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "backend.url".into(),
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "backend.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        let ext = self.export.extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "export.extension".into(),
                reason: format!("'{}' is not a file extension", self.export.extension),
            });
        }
        if self.export.default_filename.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "export.default_filename".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Absolute or `.docbind/`-relative location of the settings file.
    pub fn settings_path(&self, docbind_dir: Option<&Path>) -> PathBuf {
        let path = PathBuf::from(&self.settings.path);
        if path.is_absolute() {
            return path;
        }
        match docbind_dir {
            Some(dir) => dir.join(path),
            None => PathBuf::from(DOCBIND_DIR_NAME).join(path),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load configuration, reading `config.toml` from `docbind_dir` when given.
///
/// A missing file is not an error; the defaults and environment apply.
///
/// # Errors
///
/// Returns [`ConfigError::Extract`] if a layer holds a value of the wrong
/// shape, or [`ConfigError::InvalidValue`] if validation fails.
pub fn load_config(docbind_dir: Option<&Path>) -> Result<DocbindConfig> {
    let mut figment = Figment::from(Serialized::defaults(DocbindConfig::default()));
    if let Some(dir) = docbind_dir {
        figment = figment.merge(Toml::file(dir.join(CONFIG_FILE_NAME)));
    }
    let config: DocbindConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to `config.toml` inside `docbind_dir`.
///
/// The directory is created if it does not exist.
pub fn save_config(docbind_dir: &Path, config: &DocbindConfig) -> Result<()> {
    std::fs::create_dir_all(docbind_dir)?;
    let text = toml::to_string_pretty(config)?;
    std::fs::write(docbind_dir.join(CONFIG_FILE_NAME), text)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let cfg = DocbindConfig::default();
        assert_eq!(cfg.backend.url, "http://127.0.0.1:8000");
        assert_eq!(cfg.settings.source, SettingsSource::Backend);
        assert_eq!(cfg.preview.error_prefix, "錯誤");
        assert_eq!(cfg.preview.invalid_dates, InvalidDatePolicy::Group);
        assert_eq!(cfg.export.default_filename, "weekly_report.docx");
        assert_eq!(cfg.chart.default_scale, Scale::Standard);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_roundtrip_config() {
        let dir = tempfile::tempdir().unwrap();
        let docbind_dir = dir.path().join(DOCBIND_DIR_NAME);

        let mut cfg = DocbindConfig::default();
        cfg.backend.url = "https://reports.example.com".into();
        cfg.settings.source = SettingsSource::File;
        cfg.preview.invalid_dates = InvalidDatePolicy::Drop;
        cfg.chart.default_scale = Scale::High;

        save_config(&docbind_dir, &cfg).unwrap();
        let loaded = load_config(Some(&docbind_dir)).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[backend]\nurl = \"http://localhost:9000\"\n\n[chart]\ndefault_scale = 1.5\n",
        )
        .unwrap();

        let cfg = load_config(Some(dir.path())).unwrap();
        assert_eq!(cfg.backend.url, "http://localhost:9000");
        assert_eq!(cfg.backend.timeout_secs, 30);
        assert_eq!(cfg.chart.default_scale, Scale::Medium);
        assert_eq!(cfg.export.extension, "docx");
    }

    #[test]
    fn test_bad_scale_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[chart]\ndefault_scale = 2\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(Some(dir.path())),
            Err(ConfigError::Extract(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let mut cfg = DocbindConfig::default();
        cfg.backend.url = "ftp://example.com".into();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "backend.url"
        ));
    }

    #[test]
    fn test_settings_path_resolution() {
        let cfg = DocbindConfig::default();
        assert_eq!(
            cfg.settings_path(Some(Path::new("/proj/.docbind"))),
            PathBuf::from("/proj/.docbind/settings.json")
        );
        assert_eq!(
            cfg.settings_path(None),
            PathBuf::from(".docbind/settings.json")
        );
    }
}
