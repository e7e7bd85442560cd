//! Configuration management for docbind.
//!
//! This crate discovers the `.docbind/` project directory, layers
//! `.docbind/config.toml` and `DOCBIND_*` environment variables over the
//! built-in defaults, and provides typed access to the result.

pub mod config;
pub mod project_dir;

pub use config::{load_config, save_config, ConfigError, DocbindConfig, SettingsSource};
