//! Backend boundary for docbind.
//!
//! Provides the [`ReportBackend`] and [`SettingsStore`] traits, an HTTP
//! implementation ([`HttpBackend`]), a JSON-file settings store
//! ([`FileSettingsStore`]) and an in-memory backend ([`InMemoryBackend`]).

pub mod error;
pub mod file_settings;
pub mod http;
pub mod memory;
pub mod traits;

pub use error::BackendError;
pub use file_settings::FileSettingsStore;
pub use http::HttpBackend;
pub use memory::InMemoryBackend;
pub use traits::{ChartArtifact, ChartRenderRequest, EvaluationResults, ReportBackend, SettingsStore};
