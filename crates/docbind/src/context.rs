//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what every command handler needs: the
//! resolved `.docbind` directory, the effective configuration and the
//! global output flags. It also builds the backend, the settings store and
//! the pipeline from that configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use docbind_backend::{FileSettingsStore, HttpBackend, SettingsStore};
use docbind_chart::AggregateOptions;
use docbind_config::project_dir::find_docbind_dir;
use docbind_config::{load_config, DocbindConfig, SettingsSource};
use docbind_pipeline::{ExportOptions, PipelineOptions, PreviewOptions, ReportPipeline};

use crate::cli::GlobalArgs;

/// The pipeline as the CLI runs it.
pub type CliPipeline = ReportPipeline<HttpBackend, Box<dyn SettingsStore>>;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Resolved `.docbind` directory, if one was found.
    pub docbind_dir: Option<PathBuf>,

    /// Effective configuration after all layers and flags.
    pub config: DocbindConfig,

    /// Explicit settings file from `--settings-file`.
    pub settings_file: Option<PathBuf>,

    /// Whether to produce JSON output.
    pub json: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// Flags win over `DOCBIND_*` variables, which win over
    /// `.docbind/config.toml`.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let cwd = env::current_dir().context("cannot determine the current directory")?;
        let docbind_dir = find_docbind_dir(&cwd);
        let mut config =
            load_config(docbind_dir.as_deref()).context("failed to load configuration")?;

        if let Some(url) = &global.backend_url {
            config.backend.url = url.clone();
            config.validate().context("invalid --backend-url")?;
        }
        if global.settings_file.is_some() {
            config.settings.source = SettingsSource::File;
        }
        debug!(
            dir = ?docbind_dir,
            backend = %config.backend.url,
            settings = ?config.settings.source,
            "runtime context resolved"
        );

        Ok(Self {
            docbind_dir,
            config,
            settings_file: global.settings_file.clone(),
            json: global.json,
        })
    }

    pub fn backend(&self) -> HttpBackend {
        HttpBackend::new(
            &self.config.backend.url,
            Duration::from_secs(self.config.backend.timeout_secs),
        )
    }

    /// Where file-backed settings live.
    pub fn settings_path(&self) -> PathBuf {
        match &self.settings_file {
            Some(path) => path.clone(),
            None => self.config.settings_path(self.docbind_dir.as_deref()),
        }
    }

    pub fn settings_store(&self) -> Box<dyn SettingsStore> {
        match self.config.settings.source {
            SettingsSource::Backend => Box::new(self.backend()),
            SettingsSource::File => Box::new(FileSettingsStore::new(self.settings_path())),
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            preview: PreviewOptions {
                error_prefix: self.config.preview.error_prefix.clone(),
                aggregate: AggregateOptions {
                    invalid_dates: self.config.preview.invalid_dates,
                },
                scale: self.config.chart.default_scale,
            },
            export: ExportOptions {
                default_filename: self.config.export.default_filename.clone(),
                extension: self.config.export.extension.clone(),
            },
        }
    }

    pub fn pipeline(&self) -> CliPipeline {
        ReportPipeline::new(self.backend(), self.settings_store(), self.pipeline_options())
    }
}
