//! The orchestrator: owns the session and sequences the components.

use tracing::{debug, info};

use docbind_backend::{ChartArtifact, ReportBackend, SettingsStore};
use docbind_core::validation::validate_binding;
use docbind_core::{Binding, DateRange, Settings};

use crate::error::Result;
use crate::export::{self, ExportOptions, ExportedDocument};
use crate::filter;
use crate::preview::{self, PreviewOptions};
use crate::quick_edit::{self, QuickEdit};
use crate::request::Completion;
use crate::session::ReportSession;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    pub preview: PreviewOptions,
    pub export: ExportOptions,
}

/// What [`ReportPipeline::startup`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub settings_loaded: bool,
    pub filtered: bool,
}

/// Drives the filter, render, quick-edit and export flows for one session.
pub struct ReportPipeline<B, S> {
    backend: B,
    settings: S,
    session: ReportSession,
    options: PipelineOptions,
}

impl<B: ReportBackend, S: SettingsStore> ReportPipeline<B, S> {
    pub fn new(backend: B, settings: S, options: PipelineOptions) -> Self {
        Self {
            backend,
            settings,
            session: ReportSession::new(),
            options,
        }
    }

    pub fn session(&self) -> &ReportSession {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Loads saved settings and, when some were found and `range` is given,
    /// submits the filter (which renders).
    ///
    /// Missing settings are expected on first use and are not an error.
    pub fn startup(&mut self, range: Option<DateRange>) -> Result<StartupReport> {
        let mut report = StartupReport {
            settings_loaded: self.load_bindings()?,
            ..StartupReport::default()
        };
        if report.settings_loaded {
            if let Some(range) = range {
                report.filtered = self.submit_filter(range)?.is_applied();
            }
        }
        Ok(report)
    }

    /// Filters the dataset, installs the date bindings, then renders.
    pub fn submit_filter(&mut self, range: DateRange) -> Result<Completion> {
        let completion = filter::run(&mut self.session, &self.backend, range)?;
        if completion.is_applied() {
            self.render()?;
        }
        Ok(completion)
    }

    /// Runs a render pass. `None` when there was nothing to render.
    pub fn render(&mut self) -> Result<Option<Completion>> {
        preview::run(&mut self.session, &self.backend, &self.options.preview)
    }

    /// Saves an interactive edit and re-renders.
    pub fn set_binding(&mut self, name: &str, binding: Binding) -> Result<()> {
        validate_binding(name, &binding, self.session.columns())?;
        debug!(variable = name, kind = binding.type_name(), "binding set");
        self.session.set_binding(name, binding);
        self.render()?;
        Ok(())
    }

    pub fn quick_edit(&mut self, edit: QuickEdit) -> Result<Option<ChartArtifact>> {
        quick_edit::run(&mut self.session, &self.backend, edit, &self.options.preview)
    }

    /// Persists the full binding map, then re-renders.
    pub fn save_settings(&mut self) -> Result<()> {
        let settings = Settings::from_store(self.session.store());
        self.settings.save_settings(&settings)?;
        info!(bindings = settings.formulas.len(), "settings saved");
        self.render()?;
        Ok(())
    }

    /// Replaces the bindings with the saved ones and re-renders. Returns
    /// `false` when nothing has been saved yet.
    pub fn load_settings(&mut self) -> Result<bool> {
        let loaded = self.load_bindings()?;
        if loaded {
            self.render()?;
        }
        Ok(loaded)
    }

    fn load_bindings(&mut self) -> Result<bool> {
        match self.settings.load_settings()? {
            Some(settings) => {
                info!(bindings = settings.formulas.len(), "settings loaded");
                self.session.replace_bindings(settings.formulas);
                Ok(true)
            }
            None => {
                info!("no saved settings");
                Ok(false)
            }
        }
    }

    pub fn export(&self, filename: Option<&str>) -> Result<ExportedDocument> {
        export::run(&self.session, &self.backend, filename, &self.options.export)
    }

    /// Fetches the column list and caches it for edit validation.
    pub fn columns(&mut self) -> Result<Vec<String>> {
        let columns = self.backend.columns()?;
        self.session.set_columns(columns.clone());
        Ok(columns)
    }
}
