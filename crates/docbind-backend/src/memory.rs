//! In-memory backend.
//!
//! Holds a full dataset and answers every endpoint locally. Formula results
//! are scripted per expression. Every call is recorded so callers can assert
//! on what was (or was not) sent, and individual endpoints can be made to
//! fail with a transport error.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use docbind_core::dates::canonical_date_key;
use docbind_core::{Binding, BindingMap, DateRange, Dataset, Record, Scale, Settings};

use crate::error::{BackendError, Result};
use crate::traits::{ChartArtifact, ChartRenderRequest, EvaluationResults, ReportBackend, SettingsStore};

/// Default record field compared against the filter range.
pub const DEFAULT_DATE_FIELD: &str = "date";

/// Backend operations, used to target failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Filter,
    Evaluate,
    RenderChart,
    Columns,
    Export,
    Settings,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Self::Filter => "/filter_data",
            Self::Evaluate => "/render_preview",
            Self::RenderChart => "/render_chart",
            Self::Columns => "/columns",
            Self::Export => "/render",
            Self::Settings => "/settings",
        }
    }
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Filter(DateRange),
    /// Names of the formula bindings that were submitted.
    Evaluate(Vec<String>),
    RenderChart { variable: String, scale: Scale, rows: usize },
    Columns,
    Export { filename: String },
    SaveSettings,
    LoadSettings,
}

#[derive(Default)]
struct State {
    calls: Vec<BackendCall>,
    failing: HashSet<Endpoint>,
    chart_rejections: HashMap<String, String>,
    settings: Option<Settings>,
    chart_seq: u64,
}

pub struct InMemoryBackend {
    records: Vec<Record>,
    date_field: String,
    columns: Vec<String>,
    formula_results: HashMap<String, Value>,
    error_prefix: String,
    state: Mutex<State>,
}

impl InMemoryBackend {
    /// Columns default to the keys of the first record.
    pub fn new(records: Vec<Record>) -> Self {
        let columns = records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            records,
            date_field: DEFAULT_DATE_FIELD.to_string(),
            columns,
            formula_results: HashMap::new(),
            error_prefix: "錯誤".to_string(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_date_field(mut self, field: impl Into<String>) -> Self {
        self.date_field = field.into();
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Script the value returned for a formula expression.
    pub fn with_formula_result(mut self, expression: impl Into<String>, value: Value) -> Self {
        self.formula_results.insert(expression.into(), value);
        self
    }

    pub fn with_error_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.error_prefix = prefix.into();
        self
    }

    pub fn with_settings(self, settings: Settings) -> Self {
        self.lock().settings = Some(settings);
        self
    }

    /// Make every call to `endpoint` fail with a transport error.
    pub fn fail(&self, endpoint: Endpoint) {
        self.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().failing.remove(&endpoint);
    }

    /// Make chart rendering for `variable` answer with an error message.
    pub fn reject_chart(&self, variable: impl Into<String>, message: impl Into<String>) {
        self.lock()
            .chart_rejections
            .insert(variable.into(), message.into());
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// The settings document currently held by the backend.
    pub fn stored_settings(&self) -> Option<Settings> {
        self.lock().settings.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call, then fails it if the endpoint is marked failing.
    fn enter(&self, endpoint: Endpoint, call: BackendCall) -> Result<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(&endpoint) {
            return Err(BackendError::transport(endpoint.path(), "connection refused"));
        }
        Ok(state)
    }

    fn range_key(endpoint: Endpoint, raw: &str) -> Result<String> {
        canonical_date_key(&Value::String(raw.to_string()))
            .ok_or_else(|| BackendError::rejected(endpoint.path(), format!("invalid date: {raw}")))
    }
}

impl ReportBackend for InMemoryBackend {
    fn filter(&self, range: &DateRange) -> Result<Dataset> {
        let _state = self.enter(Endpoint::Filter, BackendCall::Filter(range.clone()))?;
        let start = Self::range_key(Endpoint::Filter, &range.start)?;
        let end = Self::range_key(Endpoint::Filter, &range.end)?;

        let records = self
            .records
            .iter()
            .filter(|record| {
                record
                    .get(&self.date_field)
                    .and_then(canonical_date_key)
                    .is_some_and(|day| day >= start && day <= end)
            })
            .cloned()
            .collect::<Vec<_>>();
        Ok(Dataset::new(records))
    }

    fn evaluate(&self, bindings: &BindingMap, _dataset: &Dataset) -> Result<EvaluationResults> {
        let formulas: Vec<(&String, &String)> = bindings
            .iter()
            .filter_map(|(name, binding)| match binding {
                Binding::Formula { expression } => Some((name, expression)),
                _ => None,
            })
            .collect();
        let names = formulas.iter().map(|(name, _)| (*name).clone()).collect();
        let _state = self.enter(Endpoint::Evaluate, BackendCall::Evaluate(names))?;

        Ok(formulas
            .into_iter()
            .map(|(name, expression)| {
                let value = self.formula_results.get(expression).cloned().unwrap_or_else(|| {
                    Value::String(format!("{}: unknown formula `{expression}`", self.error_prefix))
                });
                (name.clone(), value)
            })
            .collect())
    }

    fn render_chart(&self, request: &ChartRenderRequest) -> Result<ChartArtifact> {
        let call = BackendCall::RenderChart {
            variable: request.variable.clone(),
            scale: request.scale,
            rows: request.data.len(),
        };
        let mut state = self.enter(Endpoint::RenderChart, call)?;
        if let Some(message) = state.chart_rejections.get(&request.variable) {
            return Err(BackendError::rejected(Endpoint::RenderChart.path(), message.clone()));
        }
        state.chart_seq += 1;
        Ok(ChartArtifact {
            variable: request.variable.clone(),
            location: format!("memory://charts/{}/{}", request.variable, state.chart_seq),
        })
    }

    fn columns(&self) -> Result<Vec<String>> {
        let _state = self.enter(Endpoint::Columns, BackendCall::Columns)?;
        Ok(self.columns.clone())
    }

    fn export_document(
        &self,
        bindings: &BindingMap,
        dataset: &Dataset,
        filename: &str,
    ) -> Result<Vec<u8>> {
        let call = BackendCall::Export {
            filename: filename.to_string(),
        };
        let _state = self.enter(Endpoint::Export, call)?;
        let document = json!({
            "filename": filename,
            "variables": bindings.keys().collect::<Vec<_>>(),
            "rows": dataset.len(),
        });
        Ok(serde_json::to_vec_pretty(&document)?)
    }
}

impl SettingsStore for InMemoryBackend {
    fn save_settings(&self, settings: &Settings) -> Result<()> {
        let mut state = self.enter(Endpoint::Settings, BackendCall::SaveSettings)?;
        state.settings = Some(settings.clone());
        Ok(())
    }

    fn load_settings(&self) -> Result<Option<Settings>> {
        let state = self.enter(Endpoint::Settings, BackendCall::LoadSettings)?;
        Ok(state.settings.clone())
    }
}
