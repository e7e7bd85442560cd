//! Backend and settings traits -- the contracts the pipeline depends on.
//!
//! Consumers depend on these traits rather than on [`HttpBackend`] so that
//! alternative backends (the in-memory one, proxies) can be substituted.
//!
//! [`HttpBackend`]: crate::http::HttpBackend

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use docbind_chart::ChartSeries;
use docbind_core::{BindingMap, ChartType, DateRange, Dataset, Scale, Settings};

use crate::error::Result;

/// Variable name -> scalar display value or backend error string.
pub type EvaluationResults = BTreeMap<String, Value>;

/// Everything the backend needs to (re)generate one chart artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRenderRequest {
    pub variable: String,
    pub x_field: String,
    pub y_field: String,
    pub chart_type: ChartType,
    /// Already resolved: the variable name when the binding has no title.
    pub title: String,
    pub scale: Scale,
    pub series: ChartSeries,
    /// Rows where both axes are defined.
    pub data: Dataset,
}

/// Reference to a chart image held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub variable: String,
    pub location: String,
}

/// The evaluation, rendering and export endpoints.
pub trait ReportBackend {
    /// Records of the full dataset falling inside `range`, in order.
    fn filter(&self, range: &DateRange) -> Result<Dataset>;

    /// Evaluate the formula bindings in `bindings` against `dataset`.
    fn evaluate(&self, bindings: &BindingMap, dataset: &Dataset) -> Result<EvaluationResults>;

    /// Render (or re-render) the chart artifact for one variable.
    fn render_chart(&self, request: &ChartRenderRequest) -> Result<ChartArtifact>;

    /// Available dataset columns, in backend order.
    fn columns(&self) -> Result<Vec<String>>;

    /// Produce the final document.
    fn export_document(
        &self,
        bindings: &BindingMap,
        dataset: &Dataset,
        filename: &str,
    ) -> Result<Vec<u8>>;
}

/// Whole-document persistence of the binding map.
pub trait SettingsStore {
    fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// `Ok(None)` when nothing has been saved yet.
    fn load_settings(&self) -> Result<Option<Settings>>;
}

impl<T: ReportBackend + ?Sized> ReportBackend for &T {
    fn filter(&self, range: &DateRange) -> Result<Dataset> {
        (**self).filter(range)
    }

    fn evaluate(&self, bindings: &BindingMap, dataset: &Dataset) -> Result<EvaluationResults> {
        (**self).evaluate(bindings, dataset)
    }

    fn render_chart(&self, request: &ChartRenderRequest) -> Result<ChartArtifact> {
        (**self).render_chart(request)
    }

    fn columns(&self) -> Result<Vec<String>> {
        (**self).columns()
    }

    fn export_document(
        &self,
        bindings: &BindingMap,
        dataset: &Dataset,
        filename: &str,
    ) -> Result<Vec<u8>> {
        (**self).export_document(bindings, dataset, filename)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn save_settings(&self, settings: &Settings) -> Result<()> {
        (**self).save_settings(settings)
    }

    fn load_settings(&self) -> Result<Option<Settings>> {
        (**self).load_settings()
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for Box<T> {
    fn save_settings(&self, settings: &Settings) -> Result<()> {
        (**self).save_settings(settings)
    }

    fn load_settings(&self) -> Result<Option<Settings>> {
        (**self).load_settings()
    }
}
