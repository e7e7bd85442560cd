//! Single-variable chart edits.
//!
//! The binding is replaced first; the chart is then regenerated and the
//! result applied only while that binding is still the one in the store
//! and the working dataset is the one it was aggregated from.
//! The variable's old artifact is cleared when the edit is accepted, so the
//! display is never older than the saved binding.

use std::sync::Arc;

use tracing::{debug, info, warn};

use docbind_backend::{BackendError, ChartArtifact, ChartRenderRequest, ReportBackend};
use docbind_chart::aggregate_dataset;
use docbind_core::validation::{require_chart, validate_chart};
use docbind_core::{Binding, ChartSpec, ChartType, Dataset, Scale};

use crate::display::VariableDisplay;
use crate::error::Result;
use crate::preview::{PreviewOptions, chart_request};
use crate::request::{Completion, RequestToken};
use crate::session::ReportSession;

/// A quick-edit request for one chart variable.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickEdit {
    pub variable: String,
    pub x_field: String,
    pub y_field: String,
    pub chart_type: ChartType,
    pub title: Option<String>,
    pub scale: Scale,
}

impl QuickEdit {
    pub fn new(
        variable: impl Into<String>,
        x_field: impl Into<String>,
        y_field: impl Into<String>,
        chart_type: ChartType,
    ) -> Self {
        Self {
            variable: variable.into(),
            x_field: x_field.into(),
            y_field: y_field.into(),
            chart_type,
            title: None,
            scale: Scale::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    fn spec(&self) -> ChartSpec {
        ChartSpec {
            x_field: self.x_field.clone(),
            y_field: self.y_field.clone(),
            chart_type: self.chart_type.clone(),
            title: self.title.clone(),
        }
    }
}

/// An accepted edit whose chart is being regenerated.
#[derive(Debug)]
pub struct PendingChart {
    token: RequestToken,
    spec: ChartSpec,
    dataset: Option<Arc<Dataset>>,
    request: ChartRenderRequest,
}

impl PendingChart {
    pub fn request(&self) -> &ChartRenderRequest {
        &self.request
    }
}

/// Validates the edit and, if accepted, replaces the chart binding.
///
/// Rejected edits (unbound or non-chart variable, incomplete spec, unknown
/// column) leave the session untouched.
pub fn begin(
    session: &mut ReportSession,
    edit: QuickEdit,
    options: &PreviewOptions,
) -> Result<PendingChart> {
    require_chart(&edit.variable, session.binding(&edit.variable))?;
    let spec = edit.spec();
    validate_chart(&edit.variable, &spec, session.columns())?;

    let empty = Dataset::default();
    let dataset = session.dataset_arc();
    let data = dataset.as_deref().unwrap_or(&empty);
    let series = aggregate_dataset(data, &spec, options.aggregate)?;
    let request = chart_request(&edit.variable, &spec, data, edit.scale, series);

    session.set_binding(edit.variable.clone(), Binding::chart(spec.clone()));
    session.display_mut().remove(&edit.variable);
    let token = session.issue_chart(&edit.variable);
    debug!(%token, variable = %edit.variable, scale = %edit.scale, "chart regeneration issued");

    Ok(PendingChart {
        token,
        spec,
        dataset,
        request,
    })
}

/// Applies the regeneration answer.
///
/// A result for a superseded edit is dropped, as is one aggregated from a
/// dataset that a newer filter has since replaced. A failed regeneration marks
/// the variable as failed and returns the error.
pub fn complete(
    session: &mut ReportSession,
    pending: PendingChart,
    result: std::result::Result<ChartArtifact, BackendError>,
) -> Result<Completion> {
    let variable = pending.request.variable.clone();
    let still_bound = matches!(
        session.binding(&variable),
        Some(Binding::Chart(current)) if *current == pending.spec
    );
    let same_dataset = match (&pending.dataset, session.dataset_arc()) {
        (Some(then), Some(now)) => Arc::ptr_eq(then, &now),
        (None, None) => true,
        _ => false,
    };
    if !session.chart_is_current(&variable, pending.token) || !still_bound || !same_dataset {
        debug!(%variable, "discarding stale chart regeneration");
        return Ok(Completion::Superseded);
    }

    match result {
        Ok(artifact) => {
            info!(%variable, location = %artifact.location, "chart regenerated");
            session.display_mut().set(
                variable,
                VariableDisplay::Chart {
                    title: pending.request.title,
                    series: pending.request.series,
                    artifact,
                },
            );
            Ok(Completion::Applied)
        }
        Err(e) => {
            warn!(%variable, error = %e, "chart regeneration failed");
            session
                .display_mut()
                .set(variable, VariableDisplay::error(e.to_string()));
            Err(e.into())
        }
    }
}

/// Runs a whole quick edit and returns the new artifact.
pub fn run<B: ReportBackend>(
    session: &mut ReportSession,
    backend: &B,
    edit: QuickEdit,
    options: &PreviewOptions,
) -> Result<Option<ChartArtifact>> {
    let pending = begin(session, edit, options)?;
    let result = backend.render_chart(pending.request());
    let artifact = result.as_ref().ok().cloned();
    match complete(session, pending, result)? {
        Completion::Applied => Ok(artifact),
        Completion::Superseded => Ok(None),
    }
}
