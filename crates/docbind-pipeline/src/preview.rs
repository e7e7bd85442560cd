//! Preview renderer: resolves every binding against the working dataset.
//!
//! A pass is split in three:
//! 1. [`begin`] snapshots bindings and dataset and issues a render token.
//! 2. [`resolve`] talks to the backend using only the snapshot.
//! 3. [`complete`] applies the outcome if the token is still the latest
//!    and nothing changed since the snapshot was taken.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use docbind_backend::{BackendError, ChartRenderRequest, ReportBackend};
use docbind_chart::{AggregateOptions, ChartError, ChartSeries, aggregate_dataset};
use docbind_core::{Binding, BindingMap, ChartSpec, Dataset, Scale};

use crate::display::VariableDisplay;
use crate::error::Result;
use crate::request::{Completion, RequestToken};
use crate::session::ReportSession;

/// Settings that shape a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOptions {
    /// Evaluation results starting with this mark the variable as failed.
    pub error_prefix: String,
    pub aggregate: AggregateOptions,
    /// Scale used when a pass (re)renders chart artifacts.
    pub scale: Scale,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            error_prefix: "錯誤".to_string(),
            aggregate: AggregateOptions::default(),
            scale: Scale::default(),
        }
    }
}

/// The immutable input of one render pass.
#[derive(Debug)]
pub struct PendingRender {
    token: RequestToken,
    revision: u64,
    bindings: BindingMap,
    dataset: Arc<Dataset>,
}

impl PendingRender {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn bindings(&self) -> &BindingMap {
        &self.bindings
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

/// Displays computed by one pass.
///
/// Formula variables the backend returned nothing for are absent and keep
/// their previous display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutcome {
    pub entries: BTreeMap<String, VariableDisplay>,
}

/// Takes a snapshot for a new pass, superseding any pass in flight.
///
/// Returns `None` (no pass) when there is no working dataset, the dataset
/// is empty, or nothing is bound.
pub fn begin(session: &mut ReportSession) -> Option<PendingRender> {
    let dataset = session.dataset_arc().filter(|d| !d.is_empty());
    let Some(dataset) = dataset else {
        debug!("render skipped: no filtered data");
        return None;
    };
    if session.store().is_empty() {
        debug!("render skipped: no bindings");
        return None;
    }
    let token = session.issue_render();
    debug!(%token, bindings = session.store().len(), rows = dataset.len(), "render pass started");
    Some(PendingRender {
        token,
        revision: session.revision(),
        bindings: session.store().snapshot(),
        dataset,
    })
}

/// Resolves every binding of the snapshot.
///
/// Backend-reported problems (formula error strings, rejected charts,
/// unsupported chart types) become per-variable errors. A transport
/// failure aborts the whole pass.
pub fn resolve<B: ReportBackend>(
    backend: &B,
    pending: &PendingRender,
    options: &PreviewOptions,
) -> std::result::Result<RenderOutcome, BackendError> {
    let has_formula = pending
        .bindings
        .values()
        .any(|b| matches!(b, Binding::Formula { .. }));
    let evaluated = if has_formula {
        backend.evaluate(&pending.bindings, &pending.dataset)?
    } else {
        BTreeMap::new()
    };

    let mut outcome = RenderOutcome::default();
    for (name, binding) in &pending.bindings {
        let display = match binding {
            Binding::Fixed { value } => VariableDisplay::text(value.clone()),
            Binding::Formula { .. } => match evaluated.get(name) {
                Some(value) => VariableDisplay::from_evaluation(value, &options.error_prefix),
                None => continue,
            },
            Binding::Chart(spec) => {
                render_chart(backend, name, spec, &pending.dataset, options)?
            }
        };
        outcome.entries.insert(name.clone(), display);
    }
    Ok(outcome)
}

fn render_chart<B: ReportBackend>(
    backend: &B,
    variable: &str,
    spec: &ChartSpec,
    dataset: &Dataset,
    options: &PreviewOptions,
) -> std::result::Result<VariableDisplay, BackendError> {
    let series = match aggregate_dataset(dataset, spec, options.aggregate) {
        Ok(series) => series,
        Err(e @ ChartError::UnsupportedChartType(_)) => {
            warn!(variable, error = %e, "chart skipped");
            return Ok(VariableDisplay::error(e.to_string()));
        }
    };
    let request = chart_request(variable, spec, dataset, options.scale, series);
    match backend.render_chart(&request) {
        Ok(artifact) => Ok(VariableDisplay::Chart {
            title: request.title,
            series: request.series,
            artifact,
        }),
        Err(e) if e.is_transport() => Err(e),
        Err(e) => Ok(VariableDisplay::error(e.to_string())),
    }
}

/// Builds the regeneration request for one chart binding.
pub(crate) fn chart_request(
    variable: &str,
    spec: &ChartSpec,
    dataset: &Dataset,
    scale: Scale,
    series: ChartSeries,
) -> ChartRenderRequest {
    ChartRenderRequest {
        variable: variable.to_string(),
        x_field: spec.x_field.clone(),
        y_field: spec.y_field.clone(),
        chart_type: spec.chart_type.clone(),
        title: spec.resolved_title(variable).to_string(),
        scale,
        series,
        data: dataset.select_defined(&[spec.x_field.as_str(), spec.y_field.as_str()]),
    }
}

/// Applies a pass outcome unless it went stale.
pub fn complete(
    session: &mut ReportSession,
    pending: PendingRender,
    outcome: RenderOutcome,
) -> Completion {
    if !session.render_is_current(pending.token) || session.revision() != pending.revision {
        debug!(token = %pending.token, "discarding stale render pass");
        return Completion::Superseded;
    }
    let bindings = pending.bindings;
    let display = session.display_mut();
    display.retain_bound(|name| bindings.contains_key(name));
    let errors = outcome.entries.values().filter(|d| d.is_error()).count();
    for (name, entry) in outcome.entries {
        display.set(name, entry);
    }
    info!(token = %pending.token, errors, "render pass applied");
    Completion::Applied
}

/// Runs a full pass. `Ok(None)` means there was nothing to render.
pub fn run<B: ReportBackend>(
    session: &mut ReportSession,
    backend: &B,
    options: &PreviewOptions,
) -> Result<Option<Completion>> {
    let Some(pending) = begin(session) else {
        return Ok(None);
    };
    let outcome = resolve(backend, &pending, options)?;
    Ok(Some(complete(session, pending, outcome)))
}
