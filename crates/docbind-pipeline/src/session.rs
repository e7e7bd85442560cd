//! Session state owned by the orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use docbind_core::{Binding, BindingMap, BindingStore, DateRange, Dataset, END_DATE, START_DATE};

use crate::display::{DisplayState, VariableDisplay};
use crate::request::{RequestGuard, RequestToken};

/// Bindings, working dataset and display state for one editing session.
///
/// Every change to the bindings or the dataset bumps [`revision`], which
/// render passes compare against to detect that their snapshot went stale.
///
/// [`revision`]: ReportSession::revision
#[derive(Debug, Default)]
pub struct ReportSession {
    store: BindingStore,
    dataset: Option<Arc<Dataset>>,
    range: Option<DateRange>,
    display: DisplayState,
    columns: Option<Vec<String>>,
    revision: u64,
    filter_requests: RequestGuard,
    render_requests: RequestGuard,
    chart_requests: HashMap<String, RequestGuard>,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Read access ---------------------------------------------------------

    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.store.get(name)
    }

    /// The working dataset, once a filter has succeeded.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub(crate) fn dataset_arc(&self) -> Option<Arc<Dataset>> {
        self.dataset.clone()
    }

    /// Range of the last successful filter.
    pub fn range(&self) -> Option<&DateRange> {
        self.range.as_ref()
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Cached column list, if it has been fetched.
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // -- Mutation ------------------------------------------------------------

    /// Replaces one binding. No validation happens here.
    pub fn set_binding(&mut self, name: impl Into<String>, binding: Binding) {
        self.store.set(name, binding);
        self.revision += 1;
    }

    /// Replaces the whole binding map.
    pub fn replace_bindings(&mut self, bindings: BindingMap) {
        self.store.set_all(bindings);
        self.revision += 1;
        let store = &self.store;
        self.display.retain_bound(|name| store.get(name).is_some());
    }

    pub fn set_columns(&mut self, columns: Vec<String>) {
        self.columns = Some(columns);
    }

    pub(crate) fn display_mut(&mut self) -> &mut DisplayState {
        &mut self.display
    }

    /// Installs a filter result: the new working dataset plus the reserved
    /// date bindings, overwritten with the range that produced it.
    ///
    /// The date displays are written here too, since a range with no rows
    /// never gets a render pass.
    pub(crate) fn install_filter(&mut self, range: DateRange, dataset: Dataset) {
        self.store.set(START_DATE, Binding::fixed(range.start.clone()));
        self.store.set(END_DATE, Binding::fixed(range.end.clone()));
        self.display.set(START_DATE, VariableDisplay::text(range.start.clone()));
        self.display.set(END_DATE, VariableDisplay::text(range.end.clone()));
        self.dataset = Some(Arc::new(dataset));
        self.range = Some(range);
        self.revision += 1;
    }

    // -- Request tokens ------------------------------------------------------

    pub(crate) fn issue_filter(&mut self) -> RequestToken {
        self.filter_requests.issue()
    }

    pub(crate) fn filter_is_current(&self, token: RequestToken) -> bool {
        self.filter_requests.is_current(token)
    }

    pub(crate) fn issue_render(&mut self) -> RequestToken {
        self.render_requests.issue()
    }

    pub(crate) fn render_is_current(&self, token: RequestToken) -> bool {
        self.render_requests.is_current(token)
    }

    pub(crate) fn issue_chart(&mut self, variable: &str) -> RequestToken {
        self.chart_requests
            .entry(variable.to_string())
            .or_default()
            .issue()
    }

    pub(crate) fn chart_is_current(&self, variable: &str, token: RequestToken) -> bool {
        self.chart_requests
            .get(variable)
            .is_some_and(|guard| guard.is_current(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_filter_overwrites_date_bindings() {
        let mut session = ReportSession::new();
        session.install_filter(DateRange::new("2024-01-01", "2024-01-07"), Dataset::default());
        session.install_filter(DateRange::new("2024-02-01", "2024-02-07"), Dataset::default());

        assert_eq!(session.binding(START_DATE), Some(&Binding::fixed("2024-02-01")));
        assert_eq!(session.binding(END_DATE), Some(&Binding::fixed("2024-02-07")));
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.display().get(START_DATE), Some(&VariableDisplay::text("2024-02-01")));
        assert_eq!(session.display().get(END_DATE), Some(&VariableDisplay::text("2024-02-07")));
    }

    #[test]
    fn mutations_bump_revision() {
        let mut session = ReportSession::new();
        let r0 = session.revision();
        session.set_binding("owner", Binding::fixed("Ops"));
        let r1 = session.revision();
        session.replace_bindings(BindingMap::new());
        assert!(r0 < r1 && r1 < session.revision());

        // Columns are metadata, not session content.
        let r2 = session.revision();
        session.set_columns(vec!["date".into()]);
        assert_eq!(session.revision(), r2);
    }

    #[test]
    fn replacing_bindings_drops_stale_display() {
        let mut session = ReportSession::new();
        session.set_binding("a", Binding::fixed("1"));
        session.display_mut().set("a", VariableDisplay::text("1"));
        session.display_mut().set("gone", VariableDisplay::text("x"));

        let mut map = BindingMap::new();
        map.insert("a".into(), Binding::fixed("2"));
        session.replace_bindings(map);

        assert!(session.display().get("a").is_some());
        assert!(session.display().get("gone").is_none());
    }
}
