//! Pipeline flows against the in-memory backend.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use docbind_backend::memory::{BackendCall, Endpoint};
use docbind_backend::{InMemoryBackend, ReportBackend};
use docbind_core::{
    Binding, BindingMap, ChartSpec, ChartType, DateRange, Record, Scale, Settings, END_DATE,
    START_DATE,
};
use docbind_pipeline::{
    filter, preview, quick_edit, Completion, PipelineOptions, QuickEdit, ReportPipeline,
    ReportSession, VariableDisplay,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rec(date: &str, category: &str, amount: Value) -> Record {
    let mut r = Record::new();
    r.insert("date".into(), json!(date));
    r.insert("category".into(), json!(category));
    r.insert("amount".into(), amount);
    r
}

/// Four rows fall inside [`january`]; the last one does not.
fn fixture() -> Vec<Record> {
    vec![
        rec("2024-01-01", "a", json!(2)),
        rec("2024-01-01T23:00:00", "a", json!(3)),
        rec("2024-01-02", "b", json!(1)),
        rec("2024-01-03", "b", json!("n/a")),
        rec("2024-02-10", "c", json!(100)),
    ]
}

fn january() -> DateRange {
    DateRange::new("2024-01-01", "2024-01-07")
}

fn bar_by_category() -> Binding {
    Binding::chart(ChartSpec::new("category", "amount", ChartType::Bar))
}

fn settings(entries: &[(&str, Binding)]) -> Settings {
    let map: BindingMap = entries
        .iter()
        .map(|(name, binding)| (name.to_string(), binding.clone()))
        .collect();
    Settings::new(map)
}

fn pipeline(backend: &InMemoryBackend) -> ReportPipeline<&InMemoryBackend, &InMemoryBackend> {
    ReportPipeline::new(backend, backend, PipelineOptions::default())
}

fn chart_display(display: Option<&VariableDisplay>) -> (&str, &docbind_chart::ChartSeries) {
    match display {
        Some(VariableDisplay::Chart { title, series, .. }) => (title.as_str(), series),
        other => panic!("expected a chart display, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[test]
fn filter_installs_date_bindings_and_dataset() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);

    assert_eq!(p.submit_filter(january()).unwrap(), Completion::Applied);

    let session = p.session();
    assert_eq!(session.binding(START_DATE), Some(&Binding::fixed("2024-01-01")));
    assert_eq!(session.binding(END_DATE), Some(&Binding::fixed("2024-01-07")));
    assert_eq!(session.dataset().map(|d| d.len()), Some(4));
}

#[test]
fn refilter_overwrites_dates() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);
    p.submit_filter(january()).unwrap();
    p.submit_filter(DateRange::new("2024-02-01", "2024-02-29")).unwrap();

    assert_eq!(p.session().binding(START_DATE), Some(&Binding::fixed("2024-02-01")));
    assert_eq!(p.session().binding(END_DATE), Some(&Binding::fixed("2024-02-29")));
    assert_eq!(p.session().dataset().map(|d| d.len()), Some(1));
}

#[test]
fn refilter_to_an_empty_range_updates_date_displays() {
    let backend = InMemoryBackend::new(fixture())
        .with_settings(settings(&[("owner", Binding::fixed("Ops"))]));
    let mut p = pipeline(&backend);
    p.startup(Some(january())).unwrap();
    assert_eq!(
        p.session().display().get(START_DATE),
        Some(&VariableDisplay::text("2024-01-01"))
    );

    assert_eq!(
        p.submit_filter(DateRange::new("2023-05-01", "2023-05-31")).unwrap(),
        Completion::Applied
    );
    assert_eq!(p.session().dataset().map(|d| d.len()), Some(0));
    assert_eq!(
        p.session().display().get(START_DATE),
        Some(&VariableDisplay::text("2023-05-01"))
    );
    assert_eq!(
        p.session().display().get(END_DATE),
        Some(&VariableDisplay::text("2023-05-31"))
    );
}

#[test]
fn empty_dates_never_reach_the_backend() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);

    let err = p.submit_filter(DateRange::new("", "2024-01-31")).unwrap_err();
    assert!(err.is_validation());
    let err = p.submit_filter(DateRange::new("2024-01-01", "")).unwrap_err();
    assert!(err.is_validation());

    assert!(backend.calls().is_empty());
    assert!(p.session().store().is_empty());
    assert!(p.session().dataset().is_none());
}

#[test]
fn stale_filter_result_is_discarded() {
    let backend = InMemoryBackend::new(fixture());
    let mut session = ReportSession::new();

    let older = filter::begin(&mut session, january()).unwrap();
    let newer = filter::begin(&mut session, DateRange::new("2024-02-01", "2024-02-29")).unwrap();

    let newer_rows = backend.filter(newer.range()).unwrap();
    let older_rows = backend.filter(older.range()).unwrap();

    assert_eq!(filter::complete(&mut session, newer, newer_rows), Completion::Applied);
    assert_eq!(filter::complete(&mut session, older, older_rows), Completion::Superseded);
    assert_eq!(session.binding(START_DATE), Some(&Binding::fixed("2024-02-01")));
    assert_eq!(session.dataset().map(|d| d.len()), Some(1));
}

#[test]
fn transport_failure_leaves_session_unchanged() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);
    p.submit_filter(january()).unwrap();

    backend.fail(Endpoint::Filter);
    let err = p.submit_filter(DateRange::new("2024-02-01", "2024-02-29")).unwrap_err();
    assert!(err.is_transport());
    assert_eq!(p.session().binding(START_DATE), Some(&Binding::fixed("2024-01-01")));
    assert_eq!(p.session().dataset().map(|d| d.len()), Some(4));
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[test]
fn render_resolves_each_binding_kind() {
    let backend = InMemoryBackend::new(fixture())
        .with_formula_result("SUM(amount)", json!(6.0))
        .with_settings(settings(&[
            ("owner", Binding::fixed("Ops")),
            ("total", Binding::formula("SUM(amount)")),
            ("broken", Binding::formula("SUMM(amount)")),
            ("by_category", bar_by_category()),
        ]));
    let mut p = pipeline(&backend);

    let report = p.startup(Some(january())).unwrap();
    assert!(report.settings_loaded);
    assert!(report.filtered);

    let display = p.session().display();
    assert_eq!(display.get("owner"), Some(&VariableDisplay::text("Ops")));
    assert_eq!(display.get("total"), Some(&VariableDisplay::text("6")));
    assert!(display.get("broken").is_some_and(VariableDisplay::is_error));
    assert_eq!(display.get(START_DATE), Some(&VariableDisplay::text("2024-01-01")));

    let (title, series) = chart_display(display.get("by_category"));
    assert_eq!(title, "by_category");
    let grouped = series.grouped().unwrap();
    assert_eq!(grouped.labels, vec!["a", "b"]);
    assert_eq!(grouped.values, vec![5.0, 1.0]);
}

#[test]
fn line_chart_collapses_datetimes_into_days() {
    let backend = InMemoryBackend::new(fixture()).with_settings(settings(&[(
        "trend",
        Binding::chart(ChartSpec::new("date", "amount", ChartType::Line).with_title("")),
    )]));
    let mut p = pipeline(&backend);
    p.startup(Some(january())).unwrap();

    let (title, series) = chart_display(p.session().display().get("trend"));
    assert_eq!(title, "");
    let grouped = series.grouped().unwrap();
    assert_eq!(grouped.labels, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
    assert_eq!(grouped.values, vec![5.0, 1.0, 0.0]);
}

#[test]
fn unsupported_chart_type_only_fails_its_variable() {
    let backend = InMemoryBackend::new(fixture()).with_settings(settings(&[
        (
            "cube",
            Binding::chart(ChartSpec::new("category", "amount", ChartType::from("scatter3d"))),
        ),
        ("by_category", bar_by_category()),
        ("owner", Binding::fixed("Ops")),
    ]));
    let mut p = pipeline(&backend);
    p.startup(Some(january())).unwrap();

    let display = p.session().display();
    match display.get("cube") {
        Some(VariableDisplay::Error { message }) => assert!(message.contains("scatter3d")),
        other => panic!("expected an error display, got {other:?}"),
    }
    chart_display(display.get("by_category"));
    assert_eq!(display.get("owner"), Some(&VariableDisplay::text("Ops")));

    let charts_rendered = backend
        .calls()
        .iter()
        .filter(|c| matches!(c, BackendCall::RenderChart { .. }))
        .count();
    assert_eq!(charts_rendered, 1);
}

#[test]
fn rejected_chart_is_a_variable_error() {
    let backend = InMemoryBackend::new(fixture())
        .with_settings(settings(&[("by_category", bar_by_category())]));
    backend.reject_chart("by_category", "y field is not numeric");
    let mut p = pipeline(&backend);
    p.startup(Some(january())).unwrap();

    assert!(p
        .session()
        .display()
        .get("by_category")
        .is_some_and(VariableDisplay::is_error));
}

#[test]
fn render_without_dataset_is_a_noop() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);
    p.set_binding("owner", Binding::fixed("Ops")).unwrap();

    assert_eq!(p.render().unwrap(), None);
    assert!(p.session().display().is_empty());
    assert!(backend.calls().is_empty());
}

#[test]
fn pass_without_formulas_skips_evaluation() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);
    p.submit_filter(january()).unwrap();

    assert!(!backend
        .calls()
        .iter()
        .any(|c| matches!(c, BackendCall::Evaluate(_))));
}

#[test]
fn edit_during_pass_discards_it() {
    let backend = InMemoryBackend::new(fixture()).with_formula_result("SUM(amount)", json!(6));
    let mut session = ReportSession::new();
    let pending = filter::begin(&mut session, january()).unwrap();
    let rows = backend.filter(pending.range()).unwrap();
    filter::complete(&mut session, pending, rows);
    session.set_binding("total", Binding::formula("SUM(amount)"));

    let options = Default::default();
    let pass = preview::begin(&mut session).unwrap();
    let outcome = preview::resolve(&backend, &pass, &options).unwrap();
    session.set_binding("owner", Binding::fixed("Ops"));

    assert_eq!(preview::complete(&mut session, pass, outcome), Completion::Superseded);
    assert!(session.display().get("total").is_none());
}

#[test]
fn older_pass_is_discarded_after_newer_one() {
    let backend = InMemoryBackend::new(fixture());
    let mut session = ReportSession::new();
    let pending = filter::begin(&mut session, january()).unwrap();
    let rows = backend.filter(pending.range()).unwrap();
    filter::complete(&mut session, pending, rows);

    let options = Default::default();
    let first = preview::begin(&mut session).unwrap();
    let second = preview::begin(&mut session).unwrap();
    let first_outcome = preview::resolve(&backend, &first, &options).unwrap();
    let second_outcome = preview::resolve(&backend, &second, &options).unwrap();

    assert_eq!(preview::complete(&mut session, second, second_outcome), Completion::Applied);
    assert_eq!(preview::complete(&mut session, first, first_outcome), Completion::Superseded);
}

#[test]
fn evaluation_transport_failure_keeps_prior_display() {
    let backend = InMemoryBackend::new(fixture())
        .with_formula_result("SUM(amount)", json!(6))
        .with_settings(settings(&[("total", Binding::formula("SUM(amount)"))]));
    let mut p = pipeline(&backend);
    p.startup(Some(january())).unwrap();
    let before = p.session().display().clone();

    backend.fail(Endpoint::Evaluate);
    let err = p.render().unwrap_err();
    assert!(err.is_transport());
    assert_eq!(p.session().display(), &before);
}

// ---------------------------------------------------------------------------
// Interactive edits
// ---------------------------------------------------------------------------

#[test]
fn edits_are_validated_before_saving() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);

    assert!(p.set_binding("total", Binding::formula("  ")).unwrap_err().is_validation());
    assert!(p.set_binding(START_DATE, Binding::fixed("x")).unwrap_err().is_validation());
    assert!(p
        .set_binding("c", Binding::chart(ChartSpec::new("", "amount", ChartType::Bar)))
        .unwrap_err()
        .is_validation());
    assert!(p.session().store().is_empty());
}

#[test]
fn unknown_columns_rejected_once_columns_are_known() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);
    let chart = Binding::chart(ChartSpec::new("region", "amount", ChartType::Bar));

    // Without a column list there is nothing to check against.
    p.set_binding("c", chart.clone()).unwrap();

    assert_eq!(p.columns().unwrap(), vec!["amount", "category", "date"]);
    assert!(p.set_binding("c2", chart).unwrap_err().is_validation());
    assert!(p.session().binding("c2").is_none());
}

// ---------------------------------------------------------------------------
// Quick edit
// ---------------------------------------------------------------------------

#[test]
fn quick_edit_on_non_chart_is_rejected_without_mutation() {
    let backend = InMemoryBackend::new(fixture()).with_settings(settings(&[
        ("total", Binding::formula("SUM(amount)")),
        ("owner", Binding::fixed("Ops")),
    ]));
    let mut p = pipeline(&backend);
    p.startup(None).unwrap();
    let before = p.session().store().clone();
    backend.clear_calls();

    for variable in ["total", "owner", "missing"] {
        let edit = QuickEdit::new(variable, "category", "amount", ChartType::Bar);
        assert!(p.quick_edit(edit).unwrap_err().is_validation());
    }
    assert_eq!(p.session().store(), &before);
    assert!(backend.calls().is_empty());
}

#[test]
fn quick_edit_replaces_binding_and_regenerates() {
    let backend = InMemoryBackend::new(fixture())
        .with_settings(settings(&[("by_category", bar_by_category())]));
    let mut p = pipeline(&backend);
    p.startup(Some(january())).unwrap();
    backend.clear_calls();

    let edit = QuickEdit::new("by_category", "date", "amount", ChartType::Line)
        .with_title("Daily amount")
        .with_scale(Scale::Ultra);
    let artifact = p.quick_edit(edit).unwrap().unwrap();
    assert_eq!(artifact.variable, "by_category");

    assert_eq!(
        p.session().binding("by_category"),
        Some(&Binding::chart(
            ChartSpec::new("date", "amount", ChartType::Line).with_title("Daily amount")
        ))
    );
    assert_eq!(
        backend.calls(),
        vec![BackendCall::RenderChart {
            variable: "by_category".into(),
            scale: Scale::Ultra,
            rows: 4,
        }]
    );
    let (title, series) = chart_display(p.session().display().get("by_category"));
    assert_eq!(title, "Daily amount");
    assert_eq!(series.len(), 3);
}

#[test]
fn failed_regeneration_marks_variable() {
    let backend = InMemoryBackend::new(fixture())
        .with_settings(settings(&[("by_category", bar_by_category())]));
    let mut p = pipeline(&backend);
    p.startup(Some(january())).unwrap();
    backend.reject_chart("by_category", "cannot draw");

    let edit = QuickEdit::new("by_category", "category", "amount", ChartType::Pie);
    assert!(p.quick_edit(edit).is_err());
    // The edit itself is kept; only the artifact failed.
    assert_eq!(
        p.session().binding("by_category"),
        Some(&Binding::chart(ChartSpec::new("category", "amount", ChartType::Pie)))
    );
    assert!(p
        .session()
        .display()
        .get("by_category")
        .is_some_and(VariableDisplay::is_error));
}

#[test]
fn superseded_quick_edit_result_is_dropped() {
    let backend = InMemoryBackend::new(fixture());
    let mut session = ReportSession::new();
    session.set_binding("by_category", bar_by_category());
    let options = Default::default();

    let first = quick_edit::begin(
        &mut session,
        QuickEdit::new("by_category", "category", "amount", ChartType::Pie),
        &options,
    )
    .unwrap();
    let second = quick_edit::begin(
        &mut session,
        QuickEdit::new("by_category", "date", "amount", ChartType::Line),
        &options,
    )
    .unwrap();

    let first_result = backend.render_chart(first.request());
    let second_result = backend.render_chart(second.request());
    assert_eq!(
        quick_edit::complete(&mut session, second, second_result).unwrap(),
        Completion::Applied
    );
    assert_eq!(
        quick_edit::complete(&mut session, first, first_result).unwrap(),
        Completion::Superseded
    );
    let (_, series) = chart_display(session.display().get("by_category"));
    assert!(matches!(series, docbind_chart::ChartSeries::Line(_)));
}

#[test]
fn quick_edit_from_an_older_dataset_does_not_overwrite_a_newer_pass() {
    let backend = InMemoryBackend::new(fixture());
    let mut session = ReportSession::new();
    session.set_binding("by_category", bar_by_category());
    let options = Default::default();

    let pending = filter::begin(&mut session, january()).unwrap();
    let rows = backend.filter(pending.range()).unwrap();
    filter::complete(&mut session, pending, rows);

    let edit = quick_edit::begin(
        &mut session,
        QuickEdit::new("by_category", "category", "amount", ChartType::Bar),
        &options,
    )
    .unwrap();
    let edit_result = backend.render_chart(edit.request());

    let pending = filter::begin(&mut session, DateRange::new("2024-02-01", "2024-02-29")).unwrap();
    let rows = backend.filter(pending.range()).unwrap();
    assert_eq!(filter::complete(&mut session, pending, rows), Completion::Applied);
    let pass = preview::begin(&mut session).unwrap();
    let outcome = preview::resolve(&backend, &pass, &options).unwrap();
    assert_eq!(preview::complete(&mut session, pass, outcome), Completion::Applied);

    assert_eq!(
        quick_edit::complete(&mut session, edit, edit_result).unwrap(),
        Completion::Superseded
    );
    let (_, series) = chart_display(session.display().get("by_category"));
    assert_eq!(series.grouped().unwrap().labels, vec!["c"]);
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[test]
fn settings_round_trip_between_sessions() {
    let backend = InMemoryBackend::new(fixture());
    let mut first = pipeline(&backend);
    first.set_binding("owner", Binding::fixed("王小明")).unwrap();
    first.set_binding("total", Binding::formula("SUM(amount)")).unwrap();
    first
        .set_binding(
            "trend",
            Binding::chart(ChartSpec::new("date", "amount", ChartType::Line).with_title("")),
        )
        .unwrap();
    first.save_settings().unwrap();

    let mut second = pipeline(&backend);
    assert!(second.load_settings().unwrap());
    assert_eq!(second.session().store(), first.session().store());
}

#[test]
fn startup_without_settings_does_not_filter() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);

    let report = p.startup(Some(january())).unwrap();
    assert!(!report.settings_loaded);
    assert!(!report.filtered);
    assert_eq!(backend.calls(), vec![BackendCall::LoadSettings]);
}

#[test]
fn settings_transport_failure_is_an_error() {
    let backend = InMemoryBackend::new(fixture());
    backend.fail(Endpoint::Settings);
    let mut p = pipeline(&backend);
    assert!(p.startup(None).unwrap_err().is_transport());
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_requires_a_filtered_dataset() {
    let backend = InMemoryBackend::new(fixture());
    let p = pipeline(&backend);
    assert!(p.export(Some("report")).is_err());
    assert!(backend.calls().is_empty());
}

#[test]
fn export_normalizes_filename() {
    let backend = InMemoryBackend::new(fixture());
    let mut p = pipeline(&backend);
    p.submit_filter(january()).unwrap();

    let doc = p.export(Some("out/週報")).unwrap();
    assert_eq!(doc.filename, "週報.docx");
    assert!(!doc.bytes.is_empty());

    let doc = p.export(None).unwrap();
    assert_eq!(doc.filename, "weekly_report.docx");
}
