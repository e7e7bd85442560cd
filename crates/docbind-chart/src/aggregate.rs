//! Grouping and bucketing per chart type.

use docbind_core::dataset::{Dataset, Record};
use docbind_core::dates::{canonical_date_key, INVALID_DATE_KEY};
use docbind_core::{ChartSpec, ChartType, InvalidDatePolicy};

use crate::coerce::{raw_key, sum_contribution, to_number};
use crate::series::{ChartSeries, GroupSums, GroupedSeries};

/// Errors that can occur while aggregating a chart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    #[error("unsupported chart type: {0}")]
    UnsupportedChartType(String),
}

/// Knobs that change aggregation output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// What line charts do with x values that are not dates.
    pub invalid_dates: InvalidDatePolicy,
}

/// Aggregate `rows` for a chart of `chart_type` over `x_field`/`y_field`.
///
/// `rows` is expected to hold only records where both fields are defined;
/// a missing y still counts as zero for the summing chart types.
///
/// # Errors
///
/// Returns [`ChartError::UnsupportedChartType`] for `ChartType::Other`,
/// before any row is read.
pub fn aggregate<'a, I>(
    rows: I,
    x_field: &str,
    y_field: &str,
    chart_type: &ChartType,
    options: AggregateOptions,
) -> Result<ChartSeries, ChartError>
where
    I: IntoIterator<Item = &'a Record>,
{
    match chart_type {
        ChartType::Line => Ok(ChartSeries::Line(line_series(
            rows,
            x_field,
            y_field,
            options.invalid_dates,
        ))),
        ChartType::Bar => Ok(ChartSeries::Bar(value_groups(rows, x_field, y_field))),
        ChartType::Pie => Ok(ChartSeries::Pie(value_groups(rows, x_field, y_field))),
        ChartType::Hist => Ok(ChartSeries::Hist {
            sample: rows
                .into_iter()
                .filter_map(|r| r.get(y_field).and_then(to_number))
                .collect(),
        }),
        ChartType::Other(name) => Err(ChartError::UnsupportedChartType(name.clone())),
    }
}

/// Select the rows where both axes are defined, then [`aggregate`].
pub fn aggregate_dataset(
    dataset: &Dataset,
    spec: &ChartSpec,
    options: AggregateOptions,
) -> Result<ChartSeries, ChartError> {
    aggregate(
        dataset.rows_with(&[spec.x_field.as_str(), spec.y_field.as_str()]),
        &spec.x_field,
        &spec.y_field,
        &spec.chart_type,
        options,
    )
}

fn line_series<'a, I>(
    rows: I,
    x_field: &str,
    y_field: &str,
    invalid_dates: InvalidDatePolicy,
) -> GroupedSeries
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut sums = GroupSums::default();
    for row in rows {
        let key = match row.get(x_field).and_then(canonical_date_key) {
            Some(key) => key,
            None => match invalid_dates {
                InvalidDatePolicy::Group => INVALID_DATE_KEY.to_string(),
                InvalidDatePolicy::Drop => continue,
            },
        };
        sums.add(key, sum_contribution(row.get(y_field)));
    }
    let mut series = sums.finish();
    series.sort_by_label();
    series
}

fn value_groups<'a, I>(rows: I, x_field: &str, y_field: &str) -> GroupedSeries
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut sums = GroupSums::default();
    for row in rows {
        let Some(x) = row.get(x_field) else {
            continue;
        };
        sums.add(raw_key(x), sum_contribution(row.get(y_field)));
    }
    sums.finish()
}
