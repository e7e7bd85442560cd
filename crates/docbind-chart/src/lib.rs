//! Chart aggregation for docbind.
//!
//! Turns a dataset slice and a chart binding into plot-ready series:
//! per-day sums for line charts, per-value sums for bar and pie charts,
//! and a raw numeric sample for histograms. Series are derived on every
//! render and never persisted.

pub mod aggregate;
pub mod coerce;
pub mod series;

pub use aggregate::{aggregate, aggregate_dataset, AggregateOptions, ChartError};
pub use series::{ChartSeries, GroupedSeries};
