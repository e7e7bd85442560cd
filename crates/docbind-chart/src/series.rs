//! Plot-ready chart series.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parallel label/value arrays, one entry per group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl GroupedSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The summed value for `label`, if that group exists.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Sorts groups by label, ascending.
    pub(crate) fn sort_by_label(&mut self) {
        let mut pairs: Vec<(String, f64)> = self
            .labels
            .drain(..)
            .zip(self.values.drain(..))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        for (label, value) in pairs {
            self.labels.push(label);
            self.values.push(value);
        }
    }
}

/// Sums values per key, keeping groups in first-seen order.
#[derive(Debug, Default)]
pub(crate) struct GroupSums {
    index: HashMap<String, usize>,
    series: GroupedSeries,
}

impl GroupSums {
    pub(crate) fn add(&mut self, key: String, value: f64) {
        match self.index.get(&key) {
            Some(&i) => self.series.values[i] += value,
            None => {
                self.index.insert(key.clone(), self.series.labels.len());
                self.series.labels.push(key);
                self.series.values.push(value);
            }
        }
    }

    pub(crate) fn finish(self) -> GroupedSeries {
        self.series
    }
}

/// Aggregated data for one chart, tagged by chart kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartSeries {
    /// Per-day sums, sorted by canonical date.
    Line(GroupedSeries),
    /// Per-value sums, first-seen order.
    Bar(GroupedSeries),
    /// Per-value sums, first-seen order.
    Pie(GroupedSeries),
    /// Raw numeric sample; binning is left to the renderer.
    Hist { sample: Vec<f64> },
}

impl ChartSeries {
    pub fn grouped(&self) -> Option<&GroupedSeries> {
        match self {
            Self::Line(g) | Self::Bar(g) | Self::Pie(g) => Some(g),
            Self::Hist { .. } => None,
        }
    }

    pub fn sample(&self) -> Option<&[f64]> {
        match self {
            Self::Hist { sample } => Some(sample),
            Self::Line(_) | Self::Bar(_) | Self::Pie(_) => None,
        }
    }

    /// Number of groups, or sample size for histograms.
    pub fn len(&self) -> usize {
        match self {
            Self::Line(g) | Self::Bar(g) | Self::Pie(g) => g.len(),
            Self::Hist { sample } => sample.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
