//! Per-variable display state produced by render passes.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use docbind_backend::ChartArtifact;
use docbind_chart::ChartSeries;

/// What the preview shows for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum VariableDisplay {
    Text {
        text: String,
    },
    Error {
        message: String,
    },
    /// A chart replaces the scalar display of its variable.
    Chart {
        title: String,
        series: ChartSeries,
        artifact: ChartArtifact,
    },
}

impl VariableDisplay {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Short, single-line form used by text output.
    pub fn summary(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Error { message } => message.clone(),
            Self::Chart {
                title,
                series,
                artifact,
            } => format!("[chart '{title}', {} points] {}", series.len(), artifact.location),
        }
    }

    /// Interprets one evaluation result. Strings starting with
    /// `error_prefix` mark the variable as failed.
    pub fn from_evaluation(value: &Value, error_prefix: &str) -> Self {
        match value {
            Value::String(s) if !error_prefix.is_empty() && s.starts_with(error_prefix) => {
                Self::error(s.clone())
            }
            other => Self::text(format_scalar(other)),
        }
    }
}

/// Renders a backend scalar for display.
///
/// Integral numbers drop the trailing `.0`, `null` is empty.
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        return format!("{}", f as i64);
                    }
                }
            }
            n.to_string()
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Variable name -> display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisplayState {
    entries: BTreeMap<String, VariableDisplay>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&VariableDisplay> {
        self.entries.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, display: VariableDisplay) {
        self.entries.insert(name.into(), display);
    }

    pub fn remove(&mut self, name: &str) -> Option<VariableDisplay> {
        self.entries.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableDisplay)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops entries whose variable is no longer bound.
    pub(crate) fn retain_bound<F>(&mut self, mut is_bound: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.entries.retain(|name, _| is_bound(name));
    }

    /// Display values that can be substituted into template text.
    pub fn text_values(&self) -> std::collections::HashMap<String, String> {
        self.entries
            .iter()
            .filter_map(|(name, display)| match display {
                VariableDisplay::Text { text } => Some((name.clone(), text.clone())),
                VariableDisplay::Error { .. } | VariableDisplay::Chart { .. } => None,
            })
            .collect()
    }
}
