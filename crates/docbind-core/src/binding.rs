//! Binding -- the resolution strategy attached to a report variable.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::ChartType;

/// Reserved variable holding the start of the last applied date range.
pub const START_DATE: &str = "start_date";

/// Reserved variable holding the end of the last applied date range.
pub const END_DATE: &str = "end_date";

/// Returns `true` for the variable names only the date filter may write.
pub fn is_reserved(name: &str) -> bool {
    name == START_DATE || name == END_DATE
}

/// Variable name -> binding, ordered by name.
pub type BindingMap = BTreeMap<String, Binding>;

/// How a report variable is resolved.
///
/// Serialized with an internal `type` tag:
///
/// ```json
/// {"type": "fixed", "value": "2024-01-01"}
/// {"type": "formula", "expression": "SUM(amount)"}
/// {"type": "chart", "xField": "date", "yField": "amount", "chartType": "line"}
/// ```
///
/// Deserialization also accepts the older bare-string form, see
/// [`Binding::from_legacy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Binding {
    /// Literal text, displayed verbatim.
    Fixed { value: String },
    /// Opaque expression evaluated by the backend.
    Formula { expression: String },
    /// Chart drawn from two dataset columns.
    Chart(ChartSpec),
}

/// The fields of a chart binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub x_field: String,
    pub y_field: String,
    pub chart_type: ChartType,
    /// `None` falls back to the variable name; `Some("")` is a blank title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ChartSpec {
    pub fn new(
        x_field: impl Into<String>,
        y_field: impl Into<String>,
        chart_type: ChartType,
    ) -> Self {
        Self {
            x_field: x_field.into(),
            y_field: y_field.into(),
            chart_type,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The title to draw for `variable`.
    pub fn resolved_title<'a>(&'a self, variable: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(variable)
    }
}

impl Binding {
    pub fn fixed(value: impl Into<String>) -> Self {
        Self::Fixed {
            value: value.into(),
        }
    }

    pub fn formula(expression: impl Into<String>) -> Self {
        Self::Formula {
            expression: expression.into(),
        }
    }

    pub fn chart(spec: ChartSpec) -> Self {
        Self::Chart(spec)
    }

    /// The wire tag of this binding.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Formula { .. } => "formula",
            Self::Chart(_) => "chart",
        }
    }

    /// Returns the chart fields if this is a chart binding.
    pub fn as_chart(&self) -> Option<&ChartSpec> {
        match self {
            Self::Chart(spec) => Some(spec),
            Self::Fixed { .. } | Self::Formula { .. } => None,
        }
    }

    /// Interprets a bare-string settings entry.
    ///
    /// A value wrapped in single quotes is literal text; anything else is
    /// a formula expression.
    pub fn from_legacy(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
        {
            Some(literal) => Self::fixed(literal),
            None => Self::formula(trimmed),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedBinding {
    Fixed { value: String },
    Formula { expression: String },
    Chart(ChartSpec),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BindingRepr {
    Legacy(String),
    Tagged(TaggedBinding),
}

impl<'de> Deserialize<'de> for Binding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match BindingRepr::deserialize(deserializer)? {
            BindingRepr::Legacy(raw) => Self::from_legacy(&raw),
            BindingRepr::Tagged(TaggedBinding::Fixed { value }) => Self::Fixed { value },
            BindingRepr::Tagged(TaggedBinding::Formula { expression }) => {
                Self::Formula { expression }
            }
            BindingRepr::Tagged(TaggedBinding::Chart(spec)) => Self::Chart(spec),
        })
    }
}
