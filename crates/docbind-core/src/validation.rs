//! Input validation for filter submissions and binding edits.
//!
//! Every check here runs before any state is touched or any request is
//! sent; a failure leaves the session exactly as it was.

use crate::binding::{is_reserved, Binding, ChartSpec};
use crate::dataset::DateRange;
use crate::dates::parse_date_str;

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} date is required")]
    MissingDate(&'static str),

    #[error("{which} date '{value}' is not a valid date")]
    InvalidDate { which: &'static str, value: String },

    #[error("variable name is required")]
    MissingVariableName,

    #[error("'{0}' is set by the date filter and cannot be edited")]
    ReservedVariable(String),

    #[error("formula for '{0}' is empty")]
    MissingFormula(String),

    #[error("chart '{variable}' is missing its {field}")]
    IncompleteChart {
        variable: String,
        field: &'static str,
    },

    #[error("chart '{variable}' uses unsupported chart type '{chart_type}'")]
    UnknownChartType {
        variable: String,
        chart_type: String,
    },

    #[error("chart '{variable}' references unknown column '{field}'")]
    UnknownColumn { variable: String, field: String },

    #[error("'{0}' has no binding")]
    Unbound(String),

    #[error("'{variable}' is bound to a {actual} binding, not a chart")]
    NotAChart {
        variable: String,
        actual: &'static str,
    },
}

/// Both ends of a filter range must be present and parse as dates.
pub fn validate_range(range: &DateRange) -> Result<(), ValidationError> {
    check_date("start", &range.start)?;
    check_date("end", &range.end)
}

fn check_date(which: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingDate(which));
    }
    if parse_date_str(value).is_none() {
        return Err(ValidationError::InvalidDate {
            which,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A variable edited interactively must have a name and must not be one
/// of the reserved date variables.
pub fn validate_editable(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingVariableName);
    }
    if is_reserved(name) {
        return Err(ValidationError::ReservedVariable(name.to_string()));
    }
    Ok(())
}

/// Validates a chart spec. When `columns` is known, both axes must name
/// one of them.
pub fn validate_chart(
    variable: &str,
    spec: &ChartSpec,
    columns: Option<&[String]>,
) -> Result<(), ValidationError> {
    let incomplete = |field| ValidationError::IncompleteChart {
        variable: variable.to_string(),
        field,
    };
    if spec.x_field.trim().is_empty() {
        return Err(incomplete("x field"));
    }
    if spec.y_field.trim().is_empty() {
        return Err(incomplete("y field"));
    }
    if !spec.chart_type.is_builtin() {
        return Err(ValidationError::UnknownChartType {
            variable: variable.to_string(),
            chart_type: spec.chart_type.to_string(),
        });
    }
    if let Some(columns) = columns {
        for field in [&spec.x_field, &spec.y_field] {
            if !columns.iter().any(|c| c == field) {
                return Err(ValidationError::UnknownColumn {
                    variable: variable.to_string(),
                    field: field.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validates an interactive binding edit.
pub fn validate_binding(
    name: &str,
    binding: &Binding,
    columns: Option<&[String]>,
) -> Result<(), ValidationError> {
    validate_editable(name)?;
    match binding {
        Binding::Fixed { .. } => Ok(()),
        Binding::Formula { expression } => {
            if expression.trim().is_empty() {
                Err(ValidationError::MissingFormula(name.to_string()))
            } else {
                Ok(())
            }
        }
        Binding::Chart(spec) => validate_chart(name, spec, columns),
    }
}

/// Quick-edit is only allowed on a variable that already holds a chart.
pub fn require_chart<'a>(
    name: &str,
    current: Option<&'a Binding>,
) -> Result<&'a ChartSpec, ValidationError> {
    match current {
        None => Err(ValidationError::Unbound(name.to_string())),
        Some(Binding::Chart(spec)) => Ok(spec),
        Some(other) => Err(ValidationError::NotAChart {
            variable: name.to_string(),
            actual: other.type_name(),
        }),
    }
}
