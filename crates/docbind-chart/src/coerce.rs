//! Numeric coercion and group keys for raw dataset values.

use serde_json::Value;

/// Standard numeric parse of a raw value.
///
/// Numbers pass through, strings are parsed after trimming, booleans count
/// as `1`/`0`. Anything else, including non-finite results, is `None`.
/// A blank string is not a number: it adds nothing to a sum and is left
/// out of a histogram sample.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Contribution of a value to a sum: non-numeric values count as zero.
///
/// This silently lowers totals when the column holds dirty data.
pub fn sum_contribution(value: Option<&Value>) -> f64 {
    value.and_then(to_number).unwrap_or(0.0)
}

/// The grouping key for a raw x value, with no normalization.
pub fn raw_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(to_number(&json!(3)), Some(3.0));
        assert_eq!(to_number(&json!(2.5)), Some(2.5));
        assert_eq!(to_number(&json!(" 4.25 ")), Some(4.25));
        assert_eq!(to_number(&json!("-1e3")), Some(-1000.0));
        assert_eq!(to_number(&json!(true)), Some(1.0));
    }

    #[test]
    fn non_numeric_values_fail() {
        assert_eq!(to_number(&json!("x")), None);
        assert_eq!(to_number(&json!("NaN")), None);
        assert_eq!(to_number(&json!("inf")), None);
        assert_eq!(to_number(&json!(null)), None);
        assert_eq!(to_number(&json!([1])), None);
    }

    #[test]
    fn blank_strings_are_not_numbers() {
        assert_eq!(to_number(&json!("")), None);
        assert_eq!(to_number(&json!("   ")), None);
        assert_eq!(sum_contribution(Some(&json!(""))), 0.0);
    }

    #[test]
    fn dirty_values_contribute_zero() {
        assert_eq!(sum_contribution(Some(&json!("n/a"))), 0.0);
        assert_eq!(sum_contribution(None), 0.0);
        assert_eq!(sum_contribution(Some(&json!("7"))), 7.0);
    }

    #[test]
    fn raw_keys_are_not_normalized() {
        assert_eq!(raw_key(&json!("North")), "North");
        assert_eq!(raw_key(&json!(2024)), "2024");
        assert_eq!(raw_key(&json!("2024-01-01T23:00")), "2024-01-01T23:00");
    }
}
