//! `{{ name }}` placeholder scanning for report templates.

use std::collections::{BTreeSet, HashMap};

/// Extract every placeholder name referenced in `text`.
///
/// Whitespace inside the braces is ignored and names may contain any
/// characters except `}`. The result is de-duplicated and sorted.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut vars = BTreeSet::new();
    for (_, name) in placeholders(text) {
        vars.insert(name.to_string());
    }
    vars.into_iter().collect()
}

/// Substitute placeholders with the given values.
/// Unresolved placeholders are left as-is.
pub fn fill_template(text: &str, values: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for (span, name) in placeholders(text) {
        if let Some(value) = values.get(name) {
            result.push_str(&text[last..span.0]);
            result.push_str(value);
            last = span.1;
        }
    }
    result.push_str(&text[last..]);
    result
}

/// Yields `((start, end), trimmed_name)` for each `{{ ... }}` in `text`,
/// where `start..end` covers the braces.
fn placeholders(text: &str) -> Vec<((usize, usize), &str)> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(open) = text[pos..].find("{{") {
        let start = pos + open;
        let inner_start = start + 2;
        let Some(close) = text[inner_start..].find("}}") else {
            break;
        };
        let inner_end = inner_start + close;
        let name = text[inner_start..inner_end].trim();
        if name.is_empty() || name.contains('{') {
            pos = start + 1;
            continue;
        }
        found.push(((start, inner_end + 2), name));
        pos = inner_end + 2;
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_trimmed_unique_names() {
        let text = "Sales from {{start_date}} to {{ end_date }}: {{ total }}.\n{{total}} again";
        assert_eq!(
            extract_variables(text),
            vec!["end_date", "start_date", "total"]
        );
    }

    #[test]
    fn names_may_be_non_ascii() {
        assert_eq!(extract_variables("本月銷售總額為 {{ 銷售總額 }}"), vec!["銷售總額"]);
    }

    #[test]
    fn ignores_empty_and_unclosed() {
        assert_eq!(extract_variables("{{}} {{  }} {{ open"), Vec::<String>::new());
        assert_eq!(extract_variables("{{{x}}"), vec!["x"]);
    }

    #[test]
    fn fill_leaves_unresolved() {
        let mut values = HashMap::new();
        values.insert("total".to_string(), "42".to_string());
        assert_eq!(
            fill_template("Total: {{ total }}, growth: {{growth}}", &values),
            "Total: 42, growth: {{growth}}"
        );
    }
}
