//! Output formatting helpers for the `docbind` CLI.

use std::env;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;

use docbind_core::{Binding, BindingStore};
use docbind_pipeline::{DisplayState, VariableDisplay};

const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78);
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80);
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff);

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Determines if ANSI color codes should be used.
///
/// `NO_COLOR` and `CLICOLOR=0` disable color, `CLICOLOR_FORCE` forces it,
/// otherwise color is used only when stdout is a terminal.
pub fn supports_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").as_deref() == Ok("0") {
        return false;
    }
    if env::var("TERM").as_deref() == Ok("dumb") {
        return false;
    }
    if env::var_os("CLICOLOR_FORCE").is_some() {
        return true;
    }
    io::stdout().is_terminal()
}

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_accent(s: &str) -> String {
    color_str(s, ACCENT)
}

/// A table cell and an optional styling applied after padding.
pub struct Cell {
    text: String,
    style: Option<fn(&str) -> String>,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: fn(&str) -> String) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
        }
    }

    fn width(&self) -> usize {
        self.text.chars().count()
    }
}

/// Print a simple table with headers and rows.
///
/// Column widths are computed from the unstyled text, so colored cells
/// still line up.
pub fn output_table(headers: &[&str], rows: &[Vec<Cell>]) {
    if rows.is_empty() {
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.width());
            }
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            let _ = write!(handle, "  ");
        }
        let _ = write!(handle, "{:<width$}", header, width = widths[i]);
    }
    let _ = writeln!(handle);

    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            let _ = write!(handle, "  ");
        }
        let _ = write!(handle, "{}", "-".repeat(*width));
    }
    let _ = writeln!(handle);

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                let _ = write!(handle, "  ");
            }
            let last = i + 1 == row.len();
            let padded = match widths.get(i) {
                Some(width) if !last => {
                    let pad = width.saturating_sub(cell.width());
                    format!("{}{}", cell.text, " ".repeat(pad))
                }
                _ => cell.text.clone(),
            };
            match cell.style {
                Some(style) => {
                    let _ = write!(handle, "{}", style(&padded));
                }
                None => {
                    let _ = write!(handle, "{}", padded);
                }
            }
        }
        let _ = writeln!(handle);
    }
}

/// One-line description of a binding's content.
pub fn binding_detail(binding: &Binding) -> String {
    match binding {
        Binding::Fixed { value } => value.clone(),
        Binding::Formula { expression } => expression.clone(),
        Binding::Chart(spec) => {
            let title = match &spec.title {
                None => String::new(),
                Some(t) => format!(" title={t:?}"),
            };
            format!("{} x={} y={}{title}", spec.chart_type, spec.x_field, spec.y_field)
        }
    }
}

/// Print every binding as a table.
pub fn output_bindings(store: &BindingStore) {
    let rows: Vec<Vec<Cell>> = store
        .iter()
        .map(|(name, binding)| {
            vec![
                Cell::plain(name),
                Cell::styled(binding.type_name(), render_muted),
                Cell::plain(binding_detail(binding)),
            ]
        })
        .collect();
    output_table(&["VARIABLE", "TYPE", "BINDING"], &rows);
}

/// Print the preview display state as a table. Failed variables are red.
pub fn output_display(display: &DisplayState) {
    let rows: Vec<Vec<Cell>> = display
        .iter()
        .map(|(name, entry)| {
            let value = match entry {
                VariableDisplay::Error { .. } => Cell::styled(entry.summary(), render_fail),
                VariableDisplay::Chart { .. } => Cell::styled(entry.summary(), render_accent),
                VariableDisplay::Text { .. } => Cell::plain(entry.summary()),
            };
            vec![Cell::plain(name), value]
        })
        .collect();
    output_table(&["VARIABLE", "VALUE"], &rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbind_core::{ChartSpec, ChartType};

    #[test]
    fn chart_detail_shows_title_only_when_set() {
        let spec = ChartSpec::new("date", "amount", ChartType::Bar);
        assert_eq!(binding_detail(&Binding::chart(spec.clone())), "bar x=date y=amount");
        assert_eq!(
            binding_detail(&Binding::chart(spec.with_title(""))),
            "bar x=date y=amount title=\"\""
        );
    }
}
