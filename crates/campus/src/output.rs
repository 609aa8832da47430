//! Rendering for `--output`.
//!
//! Tables come from `tabled` row types, json and yaml serialize the domain
//! values directly, and `plain` prints one line per item for scripts.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use campus_core::GroupStatus;

use crate::cli::{ColorMode, OutputFormat};

// ── Color ────────────────────────────────────────────────────────────

/// `--color auto` colors only an interactive stdout, and honors `NO_COLOR`.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        ColorMode::Always => true,
        ColorMode::Never => false,
    }
}

/// `ON` / `OFF` for a unit.
pub fn power_label(on: bool, color: bool) -> String {
    match (on, color) {
        (true, true) => "ON".green().bold().to_string(),
        (false, true) => "OFF".dimmed().to_string(),
        (true, false) => "ON".into(),
        (false, false) => "OFF".into(),
    }
}

pub fn status_label(status: GroupStatus, color: bool) -> String {
    let text = status.to_string();
    if !color {
        return text;
    }
    match status {
        GroupStatus::On => text.green().bold().to_string(),
        GroupStatus::Partial => text.yellow().to_string(),
        GroupStatus::Off => text.dimmed().to_string(),
    }
}

// ── Rendering ────────────────────────────────────────────────────────

/// Render a collection. `to_row` builds the table row for an item and
/// `plain_line` its line in `plain` output.
pub fn render_list<T, R>(
    format: &OutputFormat,
    items: &[T],
    to_row: impl Fn(&T) -> R,
    plain_line: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    if let Some(out) = render_structured(format, items) {
        return out;
    }
    if matches!(format, OutputFormat::Plain) {
        return items.iter().map(plain_line).collect::<Vec<_>>().join("\n");
    }
    let rows: Vec<R> = items.iter().map(to_row).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render one value. `detail` is the human-readable view used for `table`.
pub fn render_single<T>(
    format: &OutputFormat,
    value: &T,
    detail: impl Fn(&T) -> String,
    plain_line: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    render_structured(format, value).unwrap_or_else(|| match format {
        OutputFormat::Plain => plain_line(value),
        _ => detail(value),
    })
}

/// Write to stdout unless `--quiet` or there is nothing to show.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let _ = writeln!(io::stdout().lock(), "{output}");
}

/// JSON and YAML output; `None` for the human formats.
fn render_structured<T: serde::Serialize + ?Sized>(
    format: &OutputFormat,
    value: &T,
) -> Option<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        OutputFormat::JsonCompact => serde_json::to_string(value).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        OutputFormat::Table | OutputFormat::Plain => return None,
    };
    Some(rendered.unwrap_or_else(|e| format!("error: cannot serialize output: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        id: &'static str,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
    }

    fn rendered(format: &OutputFormat) -> String {
        let items = [Item { id: "a1" }, Item { id: "b2" }];
        render_list(
            format,
            &items,
            |i| Row { id: i.id.into() },
            |i| i.id.to_owned(),
        )
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        assert_eq!(rendered(&OutputFormat::Plain), "a1\nb2");
    }

    #[test]
    fn compact_json_is_single_line() {
        assert_eq!(
            rendered(&OutputFormat::JsonCompact),
            r#"[{"id":"a1"},{"id":"b2"}]"#
        );
    }

    #[test]
    fn table_has_header() {
        let table = rendered(&OutputFormat::Table);
        assert!(table.contains("ID"));
        assert!(table.contains("b2"));
    }

    #[test]
    fn labels_without_color() {
        assert_eq!(power_label(true, false), "ON");
        assert_eq!(status_label(GroupStatus::Partial, false), "partial");
    }
}
