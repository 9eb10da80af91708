use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(map) => {
            let headers = ["key", "value"];
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let rows = entries
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render_entity_table(&headers, &rows, table_options()))
        }
        scalar => {
            let headers = ["value"];
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render_entity_table(&headers, &rows, table_options()))
        }
    }
}

/// Records become rows; the column set is the union of their keys, with
/// `id` first.
fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let headers = ["value"];
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&headers, &rows, table_options());
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    headers.sort_by(|a, b| (a != "id", a).cmp(&(b != "id", b)));

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| {
                    map.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_refs, &rows, table_options())
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use psra_dispatch::DispatcherSummary;
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        status: &'static str,
        id: &'static str,
        assigned_volunteer_id: Option<&'static str>,
    }

    #[test]
    fn json_render_is_valid_json() {
        let summary = DispatcherSummary {
            new: 1,
            approved: 2,
            in_progress: 0,
            closed: 3,
            canceled: 0,
            total_incidents: 6,
            total_volunteers: 4,
        };
        let out = render(&summary, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["totalIncidents"], 6);
        assert_eq!(parsed["closed"], 3);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let rows = vec![Row {
            status: "new",
            id: "incident_1_1_abcdef",
            assigned_volunteer_id: None,
        }];
        let out = render(&rows, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
        assert!(out.contains("\"assignedVolunteerId\":null"));
    }

    #[test]
    fn table_render_puts_id_first() {
        let rows = vec![
            Row {
                status: "approved",
                id: "incident_1_1_abcdef",
                assigned_volunteer_id: None,
            },
            Row {
                status: "in_progress",
                id: "incident_2_1_ghijkl",
                assigned_volunteer_id: Some("vol_7"),
            },
        ];
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id"));
        assert!(lines[0].contains("assignedVolunteerId"));
        assert!(lines[2].contains("approved"));
        assert!(lines[2].contains('-'));
        assert!(lines[3].contains("vol_7"));
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let rows: Vec<Row> = Vec::new();
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        assert_eq!(out, "(no rows)");
    }
}
