use serde_json::Value;

pub use crate::types::OutputFormat;

/// Output formatting interface
pub trait Formatter {
    fn format(&self, data: &Value) -> anyhow::Result<String>;
}

pub struct JsonFormatter;
pub struct YamlFormatter;
pub struct TableFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, data: &Value) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

impl Formatter for YamlFormatter {
    fn format(&self, data: &Value) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(data)?)
    }
}

impl Formatter for TableFormatter {
    fn format(&self, data: &Value) -> anyhow::Result<String> {
        match data {
            Value::Array(items) => {
                if items.is_empty() {
                    return Ok("No data available".to_string());
                }

                // Columns keep the key order of the first row
                let headers: Vec<String> = match items.first() {
                    Some(Value::Object(first)) => first.keys().cloned().collect(),
                    _ => Vec::new(),
                };
                let rows: Vec<Vec<String>> = items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|obj| {
                        headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect()
                    })
                    .collect();

                let widths: Vec<usize> = headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| {
                        rows.iter()
                            .map(|r| r[i].len())
                            .chain(std::iter::once(h.len()))
                            .max()
                            .unwrap_or(0)
                    })
                    .collect();
                let line = |cells: &[String]| {
                    cells
                        .iter()
                        .zip(&widths)
                        .map(|(c, w)| format!("{:<width$}", c, width = *w))
                        .collect::<Vec<_>>()
                        .join(" | ")
                        .trim_end()
                        .to_string()
                };

                let mut table = String::new();
                let header = line(&headers);
                table.push_str(&format!("{}\n", header));
                table.push_str(&format!("{}\n", "-".repeat(header.len())));
                for row in &rows {
                    table.push_str(&format!("{}\n", line(row)));
                }
                Ok(table)
            }
            Value::Object(obj) => {
                let mut table = String::new();
                table.push_str("Key | Value\n");
                table.push_str("--- | -----\n");
                for (key, value) in obj {
                    table.push_str(&format!("{} | {}\n", key, format_value(value)));
                }
                Ok(table)
            }
            _ => Ok(format!("{}", data)),
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(items) if items.is_empty() => "-".to_string(),
        Value::Array(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(","),
        _ => value.to_string(),
    }
}

/// Get formatter for the specified output format
pub fn get_formatter(format: &OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Yaml => Box::new(YamlFormatter),
        OutputFormat::Table => Box::new(TableFormatter),
    }
}

/// Format and print data in the specified format
pub fn print_output(data: &Value, format: &OutputFormat) -> anyhow::Result<()> {
    let formatter = get_formatter(format);
    let output = formatter.format(data)?;
    println!("{}", output.trim_end());
    Ok(())
}

/// Output arguments shared by reporting commands
#[derive(clap::Args, Clone, Debug)]
pub struct OutputArgs {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "json")]
    pub output: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_aligns_columns_in_row_key_order() {
        let data = json!([
            {"name": "app-base-infra", "dependencies": []},
            {"name": "app-db", "dependencies": ["app-base-infra"]},
        ]);
        let table = TableFormatter.format(&data).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        // serde_json maps are sorted without preserve_order
        assert_eq!(lines[0], "dependencies   | name");
        assert_eq!(lines[2], "-              | app-base-infra");
        assert_eq!(lines[3], "app-base-infra | app-db");
    }

    #[test]
    fn empty_list_has_placeholder() {
        assert_eq!(
            TableFormatter.format(&json!([])).unwrap(),
            "No data available"
        );
    }

    #[test]
    fn yaml_and_json_round_out_the_set() {
        let data = json!({"stack": "app-db"});
        assert!(JsonFormatter.format(&data).unwrap().contains("\"stack\": \"app-db\""));
        assert_eq!(YamlFormatter.format(&data).unwrap(), "stack: app-db\n");
    }
}
