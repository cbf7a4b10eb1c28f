pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};
use std::error::Error;
use std::io::{self, Write};

/// Dispatch output to the appropriate formatter. Write failures (a closed
/// pipe, a full disk) are returned so the command exits non-zero.
pub fn format_output(format: &OutputFormat, value: &Value) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => print_json(value)?,
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value)?,
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Flatten nested objects into dotted keys (`with_offset.monthly_repayment`).
/// Arrays of objects are left out; callers render them as their own tables.
pub(crate) fn flatten_scalars(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    collect_scalars("", map, &mut out);
    out
}

fn collect_scalars(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => collect_scalars(&name, inner, out),
            Value::Array(items) if items.iter().any(Value::is_object) => {}
            _ => out.push((name, val.clone())),
        }
    }
}

/// Fields of the result that hold arrays of records (schedule rows, bracket
/// breakdowns), in output order.
pub(crate) fn record_arrays(map: &Map<String, Value>) -> Vec<(&str, &[Value])> {
    map.iter()
        .filter_map(|(key, val)| match val {
            Value::Array(items) if items.iter().any(Value::is_object) => {
                Some((key.as_str(), items.as_slice()))
            }
            _ => None,
        })
        .collect()
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_result() {
        let value = json!({
            "monthly_savings": "316.03",
            "with_offset": { "monthly_repayment": "2844.31" },
            "rows": [{ "period": 1 }],
        });
        let flat = flatten_scalars(value.as_object().unwrap());
        let keys: Vec<&str> = flat.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"monthly_savings"));
        assert!(keys.contains(&"with_offset.monthly_repayment"));
        assert!(!keys.iter().any(|k| k.starts_with("rows")));
    }

    #[test]
    fn test_record_arrays() {
        let value = json!({ "rows": [{ "period": 1 }], "tags": ["a"] });
        let arrays = record_arrays(value.as_object().unwrap());
        assert_eq!(arrays.len(), 1);
        assert_eq!(arrays[0].0, "rows");
    }
}
