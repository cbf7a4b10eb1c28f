use serde_json::Value;
use std::io;

use super::{flatten_scalars, format_value, record_arrays};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) -> csv::Result<()> {
    write_csv(io::stdout().lock(), value)
}

/// A result carrying schedule `rows` is written one row per line; any other
/// result becomes a two-column field/value sheet.
fn write_csv<W: io::Write>(out: W, value: &Value) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    match value {
        Value::Object(map) => {
            let result = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let rows = record_arrays(result)
                .into_iter()
                .find(|(name, _)| *name == "rows");
            match rows {
                Some((_, records)) => write_records(&mut wtr, records)?,
                None => {
                    wtr.write_record(["field", "value"])?;
                    for (key, val) in flatten_scalars(result) {
                        wtr.write_record([key, format_value(&val)])?;
                    }
                }
            }
        }
        Value::Array(arr) => write_records(&mut wtr, arr)?,
        _ => wtr.write_record([format_value(value)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([format_value(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Sink that rejects every write, as a closed pipe does.
    struct ClosedPipe;

    impl io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_rows_written_one_per_line() {
        let value = json!({
            "result": {
                "monthly_repayment": "1000",
                "rows": [{ "period": 1 }, { "period": 2 }],
            }
        });
        let mut buf = Vec::new();
        write_csv(&mut buf, &value).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "period\n1\n2\n");
    }

    #[test]
    fn test_fields_sheet_without_rows() {
        let value = json!({ "result": { "final_duty": "21530" } });
        let mut buf = Vec::new();
        write_csv(&mut buf, &value).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "field,value\nfinal_duty,21530\n");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let value = json!({ "result": { "final_duty": "21530" } });
        assert!(write_csv(ClosedPipe, &value).is_err());
    }
}
