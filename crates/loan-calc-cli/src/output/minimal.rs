use serde_json::Value;

use super::format_value;

/// Headline figure of each calculator, in priority order.
const PRIORITY_KEYS: [&str; 5] = [
    "final_duty",
    "monthly_savings",
    "usable_equity",
    "monthly_repayment",
    "total_debt",
];

/// Print just the key answer value from the output.
///
/// Looks for the calculator's headline field, then falls back to the first
/// field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_value(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}
