use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    // Try to extract the "result" envelope, then the metrics of a full analysis
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let result_obj = result_obj
        .as_object()
        .and_then(|m| m.get("metrics"))
        .unwrap_or(result_obj);

    // Priority list of key output fields
    let priority_keys = [
        "npv",
        "probability_weighted_npv",
        "effective_rent_psf",
        "total_net_cash_flow",
        "irr_on_concessions",
        "payback_years",
        "free_rent_value",
        "base_case_value",
    ];

    if let Value::Object(map) = result_obj {
        // Try priority keys first (skip null values)
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Not an object, just print directly
    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_minimal_scalars() {
        assert_eq!(format_minimal(&json!("125000.50")), "125000.50");
        assert_eq!(format_minimal(&json!(12)), "12");
        assert_eq!(format_minimal(&Value::Null), "null");
    }
}
