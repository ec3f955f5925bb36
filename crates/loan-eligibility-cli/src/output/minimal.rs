use serde_json::Value;

/// Print just the key answer value from the output.
///
/// An assessment prints its status and score, an EMI quote its installment,
/// a list one entry per line.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            if let (Some(status), Some(score)) = (map.get("status"), map.get("eligibility_score")) {
                println!("{} ({})", format_minimal(status), format_minimal(score));
                return;
            }
            if let Some(emi) = map.get("emi").filter(|v| !v.is_null()) {
                println!("{}", format_minimal(emi));
                return;
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
                return;
            }
        }
        Value::Array(items) => {
            for item in items {
                match item.get("code") {
                    Some(code) => println!("{}", format_minimal(code)),
                    None => println!("{}", format_minimal(item)),
                }
            }
            return;
        }
        _ => {}
    }

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
