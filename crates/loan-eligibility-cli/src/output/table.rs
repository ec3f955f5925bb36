use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::flatten;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        print_flat_object(envelope);
        return;
    };

    if let Some(Value::String(status)) = res_map.get("status") {
        let class = res_map
            .get("status_class")
            .and_then(Value::as_str)
            .unwrap_or_default();
        println!("{}\n", paint_status(status, class));
    }

    // The per-criterion breakdown gets its own table below
    let mut summary = res_map.clone();
    let criteria = summary.remove("criteria");
    print_flat_object(&summary);

    if let Some(Value::Array(rows)) = criteria {
        println!("\nCriteria:");
        print_array_table(&rows);
    }

    if let Some(Value::Object(localized)) = envelope.get("localized") {
        println!("\nLocalized:");
        print_flat_object(localized);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s.yellow());
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn paint_status(status: &str, class: &str) -> String {
    match class {
        "success" => status.green().bold().to_string(),
        "warning" => status.yellow().bold().to_string(),
        "info" => status.blue().bold().to_string(),
        "danger" => status.red().bold().to_string(),
        _ => status.bold().to_string(),
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(map) {
        builder.push_record([key.as_str(), &format_value(&val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(_)) = arr.first() {
        // Optional fields may be absent from the first row
        let mut headers: Vec<String> = Vec::new();
        for key in arr.iter().filter_map(Value::as_object).flat_map(|m| m.keys()) {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join("; ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
