use serde_json::{json, Value};

use loan_eligibility_core::Language;

pub fn run_languages() -> Result<Value, Box<dyn std::error::Error>> {
    let languages: Vec<Value> = Language::ALL
        .iter()
        .map(|lang| json!({ "code": lang.code(), "name": lang.name() }))
        .collect();
    Ok(Value::Array(languages))
}
