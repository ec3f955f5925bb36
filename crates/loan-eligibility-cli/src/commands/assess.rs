use std::path::PathBuf;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use loan_eligibility_core::{
    localize, normalize, EligibilityEngine, EligibilityError, EngineConfig, IdentityTranslator,
    Language,
};

use crate::input;

/// Arguments for a loan eligibility assessment
#[derive(Args)]
pub struct AssessArgs {
    /// Path to JSON application file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to YAML engine configuration
    #[arg(long)]
    pub config: Option<String>,

    /// Path to a JSON approval model artifact (overrides the config)
    #[arg(long)]
    pub model: Option<String>,

    /// Nominal annual interest rate as a decimal (0.12 = 12%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Response language code (en, hi, ta, ml, mr, bn, gu, te, kn)
    #[arg(long)]
    pub language: Option<String>,

    /// Bank balance
    #[arg(long)]
    pub bank_balance: Option<Decimal>,

    /// CIBIL credit score
    #[arg(long, alias = "cibil")]
    pub cibil_score: Option<u32>,

    /// Requested loan amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Monthly income
    #[arg(long, alias = "income")]
    pub monthly_income: Option<Decimal>,

    /// Loan tenure in months
    #[arg(long, alias = "tenure")]
    pub loan_tenure: Option<u32>,

    /// Applicant age in years
    #[arg(long)]
    pub age: Option<u32>,

    /// Employment type (Permanent, Government, Contract, ...)
    #[arg(long)]
    pub employment_type: Option<String>,

    /// Income source (Salary, Business, ...)
    #[arg(long)]
    pub income_source: Option<String>,

    /// Whether the applicant has existing loans (Yes/No)
    #[arg(long)]
    pub existing_loans: Option<String>,

    /// Monthly installments already being paid
    #[arg(long)]
    pub emi_existing: Option<Decimal>,
}

pub fn run_assess(args: AssessArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut config = match args.config {
        Some(ref path) => {
            info!(path = %path, "Loading engine config");
            EngineConfig::from_file(path)?
        }
        None => EngineConfig::default(),
    };
    if let Some(rate) = args.rate {
        info!(rate = %rate, "Overriding annual interest rate");
        config.annual_interest_rate = rate;
    }
    if let Some(ref path) = args.model {
        info!(path = %path, "Overriding model path");
        config.model_path = Some(PathBuf::from(path));
    }
    let engine = EligibilityEngine::from_config(config)?;

    let application: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        application_from_flags(&args)
    };

    let language = resolve_language(args.language.as_deref(), &application)?;

    let profile = normalize(&application)?;
    let output = engine.assess(&profile)?;
    let mut value = serde_json::to_value(&output)?;

    if language != Language::En {
        let localized = localize(&output.result, &IdentityTranslator, language);
        if let Value::Object(ref mut map) = value {
            map.insert("localized".to_string(), serde_json::to_value(localized)?);
        }
    }
    Ok(value)
}

/// Build a raw application from individual flags. Missing flags are left
/// out so the normalizer reports them by name.
fn application_from_flags(args: &AssessArgs) -> Value {
    let mut fields = Map::new();
    let mut put = |key: &str, value: Option<Value>| {
        if let Some(v) = value {
            fields.insert(key.to_string(), v);
        }
    };
    put("bank_balance", args.bank_balance.map(|d| json!(d.to_string())));
    put("cibil_score", args.cibil_score.map(|n| json!(n)));
    put("loan_amount", args.loan_amount.map(|d| json!(d.to_string())));
    put("monthly_income", args.monthly_income.map(|d| json!(d.to_string())));
    put("loan_tenure", args.loan_tenure.map(|n| json!(n)));
    put("age", args.age.map(|n| json!(n)));
    put("employment_type", args.employment_type.clone().map(Value::String));
    put("income_source", args.income_source.clone().map(Value::String));
    put("existing_loans", args.existing_loans.clone().map(Value::String));
    put("emi_existing", args.emi_existing.map(|d| json!(d.to_string())));
    Value::Object(fields)
}

fn application_language(application: &Value) -> Option<&str> {
    application.get("language").and_then(Value::as_str)
}

/// An explicit `--language` must be supported. A code carried inside the
/// application is advisory: unsupported codes fall back to English.
fn resolve_language(
    flag: Option<&str>,
    application: &Value,
) -> Result<Language, EligibilityError> {
    if let Some(code) = flag {
        return code.parse();
    }
    match application_language(application) {
        Some(code) => Ok(code.parse().unwrap_or_else(|err| {
            warn!(
                language = code,
                error = %err,
                "Unsupported application language, using English"
            );
            Language::En
        })),
        None => Ok(Language::En),
    }
}
