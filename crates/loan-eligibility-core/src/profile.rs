//! Applicant profile and the normalizer that builds it from raw request fields.
//!
//! Raw applications arrive as loosely typed JSON: numbers may be sent as
//! numbers or numeric strings, `existing_loans` as "Yes"/"No" or a boolean.
//! [`normalize`] coerces them into an [`ApplicantProfile`] and reports the
//! first problem it finds as a validation or domain error.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EligibilityError;
use crate::types::Money;
use crate::EngineResult;

/// Fields the boundary layer must supply, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "bank_balance",
    "cibil_score",
    "loan_amount",
    "monthly_income",
    "loan_tenure",
    "age",
    "employment_type",
    "income_source",
    "existing_loans",
];

/// Longest tenure accepted, fifty years of monthly installments.
pub const MAX_TENURE_MONTHS: u32 = 600;

/// Ceiling on every monetary field. Keeps products such as
/// `income * 60` and `amount * rate * growth` inside `Decimal` range.
pub const MAX_AMOUNT: Money = dec!(1000000000000000);

// ---------------------------------------------------------------------------
// Categorical fields
// ---------------------------------------------------------------------------

/// Employment category. Labels outside the three scored categories are kept
/// verbatim in `Other` so the classifier encoder sees the submitted value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmploymentType {
    Permanent,
    Government,
    Contract,
    Other(String),
}

impl EmploymentType {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "permanent" => EmploymentType::Permanent,
            "government" => EmploymentType::Government,
            "contract" => EmploymentType::Contract,
            _ => EmploymentType::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EmploymentType::Permanent => "Permanent",
            EmploymentType::Government => "Government",
            EmploymentType::Contract => "Contract",
            EmploymentType::Other(label) => label,
        }
    }
}

impl From<String> for EmploymentType {
    fn from(value: String) -> Self {
        EmploymentType::parse(&value)
    }
}

impl From<EmploymentType> for String {
    fn from(value: EmploymentType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary income source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncomeSource {
    Salary,
    Business,
    Other(String),
}

impl IncomeSource {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "salary" => IncomeSource::Salary,
            "business" => IncomeSource::Business,
            _ => IncomeSource::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IncomeSource::Salary => "Salary",
            IncomeSource::Business => "Business",
            IncomeSource::Other(label) => label,
        }
    }
}

impl From<String> for IncomeSource {
    fn from(value: String) -> Self {
        IncomeSource::parse(&value)
    }
}

impl From<IncomeSource> for String {
    fn from(value: IncomeSource) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for IncomeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A normalized applicant, one per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub bank_balance: Money,
    pub cibil_score: u32,
    pub loan_amount: Money,
    pub monthly_income: Money,
    pub loan_tenure_months: u32,
    pub existing_loans: bool,
    #[serde(default)]
    pub emi_existing: Money,
    pub age: u32,
    pub employment_type: EmploymentType,
    pub income_source: IncomeSource,
}

impl ApplicantProfile {
    /// Check the numeric preconditions every downstream formula relies on.
    pub fn validate(&self) -> EngineResult<()> {
        if self.bank_balance < Decimal::ZERO {
            return Err(EligibilityError::invalid(
                "bank_balance",
                "Bank balance must be non-negative.",
            ));
        }
        if self.emi_existing < Decimal::ZERO {
            return Err(EligibilityError::invalid(
                "emi_existing",
                "Existing EMI must be non-negative.",
            ));
        }
        if self.loan_amount <= Decimal::ZERO {
            return Err(EligibilityError::domain(
                "loan_amount",
                "Loan amount must be positive.",
            ));
        }
        if self.monthly_income <= Decimal::ZERO {
            return Err(EligibilityError::domain(
                "monthly_income",
                "Monthly income must be positive; the EMI ratio is undefined otherwise.",
            ));
        }
        if self.loan_tenure_months == 0 {
            return Err(EligibilityError::domain(
                "loan_tenure",
                "Loan tenure must be at least one month.",
            ));
        }
        if self.loan_tenure_months > MAX_TENURE_MONTHS {
            return Err(EligibilityError::domain(
                "loan_tenure",
                format!("Loan tenure must not exceed {MAX_TENURE_MONTHS} months."),
            ));
        }
        if self.age == 0 {
            return Err(EligibilityError::domain("age", "Age must be positive."));
        }
        for (field, amount) in [
            ("bank_balance", self.bank_balance),
            ("loan_amount", self.loan_amount),
            ("monthly_income", self.monthly_income),
            ("emi_existing", self.emi_existing),
        ] {
            if amount > MAX_AMOUNT {
                return Err(EligibilityError::domain(
                    field,
                    format!("Amount must not exceed {MAX_AMOUNT}."),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Coerce a raw JSON application into a validated [`ApplicantProfile`].
pub fn normalize(raw: &Value) -> EngineResult<ApplicantProfile> {
    let fields = raw
        .as_object()
        .ok_or_else(|| EligibilityError::invalid("application", "Expected a JSON object."))?;

    for field in REQUIRED_FIELDS {
        if is_blank(fields.get(field)) {
            return Err(EligibilityError::MissingField(field.to_string()));
        }
    }

    let bank_balance = money_field(fields, "bank_balance")?;
    let cibil_score = integer_field(fields, "cibil_score")?;
    if cibil_score < 0 {
        return Err(EligibilityError::invalid(
            "cibil_score",
            "CIBIL score cannot be negative.",
        ));
    }
    let loan_amount = money_field(fields, "loan_amount")?;
    let monthly_income = money_field(fields, "monthly_income")?;
    let loan_tenure = integer_field(fields, "loan_tenure")?;
    if loan_tenure <= 0 {
        return Err(EligibilityError::domain(
            "loan_tenure",
            "Loan tenure must be at least one month.",
        ));
    }
    let age = integer_field(fields, "age")?;
    if age <= 0 {
        return Err(EligibilityError::domain("age", "Age must be positive."));
    }
    let employment_type = EmploymentType::parse(text_field(fields, "employment_type")?);
    let income_source = IncomeSource::parse(text_field(fields, "income_source")?);
    let existing_loans = flag_field(fields, "existing_loans")?;
    let emi_existing = if is_blank(fields.get("emi_existing")) {
        Decimal::ZERO
    } else {
        money_field(fields, "emi_existing")?
    };

    let profile = ApplicantProfile {
        bank_balance,
        cibil_score: to_u32("cibil_score", cibil_score)?,
        loan_amount,
        monthly_income,
        loan_tenure_months: to_u32("loan_tenure", loan_tenure)?,
        existing_loans,
        emi_existing,
        age: to_u32("age", age)?,
        employment_type,
        income_source,
    };
    profile.validate()?;
    Ok(profile)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn money_field(fields: &Map<String, Value>, field: &str) -> EngineResult<Money> {
    let parsed = match fields.get(field) {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s),
        _ => None,
    };
    parsed.ok_or_else(|| EligibilityError::invalid(field, "Expected a numeric value."))
}

fn integer_field(fields: &Map<String, Value>, field: &str) -> EngineResult<i64> {
    let value = money_field(fields, field)?;
    if !value.fract().is_zero() {
        return Err(EligibilityError::invalid(field, "Expected a whole number."));
    }
    value
        .to_i64()
        .ok_or_else(|| EligibilityError::invalid(field, "Value is out of range."))
}

fn to_u32(field: &str, value: i64) -> EngineResult<u32> {
    u32::try_from(value).map_err(|_| EligibilityError::invalid(field, "Value is out of range."))
}

fn text_field<'a>(fields: &'a Map<String, Value>, field: &str) -> EngineResult<&'a str> {
    match fields.get(field) {
        Some(Value::String(s)) => Ok(s.as_str()),
        _ => Err(EligibilityError::invalid(field, "Expected a text label.")),
    }
}

fn flag_field(fields: &Map<String, Value>, field: &str) -> EngineResult<bool> {
    match fields.get(field) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(true),
            "no" | "n" | "false" => Ok(false),
            _ => Err(EligibilityError::invalid(field, "Expected \"Yes\" or \"No\".")),
        },
        _ => Err(EligibilityError::invalid(field, "Expected \"Yes\" or \"No\".")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
