use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::EligibilityError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::EngineResult;

/// Nominal annual rate quoted to every applicant unless reconfigured.
pub const DEFAULT_ANNUAL_RATE: Rate = dec!(0.12);

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Equated monthly installment on a reducing-balance loan.
///
/// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1) with r = annual_rate / 12.
/// A zero rate degenerates to straight-line repayment P / n.
pub fn estimate_emi(
    loan_amount: Money,
    annual_rate: Rate,
    tenure_months: u32,
) -> EngineResult<Money> {
    if tenure_months == 0 {
        return Err(EligibilityError::domain(
            "loan_tenure",
            "Number of monthly installments must be > 0",
        ));
    }
    if loan_amount <= Decimal::ZERO {
        return Err(EligibilityError::domain(
            "loan_amount",
            "Loan amount must be positive",
        ));
    }
    if annual_rate < Decimal::ZERO {
        return Err(EligibilityError::domain(
            "annual_interest_rate",
            "Interest rate cannot be negative",
        ));
    }

    let n = Decimal::from(tenure_months);
    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    if monthly_rate.is_zero() {
        return Ok(loan_amount / n);
    }

    let growth = Decimal::ONE
        .checked_add(monthly_rate)
        .and_then(|base| base.checked_powi(i64::from(tenure_months)))
        .ok_or_else(|| {
            EligibilityError::domain(
                "loan_tenure",
                "Compound growth over the requested tenure exceeds the representable range",
            )
        })?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(EligibilityError::domain(
            "annual_interest_rate",
            "Rate too small to amortize over the requested tenure",
        ));
    }

    loan_amount
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| {
            EligibilityError::domain("loan_amount", "Installment exceeds the representable range")
        })
}

/// Share of monthly income consumed by all installments, in percent.
pub fn emi_to_income_ratio(total_emi: Money, monthly_income: Money) -> EngineResult<Percent> {
    if monthly_income <= Decimal::ZERO {
        return Err(EligibilityError::domain(
            "monthly_income",
            "Monthly income must be positive to compute the EMI ratio",
        ));
    }
    total_emi
        .checked_div(monthly_income)
        .and_then(|share| share.checked_mul(dec!(100)))
        .ok_or_else(|| {
            EligibilityError::domain("emi_existing", "EMI ratio exceeds the representable range")
        })
}

/// Stand-alone installment quote, rounded to paise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmiQuote {
    pub loan_amount: Money,
    pub tenure_months: u32,
    pub annual_rate: Rate,
    pub emi: Money,
    pub total_payable: Money,
    pub total_interest: Money,
}

pub fn quote_emi(
    loan_amount: Money,
    annual_rate: Rate,
    tenure_months: u32,
) -> EngineResult<ComputationOutput<EmiQuote>> {
    let start = std::time::Instant::now();
    let emi = estimate_emi(loan_amount, annual_rate, tenure_months)?;
    let total_payable = emi
        .checked_mul(Decimal::from(tenure_months))
        .map(|total| total.round_dp(2))
        .ok_or_else(|| {
            EligibilityError::domain("loan_amount", "Total payable exceeds the representable range")
        })?;

    let mut warnings = Vec::new();
    if annual_rate > dec!(0.5) {
        warnings.push(format!(
            "Annual rate {annual_rate} looks like a percentage; rates are decimals (0.12 = 12%)."
        ));
    }

    let quote = EmiQuote {
        loan_amount,
        tenure_months,
        annual_rate,
        emi: emi.round_dp(2),
        total_payable,
        total_interest: total_payable - loan_amount,
    };
    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "monthly_rate": (annual_rate / MONTHS_PER_YEAR).to_string(),
    });
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Reducing-balance equated monthly installment",
        &assumptions,
        warnings,
        elapsed,
        quote,
    ))
}
