//! Rule-based criterion evaluators.
//!
//! Six independent bands map applicant fields to points and a qualitative tier:
//!
//! | Criterion        | Max points |
//! |------------------|------------|
//! | CIBIL Score      | 40         |
//! | Income Analysis  | 25         |
//! | EMI Ratio        | 20         |
//! | Bank Balance     | 10         |
//! | Age Factor       | 5          |
//! | Employment       | +5 bonus   |
//!
//! The employment bonus stacks on the other five, so a perfect profile sums
//! to 105 before fusion clamps it. Each tier belongs to exactly one
//! criterion's closed set; evaluation order is the display order.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::emi::emi_to_income_ratio;
use crate::profile::{ApplicantProfile, EmploymentType};
use crate::types::{Money, Percent, Score};
use crate::EngineResult;

/// Loan amount is compared against this many months of income.
pub const INCOME_MULTIPLIER: Decimal = dec!(60);

/// Liquidity reference: share of the loan expected in the bank.
pub const REQUIRED_BALANCE_SHARE: Decimal = dec!(0.1);

// ---------------------------------------------------------------------------
// Criteria and tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Criterion {
    #[serde(rename = "CIBIL Score")]
    CibilScore,
    #[serde(rename = "Income Analysis")]
    IncomeAnalysis,
    #[serde(rename = "EMI Ratio")]
    EmiRatio,
    #[serde(rename = "Bank Balance")]
    BankBalance,
    #[serde(rename = "Age Factor")]
    AgeFactor,
    Employment,
}

impl Criterion {
    /// Evaluation and display order.
    pub const ALL: [Criterion; 6] = [
        Criterion::CibilScore,
        Criterion::IncomeAnalysis,
        Criterion::EmiRatio,
        Criterion::BankBalance,
        Criterion::AgeFactor,
        Criterion::Employment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::CibilScore => "CIBIL Score",
            Criterion::IncomeAnalysis => "Income Analysis",
            Criterion::EmiRatio => "EMI Ratio",
            Criterion::BankBalance => "Bank Balance",
            Criterion::AgeFactor => "Age Factor",
            Criterion::Employment => "Employment",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CibilTier {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeTier {
    Excellent,
    Good,
    Moderate,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmiTier {
    Excellent,
    Good,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceTier {
    Excellent,
    Good,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeTier {
    Optimal,
    Good,
    Acceptable,
    Risky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmploymentTier {
    Stable,
    Moderate,
    Variable,
}

/// A tier tagged with the criterion whose label set it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriterionTier {
    Cibil(CibilTier),
    Income(IncomeTier),
    Emi(EmiTier),
    Balance(BalanceTier),
    Age(AgeTier),
    Employment(EmploymentTier),
}

impl CriterionTier {
    pub fn criterion(&self) -> Criterion {
        match self {
            CriterionTier::Cibil(_) => Criterion::CibilScore,
            CriterionTier::Income(_) => Criterion::IncomeAnalysis,
            CriterionTier::Emi(_) => Criterion::EmiRatio,
            CriterionTier::Balance(_) => Criterion::BankBalance,
            CriterionTier::Age(_) => Criterion::AgeFactor,
            CriterionTier::Employment(_) => Criterion::Employment,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CriterionTier::Cibil(t) => match t {
                CibilTier::Excellent => "Excellent",
                CibilTier::VeryGood => "Very Good",
                CibilTier::Good => "Good",
                CibilTier::Fair => "Fair",
                CibilTier::Poor => "Poor",
            },
            CriterionTier::Income(t) => match t {
                IncomeTier::Excellent => "Excellent",
                IncomeTier::Good => "Good",
                IncomeTier::Moderate => "Moderate",
                IncomeTier::Poor => "Poor",
            },
            CriterionTier::Emi(t) => match t {
                EmiTier::Excellent => "Excellent",
                EmiTier::Good => "Good",
                EmiTier::Moderate => "Moderate",
                EmiTier::High => "High",
                EmiTier::VeryHigh => "Very High",
            },
            CriterionTier::Balance(t) => match t {
                BalanceTier::Excellent => "Excellent",
                BalanceTier::Good => "Good",
                BalanceTier::Moderate => "Moderate",
                BalanceTier::Low => "Low",
            },
            CriterionTier::Age(t) => match t {
                AgeTier::Optimal => "Optimal",
                AgeTier::Good => "Good",
                AgeTier::Acceptable => "Acceptable",
                AgeTier::Risky => "Risky",
            },
            CriterionTier::Employment(t) => match t {
                EmploymentTier::Stable => "Stable",
                EmploymentTier::Moderate => "Moderate",
                EmploymentTier::Variable => "Variable",
            },
        }
    }

    pub fn points(&self) -> Score {
        match self {
            CriterionTier::Cibil(t) => match t {
                CibilTier::Excellent => dec!(40),
                CibilTier::VeryGood => dec!(35),
                CibilTier::Good => dec!(25),
                CibilTier::Fair => dec!(15),
                CibilTier::Poor => dec!(0),
            },
            CriterionTier::Income(t) => match t {
                IncomeTier::Excellent => dec!(25),
                IncomeTier::Good => dec!(20),
                IncomeTier::Moderate => dec!(10),
                IncomeTier::Poor => dec!(0),
            },
            CriterionTier::Emi(t) => match t {
                EmiTier::Excellent => dec!(20),
                EmiTier::Good => dec!(15),
                EmiTier::Moderate => dec!(10),
                EmiTier::High => dec!(5),
                EmiTier::VeryHigh => dec!(0),
            },
            CriterionTier::Balance(t) => match t {
                BalanceTier::Excellent => dec!(10),
                BalanceTier::Good => dec!(8),
                BalanceTier::Moderate => dec!(5),
                BalanceTier::Low => dec!(0),
            },
            CriterionTier::Age(t) => match t {
                AgeTier::Optimal => dec!(5),
                AgeTier::Good => dec!(4),
                AgeTier::Acceptable => dec!(3),
                AgeTier::Risky => dec!(1),
            },
            CriterionTier::Employment(t) => match t {
                EmploymentTier::Stable => dec!(5),
                EmploymentTier::Moderate => dec!(2),
                EmploymentTier::Variable => dec!(0),
            },
        }
    }

    /// Reason emitted for this tier. Second-best tiers of the financial
    /// criteria and the middle age bands carry none.
    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            CriterionTier::Cibil(CibilTier::Good) => Some(ReasonCode::CibilGood),
            CriterionTier::Cibil(CibilTier::Fair) => Some(ReasonCode::CibilFair),
            CriterionTier::Cibil(CibilTier::Poor) => Some(ReasonCode::CibilPoor),
            CriterionTier::Income(IncomeTier::Moderate) => Some(ReasonCode::IncomeModerate),
            CriterionTier::Income(IncomeTier::Poor) => Some(ReasonCode::IncomePoor),
            CriterionTier::Emi(EmiTier::Moderate) => Some(ReasonCode::EmiModerate),
            CriterionTier::Emi(EmiTier::High) => Some(ReasonCode::EmiHigh),
            CriterionTier::Emi(EmiTier::VeryHigh) => Some(ReasonCode::EmiVeryHigh),
            CriterionTier::Balance(BalanceTier::Moderate) => Some(ReasonCode::BalanceModerate),
            CriterionTier::Balance(BalanceTier::Low) => Some(ReasonCode::BalanceLow),
            CriterionTier::Age(AgeTier::Risky) => Some(ReasonCode::AgeRisky),
            CriterionTier::Employment(EmploymentTier::Variable) => {
                Some(ReasonCode::EmploymentVariable)
            }
            _ => None,
        }
    }
}

impl Serialize for CriterionTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Stable key for each human-readable reason, usable as a localization key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    CibilGood,
    CibilFair,
    CibilPoor,
    IncomeModerate,
    IncomePoor,
    EmiModerate,
    EmiHigh,
    EmiVeryHigh,
    BalanceModerate,
    BalanceLow,
    AgeRisky,
    EmploymentVariable,
}

impl ReasonCode {
    pub fn message(&self) -> &'static str {
        match self {
            ReasonCode::CibilGood => "CIBIL score is good but could be improved",
            ReasonCode::CibilFair => "CIBIL score needs improvement",
            ReasonCode::CibilPoor => "Low CIBIL score significantly affects approval",
            ReasonCode::IncomeModerate => "Requested amount is high relative to income",
            ReasonCode::IncomePoor => "Requested amount exceeds income capacity",
            ReasonCode::EmiModerate => "EMI to income ratio is on the higher side",
            ReasonCode::EmiHigh => "High EMI to income ratio affects approval",
            ReasonCode::EmiVeryHigh => "EMI to income ratio is too high",
            ReasonCode::BalanceModerate => "Bank balance could be higher",
            ReasonCode::BalanceLow => "Insufficient bank balance for loan security",
            ReasonCode::AgeRisky => "Age factor affects loan tenure and approval",
            ReasonCode::EmploymentVariable => "Employment type affects stability assessment",
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionResult {
    pub criterion: Criterion,
    pub tier: CriterionTier,
    pub points: Score,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
}

impl CriterionResult {
    fn from_tier(tier: CriterionTier) -> Self {
        let result = CriterionResult {
            criterion: tier.criterion(),
            tier,
            points: tier.points(),
            reason: tier.reason(),
        };
        debug!(
            criterion = result.criterion.name(),
            tier = tier.label(),
            points = %result.points,
            "criterion evaluated"
        );
        result
    }

    pub fn label(&self) -> &'static str {
        self.tier.label()
    }
}

/// All six criteria for one applicant, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CriteriaAssessment {
    results: Vec<CriterionResult>,
}

impl CriteriaAssessment {
    pub fn results(&self) -> &[CriterionResult] {
        &self.results
    }

    /// Sum of all criterion points including the employment bonus.
    pub fn total_points(&self) -> Score {
        self.results.iter().map(|r| r.points).sum()
    }

    pub fn reason_codes(&self) -> Vec<ReasonCode> {
        self.results.iter().filter_map(|r| r.reason).collect()
    }

    pub fn reasons(&self) -> Vec<String> {
        self.reason_codes()
            .iter()
            .map(|code| code.message().to_string())
            .collect()
    }

    pub fn get(&self, criterion: Criterion) -> Option<&CriterionResult> {
        self.results.iter().find(|r| r.criterion == criterion)
    }
}

// ---------------------------------------------------------------------------
// Evaluators
// ---------------------------------------------------------------------------

pub fn evaluate_cibil(cibil_score: u32) -> CriterionResult {
    let tier = match cibil_score {
        s if s >= 800 => CibilTier::Excellent,
        s if s >= 750 => CibilTier::VeryGood,
        s if s >= 700 => CibilTier::Good,
        s if s >= 650 => CibilTier::Fair,
        _ => CibilTier::Poor,
    };
    CriterionResult::from_tier(CriterionTier::Cibil(tier))
}

/// Compare the request with five years of income.
pub fn evaluate_income(loan_amount: Money, monthly_income: Money) -> CriterionResult {
    let max_eligible = monthly_income.saturating_mul(INCOME_MULTIPLIER);
    let tier = if loan_amount <= max_eligible * dec!(0.7) {
        IncomeTier::Excellent
    } else if loan_amount <= max_eligible {
        IncomeTier::Good
    } else if loan_amount <= max_eligible.saturating_mul(dec!(1.2)) {
        IncomeTier::Moderate
    } else {
        IncomeTier::Poor
    };
    CriterionResult::from_tier(CriterionTier::Income(tier))
}

/// Grade total installments (new and existing) as a percent of income.
pub fn evaluate_emi_burden(emi_ratio: Percent) -> CriterionResult {
    let tier = if emi_ratio <= dec!(30) {
        EmiTier::Excellent
    } else if emi_ratio <= dec!(40) {
        EmiTier::Good
    } else if emi_ratio <= dec!(50) {
        EmiTier::Moderate
    } else if emi_ratio <= dec!(60) {
        EmiTier::High
    } else {
        EmiTier::VeryHigh
    };
    CriterionResult::from_tier(CriterionTier::Emi(tier))
}

pub fn evaluate_bank_balance(bank_balance: Money, loan_amount: Money) -> CriterionResult {
    let required = loan_amount.saturating_mul(REQUIRED_BALANCE_SHARE);
    let tier = if bank_balance >= required.saturating_mul(dec!(2)) {
        BalanceTier::Excellent
    } else if bank_balance >= required {
        BalanceTier::Good
    } else if bank_balance >= required * dec!(0.5) {
        BalanceTier::Moderate
    } else {
        BalanceTier::Low
    };
    CriterionResult::from_tier(CriterionTier::Balance(tier))
}

pub fn evaluate_age(age: u32) -> CriterionResult {
    let tier = match age {
        25..=35 => AgeTier::Optimal,
        21..=45 => AgeTier::Good,
        18..=55 => AgeTier::Acceptable,
        _ => AgeTier::Risky,
    };
    CriterionResult::from_tier(CriterionTier::Age(tier))
}

pub fn evaluate_employment(employment_type: &EmploymentType) -> CriterionResult {
    let tier = match employment_type {
        EmploymentType::Permanent | EmploymentType::Government => EmploymentTier::Stable,
        EmploymentType::Contract => EmploymentTier::Moderate,
        EmploymentType::Other(_) => EmploymentTier::Variable,
    };
    CriterionResult::from_tier(CriterionTier::Employment(tier))
}

/// Run all six evaluators. `estimated_emi` is the installment on the new
/// loan; existing EMIs from the profile are added before grading the burden.
pub fn evaluate_criteria(
    profile: &ApplicantProfile,
    estimated_emi: Money,
) -> EngineResult<CriteriaAssessment> {
    let total_emi = estimated_emi + profile.emi_existing;
    let emi_ratio = emi_to_income_ratio(total_emi, profile.monthly_income)?;

    Ok(CriteriaAssessment {
        results: vec![
            evaluate_cibil(profile.cibil_score),
            evaluate_income(profile.loan_amount, profile.monthly_income),
            evaluate_emi_burden(emi_ratio),
            evaluate_bank_balance(profile.bank_balance, profile.loan_amount),
            evaluate_age(profile.age),
            evaluate_employment(&profile.employment_type),
        ],
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
