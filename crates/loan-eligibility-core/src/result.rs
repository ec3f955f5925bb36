//! The eligibility result record handed to the boundary layer.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::config::EngineConfig;
use crate::criteria::{CriteriaAssessment, Criterion, ReasonCode};
use crate::ml::MlPrediction;
use crate::profile::ApplicantProfile;
use crate::scoring::Decision;
use crate::types::{Money, Percent, Probability, Score};

/// Criterion name to tier label, serialized as a JSON object in
/// evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaScores(Vec<(Criterion, &'static str)>);

impl CriteriaScores {
    pub fn get(&self, criterion: Criterion) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(c, _)| *c == criterion)
            .map(|(_, label)| *label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &'static str)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&CriteriaAssessment> for CriteriaScores {
    fn from(assessment: &CriteriaAssessment) -> Self {
        CriteriaScores(
            assessment
                .results()
                .iter()
                .map(|r| (r.criterion, r.label()))
                .collect(),
        )
    }
}

impl Serialize for CriteriaScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (criterion, label) in &self.0 {
            map.serialize_entry(criterion.name(), label)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanTerms {
    pub amount: Money,
    pub tenure: u32,
    /// Nominal annual rate in percent (12.0 = 12%).
    pub estimated_interest_rate: Percent,
    pub processing_fee: Money,
    /// Installment times tenure; not an amortization schedule total.
    pub total_payable: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlSummary {
    pub prediction: &'static str,
    pub confidence: Probability,
    pub summary: String,
}

impl From<&MlPrediction> for MlSummary {
    fn from(p: &MlPrediction) -> Self {
        let percent = p.probability * dec!(100);
        MlSummary {
            prediction: p.decision.label(),
            confidence: p.probability,
            summary: format!("{} (Confidence: {:.2}%)", p.decision.label(), percent),
        }
    }
}

/// Complete outcome of one evaluation. Built once by [`compose`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityResult {
    pub status: Decision,
    pub status_class: &'static str,
    pub eligibility_score: Score,
    /// Criterion points plus employment bonus, before fusion and clamping.
    pub base_score: Score,
    pub estimated_emi: Money,
    pub emi_ratio: Percent,
    pub reasons: Vec<String>,
    pub reason_codes: Vec<ReasonCode>,
    pub criteria_scores: CriteriaScores,
    pub criteria: CriteriaAssessment,
    pub recommendation: &'static str,
    pub loan_details: LoanTerms,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml_prediction: Option<MlSummary>,
}

/// Everything scoring produced for one applicant, before presentation.
#[derive(Debug, Clone)]
pub struct ScoredApplication<'a> {
    pub profile: &'a ApplicantProfile,
    pub estimated_emi: Money,
    pub emi_ratio: Percent,
    pub criteria: CriteriaAssessment,
    pub base_score: Score,
    pub fused_score: Score,
    pub ml_prediction: Option<MlPrediction>,
}

/// Round figures for display and attach the loan terms.
pub fn compose(scored: ScoredApplication<'_>, config: &EngineConfig) -> EligibilityResult {
    let decision = Decision::from_score(scored.fused_score);
    let profile = scored.profile;
    let tenure = Decimal::from(profile.loan_tenure_months);

    let loan_details = LoanTerms {
        amount: profile.loan_amount,
        tenure: profile.loan_tenure_months,
        estimated_interest_rate: (config.annual_interest_rate * dec!(100)).normalize(),
        processing_fee: profile
            .loan_amount
            .saturating_mul(config.processing_fee_rate)
            .round_dp(2),
        total_payable: scored.estimated_emi.saturating_mul(tenure).round_dp(2),
    };

    EligibilityResult {
        status: decision,
        status_class: decision.status_class(),
        eligibility_score: scored.fused_score,
        base_score: scored.base_score,
        estimated_emi: scored.estimated_emi.round_dp(2),
        emi_ratio: scored.emi_ratio.round_dp(2),
        reasons: scored.criteria.reasons(),
        reason_codes: scored.criteria.reason_codes(),
        criteria_scores: CriteriaScores::from(&scored.criteria),
        criteria: scored.criteria,
        recommendation: decision.recommendation(),
        loan_details,
        ml_prediction: scored.ml_prediction.as_ref().map(MlSummary::from),
    }
}
