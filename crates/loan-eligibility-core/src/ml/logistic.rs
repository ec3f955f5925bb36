//! Logistic-regression approval model loaded from a JSON artifact.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "name": "loan-approval-logit-v1",
//!   "intercept": "-1.2",
//!   "coefficients": ["0.4", "1.9", ...],
//!   "scaler": { "mean": [...], "scale": [...] },
//!   "threshold": "0.5",
//!   "encoders": {
//!     "employment_type": ["Contract", "Government", "Permanent", ...],
//!     "income_source": ["Business", "Other", "Salary", ...]
//!   }
//! }
//! ```
//!
//! One coefficient (and scaler entry) per column of [`FEATURE_COLUMNS`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{
    ApprovalModel, FeatureVector, LabelEncoder, MlDecision, MlError, MlPrediction,
    FEATURE_COLUMNS,
};
use crate::profile::ApplicantProfile;
use crate::types::Probability;

/// Per-feature standardization fitted at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<Decimal>,
    pub scale: Vec<Decimal>,
}

impl StandardScaler {
    /// `(x - mean[i]) / scale[i]`, failing on a missing entry, a zero scale
    /// or a result outside `Decimal` range.
    fn standardize(&self, i: usize, x: Decimal) -> Result<Decimal, MlError> {
        let (mean, scale) = match (self.mean.get(i), self.scale.get(i)) {
            (Some(mean), Some(scale)) => (*mean, *scale),
            _ => {
                return Err(MlError::FeatureShape {
                    expected: i + 1,
                    actual: self.mean.len().min(self.scale.len()),
                })
            }
        };
        x.checked_sub(mean)
            .and_then(|centered| centered.checked_div(scale))
            .ok_or_else(|| {
                MlError::InvalidOutput(format!("feature {i} could not be standardized"))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub name: String,
    pub intercept: Decimal,
    pub coefficients: Vec<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
    #[serde(default = "default_threshold")]
    pub threshold: Probability,
    #[serde(default)]
    pub encoders: HashMap<String, LabelEncoder>,
}

fn default_threshold() -> Probability {
    dec!(0.5)
}

impl LogisticModel {
    /// Check the artifact is internally consistent before serving with it.
    pub fn validate(&self) -> Result<(), MlError> {
        let expected = FEATURE_COLUMNS.len();
        if self.coefficients.len() != expected {
            return Err(MlError::FeatureShape {
                expected,
                actual: self.coefficients.len(),
            });
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != expected || scaler.scale.len() != expected {
                return Err(MlError::FeatureShape {
                    expected,
                    actual: scaler.mean.len().min(scaler.scale.len()),
                });
            }
            if scaler.scale.iter().any(|s| s.is_zero()) {
                return Err(MlError::InvalidOutput(
                    "scaler contains a zero scale".into(),
                ));
            }
        }
        if self.threshold < Decimal::ZERO || self.threshold > Decimal::ONE {
            return Err(MlError::InvalidOutput(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        Ok(())
    }

    fn encode_label(&self, column: &str, label: &str) -> Result<Decimal, MlError> {
        match self.encoders.get(column) {
            Some(encoder) => encoder.transform(column, label),
            None => Err(MlError::Encoding {
                column: column.to_string(),
                value: label.to_string(),
            }),
        }
    }
}

impl ApprovalModel for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, profile: &ApplicantProfile) -> Result<FeatureVector, MlError> {
        let employment = self.encode_label("employment_type", profile.employment_type.as_str())?;
        let income = self.encode_label("income_source", profile.income_source.as_str())?;

        Ok(FeatureVector {
            values: vec![
                profile.bank_balance,
                Decimal::from(profile.cibil_score),
                profile.loan_amount,
                profile.monthly_income,
                Decimal::from(profile.loan_tenure_months),
                profile.emi_existing,
                Decimal::from(profile.age),
                employment,
                income,
            ],
        })
    }

    fn predict(&self, features: &FeatureVector) -> Result<MlPrediction, MlError> {
        if features.len() != self.coefficients.len() {
            return Err(MlError::FeatureShape {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }

        let mut logit = self.intercept;
        for (i, (x, w)) in features.values.iter().zip(&self.coefficients).enumerate() {
            let x = match &self.scaler {
                Some(scaler) => scaler.standardize(i, *x)?,
                None => *x,
            };
            logit = logit
                .checked_add(x.checked_mul(*w).ok_or_else(overflow)?)
                .ok_or_else(overflow)?;
        }

        let probability = sigmoid(logit);
        let decision = if probability >= self.threshold {
            MlDecision::Approve
        } else {
            MlDecision::Reject
        };
        Ok(MlPrediction {
            decision,
            probability,
        })
    }
}

fn overflow() -> MlError {
    MlError::InvalidOutput("logit overflowed".into())
}

/// Numerically stable logistic function: only ever exponentiates -|z|.
fn sigmoid(z: Decimal) -> Probability {
    let e = (-z.abs()).checked_exp().unwrap_or(Decimal::ZERO);
    if z >= Decimal::ZERO {
        Decimal::ONE / (Decimal::ONE + e)
    } else {
        e / (Decimal::ONE + e)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::profile::{EmploymentType, IncomeSource};

    pub(crate) const ARTIFACT: &str = r#"{
        "name": "logit-test",
        "intercept": "-4",
        "coefficients": ["0", "0.01", "0", "0", "0", "0", "0", "0", "0"],
        "encoders": {
            "employment_type": ["Contract", "Government", "Permanent", "Self-employed", "Business"],
            "income_source": ["Salary", "Business", "Other"]
        }
    }"#;

    fn model() -> LogisticModel {
        serde_json::from_str(ARTIFACT).unwrap()
    }

    fn profile(cibil_score: u32) -> ApplicantProfile {
        ApplicantProfile {
            bank_balance: dec!(60000),
            cibil_score,
            loan_amount: dec!(300000),
            monthly_income: dec!(50000),
            loan_tenure_months: 24,
            existing_loans: false,
            emi_existing: Decimal::ZERO,
            age: 32,
            employment_type: EmploymentType::Permanent,
            income_source: IncomeSource::Salary,
        }
    }

    #[test]
    fn test_artifact_defaults_and_validates() {
        let m = model();
        assert_eq!(m.threshold, dec!(0.5));
        assert!(m.scaler.is_none());
        m.validate().unwrap();
    }

    #[test]
    fn test_encode_uses_training_column_order() {
        let features = model().encode(&profile(700)).unwrap();
        assert_eq!(features.len(), FEATURE_COLUMNS.len());
        assert_eq!(features.values[1], dec!(700));
        // sorted: Business, Contract, Government, Permanent, Self-employed
        assert_eq!(features.values[7], dec!(3));
        // sorted: Business, Other, Salary
        assert_eq!(features.values[8], dec!(2));
    }

    #[test]
    fn test_high_score_approves() {
        let m = model();
        // logit = -4 + 0.01 * 800 = 4
        let prediction = m.predict(&m.encode(&profile(800)).unwrap()).unwrap();
        assert_eq!(prediction.decision, MlDecision::Approve);
        assert!(prediction.probability > dec!(0.98));
        assert!(prediction.probability < Decimal::ONE);
    }

    #[test]
    fn test_low_score_rejects() {
        let m = model();
        // logit = -4 + 0.01 * 300 = -1
        let prediction = m.predict(&m.encode(&profile(300)).unwrap()).unwrap();
        assert_eq!(prediction.decision, MlDecision::Reject);
        assert!(prediction.probability < dec!(0.5));
    }

    #[test]
    fn test_zero_logit_is_half() {
        assert_eq!(sigmoid(Decimal::ZERO), dec!(0.5));
    }

    #[test]
    fn test_sigmoid_saturates_without_overflow() {
        assert!(sigmoid(dec!(500)) <= Decimal::ONE);
        assert!(sigmoid(dec!(-500)) >= Decimal::ZERO);
    }

    #[test]
    fn test_unseen_category_fails_encoding() {
        let mut p = profile(750);
        p.income_source = IncomeSource::Other("Investment".into());
        match model().encode(&p).unwrap_err() {
            MlError::Encoding { column, value } => {
                assert_eq!(column, "income_source");
                assert_eq!(value, "Investment");
            }
            other => panic!("Expected Encoding, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_coefficient_count_rejected() {
        let mut m = model();
        m.coefficients.pop();
        assert_eq!(
            m.validate().unwrap_err(),
            MlError::FeatureShape {
                expected: 9,
                actual: 8
            }
        );
    }

    fn unit_scaler() -> StandardScaler {
        StandardScaler {
            mean: vec![Decimal::ZERO; FEATURE_COLUMNS.len()],
            scale: vec![Decimal::ONE; FEATURE_COLUMNS.len()],
        }
    }

    #[test]
    fn test_short_scaler_fails_prediction() {
        let mut m = model();
        let mut scaler = unit_scaler();
        scaler.scale.truncate(4);
        m.scaler = Some(scaler);
        let features = m.encode(&profile(700)).unwrap();
        assert!(matches!(
            m.predict(&features).unwrap_err(),
            MlError::FeatureShape { .. }
        ));
    }

    #[test]
    fn test_zero_scale_fails_prediction() {
        let mut m = model();
        let mut scaler = unit_scaler();
        scaler.scale[1] = Decimal::ZERO;
        m.scaler = Some(scaler);
        let features = m.encode(&profile(700)).unwrap();
        assert!(matches!(
            m.predict(&features).unwrap_err(),
            MlError::InvalidOutput(_)
        ));
    }

    #[test]
    fn test_standardization_overflow_fails_prediction() {
        let mut m = model();
        let mut scaler = unit_scaler();
        scaler.scale[2] = dec!(0.0000000000000000000000000001);
        m.scaler = Some(scaler);
        let features = m.encode(&profile(700)).unwrap();
        assert!(matches!(
            m.predict(&features).unwrap_err(),
            MlError::InvalidOutput(_)
        ));
    }

    #[test]
    fn test_broken_scaler_degrades_to_unavailable() {
        let mut m = model();
        let mut scaler = unit_scaler();
        scaler.mean.clear();
        m.scaler = Some(scaler);
        match crate::ml::assess(Some(&m as &dyn ApprovalModel), &profile(700)) {
            crate::ml::MlOutcome::Unavailable(MlError::FeatureShape { .. }) => {}
            other => panic!("Expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_scaler_applied() {
        let mut m = model();
        m.scaler = Some(StandardScaler {
            mean: vec![Decimal::ZERO, dec!(700), dec!(0), dec!(0), dec!(0), dec!(0), dec!(0), dec!(0), dec!(0)],
            scale: vec![Decimal::ONE, dec!(0.0025), Decimal::ONE, Decimal::ONE, Decimal::ONE, Decimal::ONE, Decimal::ONE, Decimal::ONE, Decimal::ONE],
        });
        m.validate().unwrap();
        // standardized cibil = (700 - 700) / 0.0025 = 0 => logit = intercept = -4
        let prediction = m.predict(&m.encode(&profile(700)).unwrap()).unwrap();
        assert_eq!(prediction.decision, MlDecision::Reject);
    }
}
