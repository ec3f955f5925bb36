//! Optional classifier adapter.
//!
//! An externally trained approval model can nudge the rule-based score. The
//! engine only sees the [`ApprovalModel`] capability; whether a model is
//! present, and whether it could score a given applicant, is reported as an
//! [`MlOutcome`] value rather than an error.

pub mod encoder;
#[cfg(feature = "ml")]
pub mod loader;
#[cfg(feature = "ml")]
pub mod logistic;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::profile::ApplicantProfile;
use crate::types::Probability;

pub use encoder::LabelEncoder;
#[cfg(feature = "ml")]
pub use loader::ModelLoader;
#[cfg(feature = "ml")]
pub use logistic::LogisticModel;

/// Feature columns in the order the classifier was trained on.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "bank_balance",
    "cibil_score",
    "loan_amount",
    "monthly_income",
    "loan_tenure",
    "emi_existing",
    "age",
    "employment_type",
    "income_source",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MlError {
    #[error("no approval model is loaded")]
    NotLoaded,

    #[error("cannot encode {column} value '{value}': unseen category")]
    Encoding { column: String, value: String },

    #[error("feature vector has {actual} values, model expects {expected}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("model produced an invalid output: {0}")]
    InvalidOutput(String),

    #[error("failed to load model artifact '{path}': {reason}")]
    Artifact { path: String, reason: String },
}

/// Numeric model input, one value per entry of [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: Vec<Decimal>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MlDecision {
    Approve,
    Reject,
}

impl MlDecision {
    pub fn from_bit(bit: u8) -> Self {
        if bit == 1 {
            MlDecision::Approve
        } else {
            MlDecision::Reject
        }
    }

    pub fn as_bit(&self) -> u8 {
        match self {
            MlDecision::Approve => 1,
            MlDecision::Reject => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MlDecision::Approve => "Approved",
            MlDecision::Reject => "Rejected",
        }
    }
}

/// Classifier verdict for one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    pub decision: MlDecision,
    /// Probability of approval in [0, 1].
    pub probability: Probability,
}

/// A trained approval classifier plus the encoders it was fitted with.
///
/// Implementations are loaded once and shared read-only across evaluations.
pub trait ApprovalModel: Send + Sync {
    fn name(&self) -> &str;

    fn encode(&self, profile: &ApplicantProfile) -> Result<FeatureVector, MlError>;

    fn predict(&self, features: &FeatureVector) -> Result<MlPrediction, MlError>;
}

/// Whether the classifier contributed to this evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum MlOutcome {
    Available(MlPrediction),
    Unavailable(MlError),
}

impl MlOutcome {
    pub fn prediction(&self) -> Option<&MlPrediction> {
        match self {
            MlOutcome::Available(prediction) => Some(prediction),
            MlOutcome::Unavailable(_) => None,
        }
    }
}

/// Encode and score the profile, degrading to `Unavailable` on any failure.
pub fn assess(model: Option<&dyn ApprovalModel>, profile: &ApplicantProfile) -> MlOutcome {
    let Some(model) = model else {
        return MlOutcome::Unavailable(MlError::NotLoaded);
    };

    let scored = model
        .encode(profile)
        .and_then(|features| model.predict(&features))
        .and_then(check_probability);

    match scored {
        Ok(prediction) => MlOutcome::Available(prediction),
        Err(err) => {
            warn!(model = model.name(), error = %err, "ML adjustment skipped");
            MlOutcome::Unavailable(err)
        }
    }
}

fn check_probability(prediction: MlPrediction) -> Result<MlPrediction, MlError> {
    if prediction.probability < Decimal::ZERO || prediction.probability > Decimal::ONE {
        return Err(MlError::InvalidOutput(format!(
            "probability {} outside [0, 1]",
            prediction.probability
        )));
    }
    Ok(prediction)
}
