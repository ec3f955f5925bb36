//! Score fusion and the final decision tier.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::ml::{MlDecision, MlPrediction};
use crate::types::Score;

pub const MAX_SCORE: Score = dec!(100);

/// Default ceiling on how far the classifier can move the rule score.
pub const DEFAULT_ML_ADJUSTMENT_SPAN: Score = dec!(20);

/// Combine the rule-based point sum with an optional classifier verdict.
///
/// An approval adds `probability * span`, a rejection subtracts
/// `(1 - probability) * span`. The result is clamped to [0, 100].
pub fn fuse_score(base: Score, prediction: Option<&MlPrediction>, span: Score) -> Score {
    let adjusted = match prediction {
        Some(p) => match p.decision {
            MlDecision::Approve => base + p.probability * span,
            MlDecision::Reject => base - (Decimal::ONE - p.probability) * span,
        },
        None => base,
    };
    let fused = adjusted.clamp(Decimal::ZERO, MAX_SCORE);
    debug!(base = %base, fused = %fused, ml = prediction.is_some(), "score fused");
    fused
}

/// Four terminal outcomes, mapped from the fused score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Approved,
    ConditionallyApproved,
    UnderReview,
    Rejected,
}

impl Decision {
    pub fn from_score(score: Score) -> Self {
        if score >= dec!(80) {
            Decision::Approved
        } else if score >= dec!(60) {
            Decision::ConditionallyApproved
        } else if score >= dec!(40) {
            Decision::UnderReview
        } else {
            Decision::Rejected
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::ConditionallyApproved => "Conditionally Approved",
            Decision::UnderReview => "Under Review",
            Decision::Rejected => "Rejected",
        }
    }

    /// Presentation tag used by front ends to colour the outcome.
    pub fn status_class(&self) -> &'static str {
        match self {
            Decision::Approved => "success",
            Decision::ConditionallyApproved => "warning",
            Decision::UnderReview => "info",
            Decision::Rejected => "danger",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Decision::Approved => "Congratulations! Your loan application is approved.",
            Decision::ConditionallyApproved => {
                "Your loan may be approved with additional documentation or conditions."
            }
            Decision::UnderReview => {
                "Your application requires manual review. Please provide additional documents."
            }
            Decision::Rejected => {
                "Unfortunately, your loan application doesn't meet current criteria."
            }
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
