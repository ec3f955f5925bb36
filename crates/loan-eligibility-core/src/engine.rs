//! Evaluation entry point.
//!
//! [`EligibilityEngine`] owns the configuration and the optional approval
//! model. It holds no per-request state, so one instance can serve any number
//! of concurrent evaluations behind an `Arc`.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::info;

use crate::config::EngineConfig;
use crate::criteria::evaluate_criteria;
use crate::emi::{emi_to_income_ratio, estimate_emi};
use crate::ml::{self, ApprovalModel, MlError, MlOutcome};
use crate::profile::{normalize, ApplicantProfile};
use crate::result::{compose, EligibilityResult, ScoredApplication};
use crate::scoring::fuse_score;
use crate::types::{with_metadata, ComputationOutput};
use crate::EngineResult;

#[derive(Clone)]
pub struct EligibilityEngine {
    config: EngineConfig,
    model: Option<Arc<dyn ApprovalModel>>,
}

impl fmt::Debug for EligibilityEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EligibilityEngine")
            .field("config", &self.config)
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

impl EligibilityEngine {
    /// Rule-only engine.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            model: None,
        })
    }

    /// Attach a loaded approval model.
    pub fn with_model(mut self, model: Arc<dyn ApprovalModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Build an engine from configuration, loading `model_path` if set.
    /// A model that fails to load leaves the engine rule-only.
    #[cfg(feature = "ml")]
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        let model = config
            .model_path
            .as_ref()
            .and_then(|path| ml::ModelLoader::new().load_optional(path));
        let engine = Self::new(config)?;
        Ok(match model {
            Some(model) => engine.with_model(model),
            None => engine,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.name())
    }

    /// Score one applicant.
    pub fn evaluate(&self, profile: &ApplicantProfile) -> EngineResult<EligibilityResult> {
        self.evaluate_with_outcome(profile).map(|(result, _)| result)
    }

    /// Normalize a raw JSON application, then score it.
    pub fn evaluate_json(&self, raw: &Value) -> EngineResult<EligibilityResult> {
        let profile = normalize(raw)?;
        self.evaluate(&profile)
    }

    /// Score one applicant and wrap the result in the computation envelope.
    /// A skipped ML adjustment appears as a warning, never as an error.
    pub fn assess(
        &self,
        profile: &ApplicantProfile,
    ) -> EngineResult<ComputationOutput<EligibilityResult>> {
        let start = Instant::now();
        let (result, outcome) = self.evaluate_with_outcome(profile)?;

        let mut warnings = Vec::new();
        match &outcome {
            MlOutcome::Available(_) => {}
            MlOutcome::Unavailable(MlError::NotLoaded) => {
                warnings.push("No approval model loaded; score is rule-based only.".to_string());
            }
            MlOutcome::Unavailable(err) => {
                warnings.push(format!("ML adjustment skipped: {err}"));
            }
        }
        if !(300..=900).contains(&profile.cibil_score) {
            warnings.push(format!(
                "CIBIL score {} is outside the conventional 300-900 range.",
                profile.cibil_score
            ));
        }

        let assumptions = serde_json::json!({
            "annual_interest_rate": self.config.annual_interest_rate.to_string(),
            "processing_fee_rate": self.config.processing_fee_rate.to_string(),
            "ml_adjustment_span": self.config.ml_adjustment_span.to_string(),
            "model": self.model_name(),
        });
        let elapsed = start.elapsed().as_micros() as u64;

        Ok(with_metadata(
            "Rule-based eligibility scoring with optional classifier fusion",
            &assumptions,
            warnings,
            elapsed,
            result,
        ))
    }

    fn evaluate_with_outcome(
        &self,
        profile: &ApplicantProfile,
    ) -> EngineResult<(EligibilityResult, MlOutcome)> {
        profile.validate()?;

        let estimated_emi = estimate_emi(
            profile.loan_amount,
            self.config.annual_interest_rate,
            profile.loan_tenure_months,
        )?;
        let emi_ratio =
            emi_to_income_ratio(estimated_emi + profile.emi_existing, profile.monthly_income)?;
        let criteria = evaluate_criteria(profile, estimated_emi)?;
        let base_score = criteria.total_points();

        let outcome = ml::assess(self.model.as_deref(), profile);
        let ml_prediction = outcome.prediction().copied();
        let fused_score = fuse_score(
            base_score,
            ml_prediction.as_ref(),
            self.config.ml_adjustment_span,
        );

        let result = compose(
            ScoredApplication {
                profile,
                estimated_emi,
                emi_ratio,
                criteria,
                base_score,
                fused_score,
                ml_prediction,
            },
            &self.config,
        );

        info!(
            status = result.status.label(),
            score = %result.eligibility_score,
            ml = result.ml_prediction.is_some(),
            "eligibility evaluated"
        );
        Ok((result, outcome))
    }
}
