use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::emi::DEFAULT_ANNUAL_RATE;
use crate::error::EligibilityError;
use crate::scoring::{DEFAULT_ML_ADJUSTMENT_SPAN, MAX_SCORE};
use crate::types::{Rate, Score};
use crate::EngineResult;

/// Tunables for the eligibility engine. Every field has a default, so an
/// empty config file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Nominal annual rate used for the EMI estimate.
    pub annual_interest_rate: Rate,
    /// One-off fee charged on the loan amount.
    pub processing_fee_rate: Rate,
    /// Maximum points the classifier may add or remove.
    pub ml_adjustment_span: Score,
    /// Optional approval model artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            annual_interest_rate: DEFAULT_ANNUAL_RATE,
            processing_fee_rate: dec!(0.01),
            ml_adjustment_span: DEFAULT_ML_ADJUSTMENT_SPAN,
            model_path: None,
        }
    }
}

impl EngineConfig {
    /// Parse YAML (or JSON, which YAML accepts) and validate.
    pub fn from_yaml_str(contents: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            EligibilityError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.annual_interest_rate < Decimal::ZERO {
            return Err(EligibilityError::Config(
                "annual_interest_rate cannot be negative".into(),
            ));
        }
        if self.annual_interest_rate > Decimal::ONE {
            return Err(EligibilityError::Config(
                "annual_interest_rate is a decimal fraction and must be <= 1".into(),
            ));
        }
        if self.processing_fee_rate < Decimal::ZERO || self.processing_fee_rate > Decimal::ONE {
            return Err(EligibilityError::Config(
                "processing_fee_rate must be in [0, 1]".into(),
            ));
        }
        if self.ml_adjustment_span <= Decimal::ZERO || self.ml_adjustment_span > MAX_SCORE {
            return Err(EligibilityError::Config(
                "ml_adjustment_span must be in (0, 100]".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.annual_interest_rate, dec!(0.12));
        assert_eq!(config.processing_fee_rate, dec!(0.01));
        assert_eq!(config.ml_adjustment_span, dec!(20));
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_yaml_overrides() {
        let config = EngineConfig::from_yaml_str(
            "annual_interest_rate: 0.105\nmodel_path: models/loan_model.json\n",
        )
        .unwrap();
        assert_eq!(config.annual_interest_rate, dec!(0.105));
        assert_eq!(config.model_path, Some(PathBuf::from("models/loan_model.json")));
        assert_eq!(config.ml_adjustment_span, dec!(20));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_yaml_str("interest: 0.1\n").unwrap_err();
        assert!(matches!(err, EligibilityError::Config(_)));
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(EngineConfig::from_yaml_str("annual_interest_rate: -0.01\n").is_err());
    }

    #[test]
    fn test_percentage_style_rates_rejected() {
        assert!(EngineConfig::from_yaml_str("annual_interest_rate: 12\n").is_err());
        assert!(EngineConfig::from_yaml_str("processing_fee_rate: 1.5\n").is_err());
        assert!(EngineConfig::from_yaml_str("annual_interest_rate: 1\n").is_ok());
    }

    #[test]
    fn test_span_out_of_range_rejected() {
        assert!(EngineConfig::from_yaml_str("ml_adjustment_span: 0\n").is_err());
        assert!(EngineConfig::from_yaml_str("ml_adjustment_span: 150\n").is_err());
    }
}
