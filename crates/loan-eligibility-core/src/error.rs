use thiserror::Error;

use crate::ml::MlError;

#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Domain error: {field}: {reason}")]
    Domain { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(#[from] MlError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EligibilityError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        EligibilityError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn domain(field: &str, reason: impl Into<String>) -> Self {
        EligibilityError::Domain {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Request-shape failures: a field is absent, empty or of the wrong type.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EligibilityError::MissingField(_) | EligibilityError::InvalidInput { .. }
        )
    }

    /// Well-typed input that would make a formula undefined.
    pub fn is_domain(&self) -> bool {
        matches!(self, EligibilityError::Domain { .. })
    }
}

impl From<serde_json::Error> for EligibilityError {
    fn from(e: serde_json::Error) -> Self {
        EligibilityError::SerializationError(e.to_string())
    }
}

impl From<serde_yaml::Error> for EligibilityError {
    fn from(e: serde_yaml::Error) -> Self {
        EligibilityError::Config(e.to_string())
    }
}
