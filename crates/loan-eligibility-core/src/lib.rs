pub mod config;
pub mod criteria;
pub mod emi;
pub mod engine;
pub mod error;
pub mod localization;
pub mod ml;
pub mod profile;
pub mod result;
pub mod scoring;
pub mod types;

pub use config::EngineConfig;
pub use engine::EligibilityEngine;
pub use error::EligibilityError;
pub use localization::{localize, IdentityTranslator, Language, LocalizedText, Translator};
pub use profile::{normalize, ApplicantProfile, EmploymentType, IncomeSource};
pub use result::EligibilityResult;
pub use scoring::Decision;
pub use types::*;

/// Standard result type for all eligibility operations
pub type EngineResult<T> = Result<T, EligibilityError>;
