//! Model artifact loader

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::{ApprovalModel, LogisticModel, MlError};

/// Loads approval-model artifacts from disk, once at startup.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelLoader;

impl ModelLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read, parse and validate a logistic model artifact.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LogisticModel, MlError> {
        let path = path.as_ref();
        let artifact_error = |reason: String| MlError::Artifact {
            path: path.display().to_string(),
            reason,
        };

        info!(path = %path.display(), "Loading approval model");

        let contents = fs::read_to_string(path).map_err(|e| artifact_error(e.to_string()))?;
        let model: LogisticModel =
            serde_json::from_str(&contents).map_err(|e| artifact_error(e.to_string()))?;
        model.validate()?;

        info!(
            model = %model.name,
            encoders = model.encoders.len(),
            threshold = %model.threshold,
            "Approval model loaded successfully"
        );
        Ok(model)
    }

    /// Load a model for serving. Failure is reported and the engine runs
    /// rule-only.
    pub fn load_optional<P: AsRef<Path>>(&self, path: P) -> Option<Arc<dyn ApprovalModel>> {
        let path = path.as_ref();
        match self.load(path) {
            Ok(model) => Some(Arc::new(model)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Approval model unavailable, scoring rule-only");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::logistic::tests::ARTIFACT;
    use std::path::PathBuf;

    fn temp_artifact(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "loan-eligibility-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_valid_artifact() {
        let path = temp_artifact("valid", ARTIFACT);
        let model = ModelLoader::new().load(&path).unwrap();
        assert_eq!(model.name, "logit-test");
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_artifact_error() {
        let err = ModelLoader::new()
            .load("/nonexistent/loan_model.json")
            .unwrap_err();
        assert!(matches!(err, MlError::Artifact { .. }));
    }

    #[test]
    fn test_malformed_artifact_degrades_to_none() {
        let path = temp_artifact("malformed", "{ not json");
        assert!(ModelLoader::new().load_optional(&path).is_none());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_optional_returns_shared_model() {
        let path = temp_artifact("shared", ARTIFACT);
        let model = ModelLoader::new().load_optional(&path).unwrap();
        assert_eq!(model.name(), "logit-test");
        fs::remove_file(path).ok();
    }
}
