use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MlError;

/// Maps a categorical label to the integer code it had at training time.
///
/// Classes are kept sorted, so the code of a label is its position in the
/// sorted class list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, column: &str, label: &str) -> Result<Decimal, MlError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map(|idx| Decimal::from(idx as u64))
            .map_err(|_| MlError::Encoding {
                column: column.to_string(),
                value: label.to_string(),
            })
    }
}

impl From<Vec<String>> for LabelEncoder {
    fn from(classes: Vec<String>) -> Self {
        LabelEncoder::new(classes)
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(encoder: LabelEncoder) -> Self {
        encoder.classes
    }
}
