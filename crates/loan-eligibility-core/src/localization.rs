//! Post-composition localization hook.
//!
//! The engine always reasons in English. A [`Translator`] may render the
//! caller-facing strings (status, reasons, recommendation) into another
//! language afterwards; the scored result itself is never touched.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::error::EligibilityError;
use crate::result::EligibilityResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Ta,
    Ml,
    Mr,
    Bn,
    Gu,
    Te,
    Kn,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::En,
        Language::Hi,
        Language::Ta,
        Language::Ml,
        Language::Mr,
        Language::Bn,
        Language::Gu,
        Language::Te,
        Language::Kn,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Ta => "ta",
            Language::Ml => "ml",
            Language::Mr => "mr",
            Language::Bn => "bn",
            Language::Gu => "gu",
            Language::Te => "te",
            Language::Kn => "kn",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Ta => "Tamil",
            Language::Ml => "Malayalam",
            Language::Mr => "Marathi",
            Language::Bn => "Bengali",
            Language::Gu => "Gujarati",
            Language::Te => "Telugu",
            Language::Kn => "Kannada",
        }
    }
}

impl FromStr for Language {
    type Err = EligibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .into_iter()
            .find(|lang| {
                lang.code().eq_ignore_ascii_case(wanted) || lang.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| EligibilityError::invalid("language", format!("Unsupported language '{wanted}'.")))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Renders base-language text into a target language.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, target: Language) -> Result<String, String>;
}

/// Returns every string unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, text: &str, _target: Language) -> Result<String, String> {
        Ok(text.to_string())
    }
}

/// The translatable strings of one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedText {
    pub language: Language,
    pub status: String,
    pub reasons: Vec<String>,
    pub recommendation: String,
}

/// Translate status, reasons and recommendation. English is returned as-is;
/// a failed translation falls back to the English text.
pub fn localize(
    result: &EligibilityResult,
    translator: &dyn Translator,
    language: Language,
) -> LocalizedText {
    let render = |text: &str| -> String {
        if language == Language::En {
            return text.to_string();
        }
        translator.translate(text, language).unwrap_or_else(|e| {
            warn!(language = language.code(), error = %e, "Translation failed, keeping English text");
            text.to_string()
        })
    };

    LocalizedText {
        language,
        status: render(result.status.label()),
        reasons: result.reasons.iter().map(|r| render(r.as_str())).collect(),
        recommendation: render(result.recommendation),
    }
}
