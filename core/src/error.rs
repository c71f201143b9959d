use thiserror::Error;

use crate::Language;

/// Errors surfaced by the analysis engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported language `{0}`")]
    UnsupportedLanguage(String),
    #[error("unsupported report format `{0}`")]
    UnsupportedFormat(String),
    #[error("unknown risk level `{0}`")]
    UnsupportedRiskLevel(String),
    #[error("text is empty or contains only whitespace")]
    EmptyInput,
    #[error("pattern for {language} references unknown category `{category}`")]
    UnknownCategory { language: Language, category: String },
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to serialize analysis result: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
