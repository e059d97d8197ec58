//! Error taxonomy for the extraction pipeline.
//!
//! Every stage of the pipeline fails with its own [`ExtractError`] variant so
//! the HTTP layer can tell a bad upload apart from a broken OCR install or a
//! misbehaving completion endpoint. `AuthConfig` is the one startup-only
//! variant: it aborts the process before the server binds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Upload bytes are empty, truncated, or not a recognizable image.
    #[error("could not decode image: {0}")]
    Decode(String),

    /// The OCR binary is missing, crashed, or produced garbage.
    #[error("OCR engine failed: {0}")]
    OcrEngine(String),

    /// OCR ran fine but found no text on the card.
    #[error("OCR produced no usable text")]
    OcrEmpty,

    /// Required credential absent at startup. Fatal.
    #[error("{var} is not set; the completion API requires a credential")]
    AuthConfig { var: &'static str },

    /// The completion request never completed (timeout, refused, DNS).
    #[error("completion request failed: {0}")]
    Transport(String),

    /// The completion endpoint answered, but not usefully.
    #[error("completion endpoint error: {0}")]
    Upstream(String),

    /// The model's reply was not decodable as a JSON object.
    #[error("could not parse completion content as JSON: {0}")]
    SchemaParse(String),

    /// The reply decoded, but a field had a non-string, non-null value.
    #[error("completion JSON failed validation: {0}")]
    SchemaValidation(String),

    /// The contact table could not be created or appended to.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ExtractError {
    /// Short label for the pipeline stage that failed. Returned in error
    /// bodies and attached to tracing events.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::OcrEngine(_) | Self::OcrEmpty => "ocr",
            Self::AuthConfig { .. } => "config",
            Self::Transport(_) | Self::Upstream(_) => "llm",
            Self::SchemaParse(_) | Self::SchemaValidation(_) => "parse",
            Self::Storage(_) => "store",
        }
    }

}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<csv::Error> for ExtractError {
    fn from(e: csv::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
