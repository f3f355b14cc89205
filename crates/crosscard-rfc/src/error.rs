use thiserror::Error;

use crate::rfc::validation::Violations;

/// Conversion and parsing errors.
///
/// `Structural` is fatal for the card being converted; `Validation` carries
/// every violation found in one pass so callers see all problems at once.
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::rfc::vcard::parse::ParseError),

    #[error("Bad format: {0}")]
    BadFormat(String),

    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Validation failed: {0}")]
    Validation(Violations),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML escape error: {0}")]
    XmlEscape(#[from] quick_xml::escape::EscapeError),

    #[error(transparent)]
    Core(#[from] crosscard_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
