//! The legacy contact format: one logical model, three wire syntaxes.
//!
//! ## Overview
//!
//! A [`VCard`] is a flat, ordered list of typed properties with parameters
//! (ALTID, PREF, LANGUAGE, TYPE, …). This module is the legacy-format
//! engine: it reads and writes the text (RFC 6350), XML (RFC 6351), and
//! JSON (RFC 7095) serializations of that one model, and offers per-record
//! structural validation.
//!
//! ## Usage
//!
//! ```rust
//! use crosscard_rfc::rfc::vcard;
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:4.0\r\n\
//! UID:urn:uuid:26ac3a38-a208-4b07-8b36-f3b236cbd4a5\r\n\
//! FN:John Doe\r\n\
//! END:VCARD\r\n";
//!
//! let records = vcard::parse_text(input).unwrap();
//! assert_eq!(records[0].formatted_name(), Some("John Doe"));
//! assert_eq!(vcard::write_text(&records).lines().count(), 5);
//! ```

pub mod build;
pub mod core;
pub mod json;
pub mod parse;
pub mod validate;
pub mod xml;

pub use build::serialize;
pub use core::{
    Address, Organization, StructuredName, VCard, VCardParameter, VCardProperty, VCardValue,
};
pub use parse::{ParseError, ParseErrorKind, ParseResult};
pub use validate::structural_validate;

use crate::error::{RfcError, RfcResult};

/// Parses the text syntax; zero records is a fatal bad-format error.
///
/// ## Errors
/// Returns an error on malformed input or when no record is found.
pub fn parse_text(input: &str) -> RfcResult<Vec<VCard>> {
    require_records(parse::parse(input)?)
}

/// Parses the XML syntax (xCard); zero records is a fatal bad-format error.
///
/// ## Errors
/// Returns an error on malformed input or when no record is found.
pub fn parse_xml(input: &str) -> RfcResult<Vec<VCard>> {
    require_records(xml::parse_xml(input)?)
}

/// Parses the JSON syntax (jCard); zero records is a fatal bad-format
/// error.
///
/// ## Errors
/// Returns an error on malformed input or when no record is found.
pub fn parse_json(input: &str) -> RfcResult<Vec<VCard>> {
    require_records(json::parse_json(input)?)
}

/// Writes the text syntax.
#[must_use]
pub fn write_text(records: &[VCard]) -> String {
    build::serialize(records)
}

/// Writes the XML syntax (xCard).
#[must_use]
pub fn write_xml(records: &[VCard]) -> String {
    xml::write_xml(records)
}

/// Writes the JSON syntax (jCard).
#[must_use]
pub fn write_json(records: &[VCard]) -> String {
    json::write_json(records)
}

fn require_records(records: Vec<VCard>) -> RfcResult<Vec<VCard>> {
    if records.is_empty() {
        return Err(RfcError::BadFormat(
            "input contains no vCard records".to_string(),
        ));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_input_is_bad_format() {
        assert!(matches!(parse_text(""), Err(RfcError::BadFormat(_))));
    }

    #[test]
    fn empty_xml_input_is_bad_format() {
        let result = parse_xml("<vcards xmlns=\"urn:ietf:params:xml:ns:vcard-4.0\"/>");
        assert!(matches!(result, Err(RfcError::BadFormat(_))));
    }

    #[test]
    fn text_syntax_round_trip() {
        let input = "\
BEGIN:VCARD\r\n\
VERSION:4.0\r\n\
UID:urn:uuid:26ac3a38-a208-4b07-8b36-f3b236cbd4a5\r\n\
FN:John Doe\r\n\
TITLE;ALTID=1:Research Scientist\r\n\
TITLE;ALTID=1;LANGUAGE=it:Ricercatore\r\n\
END:VCARD\r\n";

        let records = parse_text(input).expect("parses");
        let output = write_text(&records);
        let reparsed = parse_text(&output).expect("reparses");
        assert_eq!(records, reparsed);
    }
}
