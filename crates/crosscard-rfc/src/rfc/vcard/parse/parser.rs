//! vCard record assembly: BEGIN/END envelopes and value typing.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use crosscard_core::VCardVersion;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{ContentLine, parse_content_line, split_lines};
use super::values;
use crate::rfc::vcard::core::parameter::names as params;
use crate::rfc::vcard::core::property::names;
use crate::rfc::vcard::core::{VCard, VCardProperty, VCardValue};

/// Property names that carry URI values by default.
const URI_PROPERTIES: &[&str] = &[
    names::UID,
    names::URL,
    names::SOURCE,
    names::PHOTO,
    names::LOGO,
    names::SOUND,
    names::KEY,
    names::FBURL,
    names::CALADRURI,
    names::CALURI,
    names::CONTACT_URI,
    names::MEMBER,
];

/// Parses zero or more vCards from text input.
///
/// ## Errors
/// Returns an error on a malformed envelope, an unsupported version, or a
/// malformed content line.
pub fn parse(input: &str) -> ParseResult<Vec<VCard>> {
    let lines = split_lines(input);
    let mut cards = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !lines[i].eq_ignore_ascii_case("BEGIN:VCARD") {
            return Err(ParseError::new(
                ParseErrorKind::InvalidValue,
                i + 1,
                format!("expected BEGIN:VCARD, found {}", lines[i]),
            ));
        }

        let end = lines[i + 1..]
            .iter()
            .position(|l| l.eq_ignore_ascii_case("END:VCARD"))
            .map(|offset| i + 1 + offset)
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::UnexpectedEof,
                    lines.len(),
                    "unterminated BEGIN:VCARD",
                )
            })?;

        cards.push(parse_record(&lines[i + 1..end], i + 1)?);
        i = end + 1;
    }

    tracing::debug!(count = cards.len(), "parsed vCard records");
    Ok(cards)
}

/// Parses exactly one vCard.
///
/// ## Errors
/// Returns an error if the input holds zero or more than one record.
pub fn parse_single(input: &str) -> ParseResult<VCard> {
    let mut cards = parse(input)?;
    match cards.len() {
        1 => Ok(cards.remove(0)),
        0 => Err(ParseError::new(
            ParseErrorKind::NoRecords,
            0,
            "input contains no vCard records",
        )),
        n => Err(ParseError::new(
            ParseErrorKind::InvalidValue,
            0,
            format!("expected one vCard record, found {n}"),
        )),
    }
}

/// Parses the body lines of one record (between BEGIN and END).
fn parse_record(lines: &[String], first_line_num: usize) -> ParseResult<VCard> {
    let mut card = VCard::new();

    for (offset, line) in lines.iter().enumerate() {
        let line_num = first_line_num + offset + 1;
        let content = parse_content_line(line, line_num)?;

        if content.name == names::VERSION {
            card.version = VCardVersion::from_str_opt(&content.value).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::UnsupportedVersion,
                    line_num,
                    format!("unsupported vCard version: {}", content.value),
                )
            })?;
            continue;
        }

        card.add_property(typed_property(content, line_num)?);
    }

    Ok(card)
}

/// Builds a typed property from a content line.
fn typed_property(content: ContentLine, line_num: usize) -> ParseResult<VCardProperty> {
    let ContentLine {
        group,
        name,
        params: line_params,
        value: raw,
    } = content;

    let value = parse_value(&name, &line_params, &raw, line_num)?;

    Ok(VCardProperty {
        group,
        name,
        params: line_params,
        value,
        raw_value: raw,
    })
}

/// Chooses the value type for a property and parses the raw text into it.
fn parse_value(
    name: &str,
    line_params: &[crate::rfc::vcard::core::VCardParameter],
    raw: &str,
    line_num: usize,
) -> ParseResult<VCardValue> {
    let declared = line_params
        .iter()
        .find(|p| p.name == params::VALUE)
        .and_then(|p| p.value())
        .map(str::to_ascii_lowercase);

    // An explicit VALUE=text wins over the per-name default.
    if declared.as_deref() == Some("text") {
        return Ok(VCardValue::Text(values::unescape_text(raw)));
    }

    // vCard 3.0 inline binary
    let base64_encoded = line_params
        .iter()
        .find(|p| p.name == params::ENCODING)
        .and_then(|p| p.value())
        .is_some_and(|v| v.eq_ignore_ascii_case("b") || v.eq_ignore_ascii_case("base64"));
    if base64_encoded {
        let bytes = BASE64.decode(raw.trim()).map_err(|e| {
            ParseError::invalid_value(line_num, format!("invalid base64 value: {e}"))
        })?;
        return Ok(VCardValue::Binary(bytes));
    }

    let value = match name {
        names::N => VCardValue::StructuredName(values::parse_structured_name(raw)),
        names::ADR => VCardValue::Address(values::parse_address(raw)),
        names::ORG => VCardValue::Organization(values::parse_organization(raw)),
        names::BDAY | names::ANNIVERSARY | names::DEATHDATE => {
            VCardValue::Date(values::parse_date(raw, line_num)?)
        }
        names::REV => VCardValue::Timestamp(values::parse_timestamp(raw, line_num)?),
        names::NICKNAME => VCardValue::TextList(values::split_component(raw)),
        _ if URI_PROPERTIES.contains(&name) => VCardValue::Uri(raw.to_string()),
        names::FN
        | names::TITLE
        | names::NOTE
        | names::KIND
        | names::PRODID
        | names::TEL
        | names::EMAIL
        | names::RELATED
        | names::EXPERTISE
        | names::HOBBY
        | names::INTEREST
        | names::JSPROP => VCardValue::Text(values::unescape_text(raw)),
        _ => VCardValue::Unknown(values::unescape_text(raw)),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "\
BEGIN:VCARD\r\n\
VERSION:4.0\r\n\
UID:urn:uuid:4fbe8971-0bc3-424c-9c26-36c3e1eff6b1\r\n\
FN:J. Doe\r\n\
N:Doe;J.;;;\r\n\
EMAIL;PREF=1:jdoe@example.com\r\n\
TEL;VALUE=uri;TYPE=voice:tel:+1-555-555-5555\r\n\
END:VCARD\r\n";

    #[test]
    fn parse_simple_card() {
        let cards = parse(SIMPLE).expect("parses");
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.version, VCardVersion::V4);
        assert_eq!(card.formatted_name(), Some("J. Doe"));
        assert_eq!(
            card.uid(),
            Some("urn:uuid:4fbe8971-0bc3-424c-9c26-36c3e1eff6b1")
        );
        let n = card.get("N").and_then(|p| p.value.as_structured_name());
        assert_eq!(n.expect("has N").family, vec!["Doe"]);
    }

    #[test]
    fn parse_single_rejects_empty() {
        let err = parse_single("").expect_err("no records");
        assert_eq!(err.kind, ParseErrorKind::NoRecords);
    }

    #[test]
    fn parse_rejects_unterminated() {
        let err = parse("BEGIN:VCARD\r\nFN:X\r\n").expect_err("unterminated");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn parse_rejects_unknown_version() {
        let input = "BEGIN:VCARD\r\nVERSION:2.1\r\nEND:VCARD\r\n";
        let err = parse(input).expect_err("unsupported version");
        assert_eq!(err.kind, ParseErrorKind::UnsupportedVersion);
    }

    #[test]
    fn base64_encoding_param_yields_binary() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nPHOTO;ENCODING=b:aGVsbG8=\r\nEND:VCARD\r\n";
        let cards = parse(input).expect("parses");
        let photo = cards[0].get("PHOTO").expect("has photo");
        assert_eq!(photo.value, VCardValue::Binary(b"hello".to_vec()));
    }

    #[test]
    fn multiple_cards() {
        let two = format!("{SIMPLE}{SIMPLE}");
        assert_eq!(parse(&two).expect("parses").len(), 2);
    }
}
