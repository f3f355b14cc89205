//! vCard text-syntax serialization (RFC 6350).

mod fold;

pub use fold::fold_line;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::core::{VCard, VCardParameter, VCardProperty, VCardValue};
use crate::rfc::vcard::core::property::names;

/// Serializes vCards to text, one BEGIN/END envelope per record.
#[must_use]
pub fn serialize(cards: &[VCard]) -> String {
    let mut out = String::new();

    for card in cards {
        out.push_str("BEGIN:VCARD\r\n");
        out.push_str(&format!("{}:{}\r\n", names::VERSION, card.version));
        for prop in &card.properties {
            out.push_str(&fold_line(&property_line(prop)));
            out.push_str("\r\n");
        }
        out.push_str("END:VCARD\r\n");
    }

    out
}

/// Renders one content line (unfolded).
#[must_use]
pub fn property_line(prop: &VCardProperty) -> String {
    let mut line = String::new();

    if let Some(group) = &prop.group {
        line.push_str(group);
        line.push('.');
    }
    line.push_str(&prop.name);

    for param in &prop.params {
        line.push(';');
        line.push_str(&encode_parameter(param));
    }

    line.push(':');
    line.push_str(&encode_value(&prop.value));
    line
}

/// Encodes a parameter as `NAME=v1,v2`, quoting and caret-encoding values
/// as needed (RFC 6868).
fn encode_parameter(param: &VCardParameter) -> String {
    let values: Vec<String> = param.values.iter().map(|v| encode_param_value(v)).collect();
    format!("{}={}", param.name, values.join(","))
}

fn encode_param_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => encoded.push_str("^n"),
            '"' => encoded.push_str("^'"),
            '^' => encoded.push_str("^^"),
            _ => encoded.push(c),
        }
    }

    if encoded.contains([',', ';', ':']) {
        format!("\"{encoded}\"")
    } else {
        encoded
    }
}

/// Escapes a text value per RFC 6350 §3.4.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\n' => result.push_str("\\n"),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Joins one structured position, escaping each comma-separated part.
fn encode_component(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| escape_text(p))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_value(value: &VCardValue) -> String {
    match value {
        VCardValue::Text(s) | VCardValue::Unknown(s) => escape_text(s),
        VCardValue::TextList(items) => encode_component(items),
        VCardValue::Uri(u) => u.clone(),
        VCardValue::Date(d) => d.format("%Y%m%d").to_string(),
        VCardValue::Timestamp(t) => t.format("%Y%m%dT%H%M%SZ").to_string(),
        VCardValue::StructuredName(n) => [
            encode_component(&n.family),
            encode_component(&n.given),
            encode_component(&n.additional),
            encode_component(&n.prefixes),
            encode_component(&n.suffixes),
        ]
        .join(";"),
        VCardValue::Address(a) => [
            encode_component(&a.po_box),
            encode_component(&a.extended),
            encode_component(&a.street),
            encode_component(&a.locality),
            encode_component(&a.region),
            encode_component(&a.postal_code),
            encode_component(&a.country),
        ]
        .join(";"),
        VCardValue::Organization(o) => {
            let mut parts = vec![escape_text(&o.name)];
            parts.extend(o.units.iter().map(|u| escape_text(u)));
            parts.join(";")
        }
        VCardValue::Integer(i) => i.to_string(),
        VCardValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        VCardValue::Binary(bytes) => BASE64.encode(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::StructuredName;

    #[test]
    fn serialize_minimal_card() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("FN", "Jane Doe"));
        card.add_property(VCardProperty::text("UID", "urn:uuid:x"));

        let output = serialize(&[card]);
        assert!(output.starts_with("BEGIN:VCARD\r\nVERSION:4.0\r\n"));
        assert!(output.contains("FN:Jane Doe\r\n"));
        assert!(output.ends_with("END:VCARD\r\n"));
    }

    #[test]
    fn escape_special_characters() {
        let line = property_line(&VCardProperty::text("NOTE", "a,b;c\nd"));
        assert_eq!(line, "NOTE:a\\,b\\;c\\nd");
    }

    #[test]
    fn structured_name_positions() {
        let prop = VCardProperty::new(
            "N",
            VCardValue::StructuredName(StructuredName::simple("Doe", "Jane")),
            String::new(),
        );
        assert_eq!(property_line(&prop), "N:Doe;Jane;;;");
    }

    #[test]
    fn parameter_quoting() {
        let prop = VCardProperty::text("ADR", "x")
            .with_param(VCardParameter::new("LABEL", "Main St: rear"));
        assert_eq!(property_line(&prop), "ADR;LABEL=\"Main St: rear\":x");
    }

    #[test]
    fn grouped_property() {
        let prop = VCardProperty::text("TEL", "+1").with_group("item1");
        assert_eq!(property_line(&prop), "item1.TEL:+1");
    }

    #[test]
    fn round_trips_through_parser() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("UID", "urn:uuid:y"));
        card.add_property(
            VCardProperty::text("TITLE", "Ricercatore")
                .with_param(VCardParameter::altid("1"))
                .with_param(VCardParameter::language("it")),
        );

        let text = serialize(&[card.clone()]);
        let reparsed = crate::rfc::vcard::parse::parse(&text).expect("parses back");
        assert_eq!(reparsed.len(), 1);
        let title = reparsed[0].get("TITLE").expect("title present");
        assert_eq!(title.altid(), Some("1"));
        assert_eq!(title.language(), Some("it"));
        assert_eq!(title.as_text(), Some("Ricercatore"));
    }
}
