//! xCard read/write (RFC 6351): the XML syntax of the legacy format.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{RfcError, RfcResult};
use crate::rfc::vcard::core::property::names;
use crate::rfc::vcard::core::{
    Address, Organization, StructuredName, VCard, VCardParameter, VCardProperty, VCardValue,
};

const VCARD_NS: &str = "urn:ietf:params:xml:ns:vcard-4.0";

/// Positional children of the N element, in RFC 6351 order.
const N_COMPONENTS: &[&str] = &["surname", "given", "additional", "prefix", "suffix"];

/// Positional children of the ADR element, in RFC 6351 order.
const ADR_COMPONENTS: &[&str] = &[
    "pobox", "ext", "street", "locality", "region", "code", "country",
];

/// Parses an xCard document into records.
///
/// ## Errors
/// Returns an error if the XML is malformed or not an xCard document.
pub fn parse_xml(xml: &str) -> RfcResult<Vec<VCard>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut cards: Vec<VCard> = Vec::new();

    // Per-property accumulation state
    let mut group: Option<String> = None;
    let mut property: Option<PropertyState> = None;
    let mut in_parameters = false;
    let mut param_name: Option<String> = None;
    let mut element_stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local_name = local(e)?;
                handle_start(
                    &local_name,
                    e,
                    &mut cards,
                    &mut group,
                    &mut property,
                    &mut in_parameters,
                    &mut param_name,
                    &mut element_stack,
                )?;
            }
            Ok(Event::Empty(ref e)) => {
                let local_name = local(e)?;
                // An empty element is an open+close with no text.
                handle_start(
                    &local_name,
                    e,
                    &mut cards,
                    &mut group,
                    &mut property,
                    &mut in_parameters,
                    &mut param_name,
                    &mut element_stack,
                )?;
                handle_end(
                    &local_name,
                    &mut cards,
                    &mut group,
                    &mut property,
                    &mut in_parameters,
                    &mut param_name,
                    &mut element_stack,
                );
            }
            Ok(Event::Text(ref t)) => {
                let decoded = reader.decoder().decode(t.as_ref())?;
                let text = quick_xml::escape::unescape(&decoded)?.into_owned();
                if let Some(prop) = &mut property {
                    if in_parameters {
                        if let Some(name) = &param_name {
                            prop.params.push((name.clone(), text));
                        }
                    } else if let Some(tag) = element_stack.last() {
                        prop.cells.push((tag.clone(), text));
                    } else {
                        // Text directly under the property element; treat as text cell.
                        prop.cells.push(("text".to_string(), text));
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = std::str::from_utf8(e.local_name().as_ref())
                    .map_err(|e| RfcError::BadFormat(format!("invalid UTF-8 in xCard: {e}")))?
                    .to_owned();
                handle_end(
                    &local_name,
                    &mut cards,
                    &mut group,
                    &mut property,
                    &mut in_parameters,
                    &mut param_name,
                    &mut element_stack,
                );
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(RfcError::Xml(e)),
        }
        buf.clear();
    }

    Ok(cards)
}

/// Property accumulation state while its element is open.
struct PropertyState {
    name: String,
    /// (parameter name, value) pairs in document order.
    params: Vec<(String, String)>,
    /// (value element tag, text) pairs in document order.
    cells: Vec<(String, String)>,
}

fn local(e: &BytesStart<'_>) -> RfcResult<String> {
    std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_owned)
        .map_err(|e| RfcError::BadFormat(format!("invalid UTF-8 in xCard: {e}")))
}

#[expect(clippy::too_many_arguments)]
fn handle_start(
    local_name: &str,
    e: &BytesStart<'_>,
    cards: &mut Vec<VCard>,
    group: &mut Option<String>,
    property: &mut Option<PropertyState>,
    in_parameters: &mut bool,
    param_name: &mut Option<String>,
    element_stack: &mut Vec<String>,
) -> RfcResult<()> {
    match local_name {
        "vcards" => {}
        "vcard" => cards.push(VCard::new()),
        "group" if property.is_none() => {
            for attr in e.attributes().flatten() {
                if attr.key.as_ref() == b"name" {
                    let value = std::str::from_utf8(&attr.value)
                        .map_err(|e| RfcError::BadFormat(format!("invalid UTF-8 in xCard: {e}")))?;
                    *group = Some(value.to_string());
                }
            }
        }
        "parameters" if property.is_some() => *in_parameters = true,
        _ if *in_parameters => {
            // First level below <parameters> is the parameter name; below
            // that are its value elements (text/integer/...).
            if param_name.is_none() {
                *param_name = Some(local_name.to_ascii_uppercase());
            }
            element_stack.push(local_name.to_string());
        }
        _ if property.is_some() => element_stack.push(local_name.to_string()),
        _ => {
            *property = Some(PropertyState {
                name: local_name.to_ascii_uppercase(),
                params: Vec::new(),
                cells: Vec::new(),
            });
        }
    }
    Ok(())
}

fn handle_end(
    local_name: &str,
    cards: &mut [VCard],
    group: &mut Option<String>,
    property: &mut Option<PropertyState>,
    in_parameters: &mut bool,
    param_name: &mut Option<String>,
    element_stack: &mut Vec<String>,
) {
    match local_name {
        "vcards" | "vcard" => {}
        "group" if property.is_none() => *group = None,
        "parameters" => {
            *in_parameters = false;
            *param_name = None;
        }
        _ if *in_parameters => {
            element_stack.pop();
            if element_stack.is_empty()
                && param_name.as_deref() == Some(&local_name.to_ascii_uppercase())
            {
                *param_name = None;
            }
        }
        _ => {
            if element_stack.is_empty() {
                // Property element closed
                if let Some(state) = property.take()
                    && let Some(card) = cards.last_mut()
                {
                    if state.name == names::VERSION {
                        if let Some((_, text)) = state.cells.first()
                            && let Some(version) =
                                crosscard_core::VCardVersion::from_str_opt(text)
                        {
                            card.version = version;
                        }
                    } else {
                        card.add_property(finish_property(state, group.clone()));
                    }
                }
            } else {
                element_stack.pop();
            }
        }
    }
}

/// Builds a typed property from accumulated parameter and value cells.
fn finish_property(state: PropertyState, group: Option<String>) -> VCardProperty {
    let PropertyState {
        name,
        params: raw_params,
        cells,
    } = state;

    let mut params: Vec<VCardParameter> = Vec::new();
    for (pname, pvalue) in raw_params {
        if let Some(existing) = params.iter_mut().find(|p| p.name == pname) {
            existing.values.push(pvalue);
        } else {
            params.push(VCardParameter::new(pname, pvalue));
        }
    }

    let raw_value = cells
        .iter()
        .map(|(_, text)| text.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let take = |component: &str| -> Vec<String> {
        cells
            .iter()
            .filter(|(tag, _)| tag == component)
            .map(|(_, text)| text.clone())
            .collect()
    };

    let value = match name.as_str() {
        names::N => VCardValue::StructuredName(StructuredName {
            family: take("surname"),
            given: take("given"),
            additional: take("additional"),
            prefixes: take("prefix"),
            suffixes: take("suffix"),
        }),
        names::ADR => VCardValue::Address(Address {
            po_box: take("pobox"),
            extended: take("ext"),
            street: take("street"),
            locality: take("locality"),
            region: take("region"),
            postal_code: take("code"),
            country: take("country"),
        }),
        names::ORG => {
            let mut texts = take("text");
            let org_name = if texts.is_empty() {
                String::new()
            } else {
                texts.remove(0)
            };
            VCardValue::Organization(Organization {
                name: org_name,
                units: texts,
            })
        }
        names::NICKNAME => VCardValue::TextList(take("text")),
        _ => match cells.first() {
            Some((tag, text)) => scalar_value(tag, text),
            None => VCardValue::Text(String::new()),
        },
    };

    VCardProperty {
        group,
        name,
        params,
        value,
        raw_value,
    }
}

fn scalar_value(tag: &str, text: &str) -> VCardValue {
    match tag {
        "uri" => VCardValue::Uri(text.to_string()),
        "date" => crate::rfc::vcard::parse::parse_date(text, 0)
            .map_or_else(|_| VCardValue::Text(text.to_string()), VCardValue::Date),
        "timestamp" | "date-time" => crate::rfc::vcard::parse::parse_timestamp(text, 0)
            .map_or_else(|_| VCardValue::Text(text.to_string()), VCardValue::Timestamp),
        "integer" => text
            .parse::<i64>()
            .map_or_else(|_| VCardValue::Text(text.to_string()), VCardValue::Integer),
        "boolean" => match text {
            "true" | "TRUE" => VCardValue::Boolean(true),
            "false" | "FALSE" => VCardValue::Boolean(false),
            _ => VCardValue::Text(text.to_string()),
        },
        "unknown" => VCardValue::Unknown(text.to_string()),
        _ => VCardValue::Text(text.to_string()),
    }
}

/// Serializes records as an xCard document.
#[must_use]
pub fn write_xml(cards: &[VCard]) -> String {
    let mut out = String::new();
    out.push_str(&format!("<vcards xmlns=\"{VCARD_NS}\">"));

    for card in cards {
        out.push_str("<vcard>");
        out.push_str(&format!(
            "<version><text>{}</text></version>",
            card.version
        ));
        for prop in &card.properties {
            write_property(&mut out, prop);
        }
        out.push_str("</vcard>");
    }

    out.push_str("</vcards>");
    out
}

fn write_property(out: &mut String, prop: &VCardProperty) {
    if let Some(group) = &prop.group {
        out.push_str(&format!("<group name=\"{}\">", escape(group.as_str())));
    }

    let element = prop.name.to_ascii_lowercase();
    out.push_str(&format!("<{element}>"));

    if !prop.params.is_empty() {
        out.push_str("<parameters>");
        for param in &prop.params {
            let pname = param.name.to_ascii_lowercase();
            out.push_str(&format!("<{pname}>"));
            for value in &param.values {
                write_text_element(out, "text", value);
            }
            out.push_str(&format!("</{pname}>"));
        }
        out.push_str("</parameters>");
    }

    write_value(out, &prop.value);

    out.push_str(&format!("</{element}>"));

    if prop.group.is_some() {
        out.push_str("</group>");
    }
}

fn write_value(out: &mut String, value: &VCardValue) {
    match value {
        VCardValue::Text(s) => write_text_element(out, "text", s),
        VCardValue::Unknown(s) => write_text_element(out, "unknown", s),
        VCardValue::TextList(items) => {
            for item in items {
                write_text_element(out, "text", item);
            }
        }
        VCardValue::Uri(u) => write_text_element(out, "uri", u),
        VCardValue::Date(d) => write_text_element(out, "date", &d.format("%Y%m%d").to_string()),
        VCardValue::Timestamp(t) => {
            write_text_element(out, "timestamp", &t.format("%Y%m%dT%H%M%SZ").to_string());
        }
        VCardValue::StructuredName(n) => {
            let positions = [
                &n.family,
                &n.given,
                &n.additional,
                &n.prefixes,
                &n.suffixes,
            ];
            for (tag, parts) in N_COMPONENTS.iter().zip(positions) {
                write_position(out, tag, parts);
            }
        }
        VCardValue::Address(a) => {
            let positions = [
                &a.po_box,
                &a.extended,
                &a.street,
                &a.locality,
                &a.region,
                &a.postal_code,
                &a.country,
            ];
            for (tag, parts) in ADR_COMPONENTS.iter().zip(positions) {
                write_position(out, tag, parts);
            }
        }
        VCardValue::Organization(o) => {
            write_text_element(out, "text", &o.name);
            for unit in &o.units {
                write_text_element(out, "text", unit);
            }
        }
        VCardValue::Integer(i) => write_text_element(out, "integer", &i.to_string()),
        VCardValue::Boolean(b) => {
            write_text_element(out, "boolean", if *b { "true" } else { "false" });
        }
        VCardValue::Binary(bytes) => {
            use base64::Engine as _;
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            write_text_element(out, "uri", &format!("data:;base64,{encoded}"));
        }
    }
}

/// Writes one positional component, emitting an empty element when absent.
fn write_position(out: &mut String, tag: &str, parts: &[String]) {
    if parts.is_empty() {
        out.push_str(&format!("<{tag}/>"));
        return;
    }
    for part in parts {
        write_text_element(out, tag, part);
    }
}

fn write_text_element(out: &mut String, tag: &str, text: &str) {
    out.push_str(&format!("<{tag}>{}</{tag}>", escape(text)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::VCardParameter;

    #[test]
    fn write_then_parse_round_trip() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("FN", "J. Doe"));
        card.add_property(VCardProperty::uri("UID", "urn:uuid:abc"));
        card.add_property(
            VCardProperty::uri("TEL", "tel:+1-555-555-5555")
                .with_param(VCardParameter::type_multi(vec![
                    "home".into(),
                    "voice".into(),
                ]))
                .with_param(VCardParameter::pref(1)),
        );

        let xml = write_xml(std::slice::from_ref(&card));
        assert!(xml.contains("urn:ietf:params:xml:ns:vcard-4.0"));

        let parsed = parse_xml(&xml).expect("parses");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].formatted_name(), Some("J. Doe"));
        let tel = parsed[0].get("TEL").expect("tel present");
        assert_eq!(tel.type_tokens(), vec!["home", "voice"]);
        assert_eq!(tel.pref(), Some(1));
        assert_eq!(tel.value.as_uri(), Some("tel:+1-555-555-5555"));
    }

    #[test]
    fn structured_name_round_trip() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::new(
            "N",
            VCardValue::StructuredName(StructuredName::simple("Doe", "Jane")),
            String::new(),
        ));

        let xml = write_xml(std::slice::from_ref(&card));
        let parsed = parse_xml(&xml).expect("parses");
        let n = parsed[0]
            .get("N")
            .and_then(|p| p.value.as_structured_name())
            .expect("structured name");
        assert_eq!(n.family, vec!["Doe"]);
        assert_eq!(n.given, vec!["Jane"]);
    }

    #[test]
    fn grouped_property_round_trip() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("NOTE", "hi").with_group("item1"));

        let xml = write_xml(std::slice::from_ref(&card));
        let parsed = parse_xml(&xml).expect("parses");
        assert_eq!(parsed[0].properties[0].group.as_deref(), Some("item1"));
    }

    #[test]
    fn empty_input_yields_no_cards() {
        let parsed = parse_xml("<vcards xmlns=\"urn:ietf:params:xml:ns:vcard-4.0\"/>")
            .expect("parses");
        assert!(parsed.is_empty());
    }
}
