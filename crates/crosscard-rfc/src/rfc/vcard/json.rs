//! jCard read/write (RFC 7095): the JSON syntax of the legacy format.
//!
//! A jCard is `["vcard", [[name, params, type, value...], ...]]`; an array of
//! records is also accepted at the top level.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use crosscard_core::VCardVersion;
use serde_json::{Map, Value, json};

use crate::error::{RfcError, RfcResult};
use crate::rfc::vcard::core::property::names;
use crate::rfc::vcard::core::{
    Address, Organization, StructuredName, VCard, VCardParameter, VCardProperty, VCardValue,
};

/// Parses one jCard or a JSON array of jCards.
///
/// ## Errors
/// Returns an error on malformed JSON or a shape that is not a jCard.
pub fn parse_json(input: &str) -> RfcResult<Vec<VCard>> {
    let root: Value = serde_json::from_str(input)?;

    let records: Vec<&Value> = match &root {
        Value::Array(items) if items.first().map(Value::as_str) == Some(Some("vcard")) => {
            vec![&root]
        }
        Value::Array(items) => items.iter().collect(),
        _ => {
            return Err(RfcError::BadFormat(
                "jCard input must be an array".to_string(),
            ));
        }
    };

    records.iter().map(|r| parse_record(r)).collect()
}

/// Serializes records as a JSON array of jCards (or a single jCard).
#[must_use]
pub fn write_json(cards: &[VCard]) -> String {
    let rendered: Vec<Value> = cards.iter().map(render_record).collect();
    let root = match <[Value; 1]>::try_from(rendered) {
        Ok([single]) => single,
        Err(all) => Value::Array(all),
    };
    root.to_string()
}

fn parse_record(value: &Value) -> RfcResult<VCard> {
    let items = value
        .as_array()
        .filter(|a| a.len() == 2 && a[0].as_str() == Some("vcard"))
        .and_then(|a| a[1].as_array())
        .ok_or_else(|| RfcError::BadFormat("not a jCard record".to_string()))?;

    let mut card = VCard::new();

    for item in items {
        let entry = item
            .as_array()
            .filter(|e| e.len() >= 4)
            .ok_or_else(|| RfcError::BadFormat("malformed jCard property".to_string()))?;

        let name = entry[0]
            .as_str()
            .ok_or_else(|| RfcError::BadFormat("jCard property name must be a string".to_string()))?
            .to_ascii_uppercase();

        if name == names::VERSION {
            if let Some(v) = entry[3].as_str().and_then(VCardVersion::from_str_opt) {
                card.version = v;
            }
            continue;
        }

        let (group, params) = parse_params(&entry[1])?;
        let type_name = entry[2].as_str().unwrap_or("unknown");
        let (value, raw) = parse_typed_value(&name, type_name, &entry[3..])?;

        card.add_property(VCardProperty {
            group,
            name,
            params,
            value,
            raw_value: raw,
        });
    }

    Ok(card)
}

fn parse_params(value: &Value) -> RfcResult<(Option<String>, Vec<VCardParameter>)> {
    let obj = value
        .as_object()
        .ok_or_else(|| RfcError::BadFormat("jCard params must be an object".to_string()))?;

    let mut group = None;
    let mut params = Vec::new();

    for (key, val) in obj {
        if key == "group" {
            group = val.as_str().map(String::from);
            continue;
        }

        let values = match val {
            Value::Array(items) => items.iter().map(stringify_scalar).collect(),
            other => vec![stringify_scalar(other)],
        };
        params.push(VCardParameter::multi(key.clone(), values));
    }

    Ok((group, params))
}

fn stringify_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interprets the value cells of a jCard property entry.
fn parse_typed_value(
    name: &str,
    type_name: &str,
    cells: &[Value],
) -> RfcResult<(VCardValue, String)> {
    let first = &cells[0];

    // Structured properties arrive as nested arrays of text.
    if let Value::Array(positions) = first {
        let parts: Vec<Vec<String>> = positions.iter().map(position_strings).collect();
        let joined = parts
            .iter()
            .map(|p| p.join(","))
            .collect::<Vec<_>>()
            .join(";");
        let component = |i: usize| parts.get(i).cloned().unwrap_or_default();

        let value = match name {
            names::N => VCardValue::StructuredName(StructuredName {
                family: component(0),
                given: component(1),
                additional: component(2),
                prefixes: component(3),
                suffixes: component(4),
            }),
            names::ADR => VCardValue::Address(Address {
                po_box: component(0),
                extended: component(1),
                street: component(2),
                locality: component(3),
                region: component(4),
                postal_code: component(5),
                country: component(6),
            }),
            names::ORG => VCardValue::Organization(Organization {
                name: component(0).join(","),
                units: parts.iter().skip(1).map(|p| p.join(",")).collect(),
            }),
            _ => VCardValue::TextList(parts.into_iter().flatten().collect()),
        };
        return Ok((value, joined));
    }

    // Multiple scalar cells form a text list (e.g. NICKNAME).
    if cells.len() > 1 {
        let items: Vec<String> = cells.iter().map(stringify_scalar).collect();
        let raw = items.join(",");
        return Ok((VCardValue::TextList(items), raw));
    }

    let raw = stringify_scalar(first);
    let value = match type_name {
        "uri" => decode_uri_value(&raw),
        "date" => crate::rfc::vcard::parse::parse_date(&raw, 0)
            .map(VCardValue::Date)
            .unwrap_or_else(|_| VCardValue::Text(raw.clone())),
        "timestamp" | "date-time" => crate::rfc::vcard::parse::parse_timestamp(&raw, 0)
            .map(VCardValue::Timestamp)
            .unwrap_or_else(|_| VCardValue::Text(raw.clone())),
        "integer" => first
            .as_i64()
            .map_or_else(|| VCardValue::Text(raw.clone()), VCardValue::Integer),
        "boolean" => first
            .as_bool()
            .map_or_else(|| VCardValue::Text(raw.clone()), VCardValue::Boolean),
        "unknown" => VCardValue::Unknown(raw.clone()),
        _ => match name {
            names::N => {
                VCardValue::StructuredName(crate::rfc::vcard::parse::parse_structured_name(&raw))
            }
            names::ADR => VCardValue::Address(crate::rfc::vcard::parse::parse_address(&raw)),
            _ => VCardValue::Text(raw.clone()),
        },
    };

    Ok((value, raw))
}

fn position_strings(position: &Value) -> Vec<String> {
    match position {
        Value::Array(items) => items.iter().map(stringify_scalar).collect(),
        Value::String(s) if s.is_empty() => Vec::new(),
        other => vec![stringify_scalar(other)],
    }
}

fn decode_uri_value(raw: &str) -> VCardValue {
    if let Some(b64) = raw
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, b64)| b64)
        && let Ok(bytes) = BASE64.decode(b64)
    {
        return VCardValue::Binary(bytes);
    }
    VCardValue::Uri(raw.to_string())
}

fn render_record(card: &VCard) -> Value {
    let mut entries = vec![json!([
        "version",
        {},
        "text",
        card.version.as_str()
    ])];

    for prop in &card.properties {
        entries.push(render_property(prop));
    }

    json!(["vcard", entries])
}

fn render_property(prop: &VCardProperty) -> Value {
    let mut params = Map::new();
    if let Some(group) = &prop.group {
        params.insert("group".to_string(), Value::String(group.clone()));
    }
    for param in &prop.params {
        let value = match param.values.len() {
            1 => Value::String(param.values[0].clone()),
            _ => Value::Array(
                param
                    .values
                    .iter()
                    .map(|v| Value::String(v.clone()))
                    .collect(),
            ),
        };
        params.insert(param.name.to_ascii_lowercase(), value);
    }

    let name = prop.name.to_ascii_lowercase();
    let (type_name, cells) = render_value(&prop.value);

    let mut entry = vec![
        Value::String(name),
        Value::Object(params),
        Value::String(type_name.to_string()),
    ];
    entry.extend(cells);
    Value::Array(entry)
}

fn render_value(value: &VCardValue) -> (&'static str, Vec<Value>) {
    fn position(parts: &[String]) -> Value {
        match parts.len() {
            0 => Value::String(String::new()),
            1 => Value::String(parts[0].clone()),
            _ => Value::Array(parts.iter().map(|p| Value::String(p.clone())).collect()),
        }
    }

    match value {
        VCardValue::Text(s) | VCardValue::Unknown(s) => ("text", vec![Value::String(s.clone())]),
        VCardValue::TextList(items) => (
            "text",
            items.iter().map(|i| Value::String(i.clone())).collect(),
        ),
        VCardValue::Uri(u) => ("uri", vec![Value::String(u.clone())]),
        VCardValue::Date(d) => (
            "date",
            vec![Value::String(d.format("%Y-%m-%d").to_string())],
        ),
        VCardValue::Timestamp(t) => (
            "timestamp",
            vec![Value::String(t.format("%Y-%m-%dT%H:%M:%SZ").to_string())],
        ),
        VCardValue::StructuredName(n) => (
            "text",
            vec![Value::Array(vec![
                position(&n.family),
                position(&n.given),
                position(&n.additional),
                position(&n.prefixes),
                position(&n.suffixes),
            ])],
        ),
        VCardValue::Address(a) => (
            "text",
            vec![Value::Array(vec![
                position(&a.po_box),
                position(&a.extended),
                position(&a.street),
                position(&a.locality),
                position(&a.region),
                position(&a.postal_code),
                position(&a.country),
            ])],
        ),
        VCardValue::Organization(o) => {
            if o.units.is_empty() {
                ("text", vec![Value::String(o.name.clone())])
            } else {
                let mut positions = vec![Value::String(o.name.clone())];
                positions.extend(o.units.iter().map(|u| Value::String(u.clone())));
                ("text", vec![Value::Array(positions)])
            }
        }
        VCardValue::Integer(i) => ("integer", vec![json!(i)]),
        VCardValue::Boolean(b) => ("boolean", vec![json!(b)]),
        VCardValue::Binary(bytes) => (
            "uri",
            vec![Value::String(format!("data:;base64,{}", BASE64.encode(bytes)))],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_jcard() {
        let input = r#"["vcard", [
            ["version", {}, "text", "4.0"],
            ["fn", {}, "text", "J. Doe"],
            ["uid", {}, "uri", "urn:uuid:abc"]
        ]]"#;
        let cards = parse_json(input).expect("parses");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].formatted_name(), Some("J. Doe"));
        assert_eq!(cards[0].uid(), Some("urn:uuid:abc"));
    }

    #[test]
    fn parse_structured_name_positions() {
        let input = r#"["vcard", [
            ["version", {}, "text", "4.0"],
            ["n", {}, "text", ["Doe", "Jane", "", "", ""]]
        ]]"#;
        let cards = parse_json(input).expect("parses");
        let n = cards[0]
            .get("N")
            .and_then(|p| p.value.as_structured_name())
            .expect("structured name");
        assert_eq!(n.family, vec!["Doe"]);
        assert_eq!(n.given, vec!["Jane"]);
        assert!(n.additional.is_empty());
    }

    #[test]
    fn params_round_trip() {
        let input = r#"["vcard", [
            ["version", {}, "text", "4.0"],
            ["tel", {"type": ["home", "voice"], "pref": "1", "group": "item1"},
             "uri", "tel:+1-555-555-5555"]
        ]]"#;
        let cards = parse_json(input).expect("parses");
        let tel = cards[0].get("TEL").expect("tel present");
        assert_eq!(tel.group.as_deref(), Some("item1"));
        assert!(tel.has_type("voice"));
        assert_eq!(tel.pref(), Some(1));

        let reparsed = parse_json(&write_json(&cards)).expect("round trips");
        let tel2 = reparsed[0].get("TEL").expect("tel present");
        assert_eq!(tel2.type_tokens(), vec!["home", "voice"]);
        assert_eq!(tel2.group.as_deref(), Some("item1"));
    }

    #[test]
    fn write_multiple_as_array() {
        let cards = vec![VCard::new(), VCard::new()];
        let out = write_json(&cards);
        let parsed = parse_json(&out).expect("parses");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn non_array_rejected() {
        assert!(parse_json("{}").is_err());
    }
}
