//! Localization resolution: expanding and contracting the per-language
//! override overlay against the base object graph.
//!
//! `resolve` materializes one language as a full card
//! (deep-copy-and-patch); `extract_overlay` is the dual, a structural diff
//! producing overlay entries from two card variants.

use serde_json::{Map, Value};

use super::card::Card;
use super::pointer;
use crate::error::{RfcError, RfcResult};
use crate::rfc::validation::{Violation, Violations};

/// Materializes the card variant for one language.
///
/// Every override registered under `language` is applied to a deep copy of
/// the base graph; the result carries the requested language tag and no
/// overlay.
///
/// ## Errors
/// Returns [`RfcError::Validation`] listing every pointer that does not
/// resolve or whose override type mismatches; unrelated pointers are still
/// applied before the error is built.
pub fn resolve(base: &Card, language: &str) -> RfcResult<Card> {
    let (card, violations) = resolve_collect(base, language)?;
    if violations.is_empty() {
        Ok(card)
    } else {
        Err(RfcError::Validation(Violations(violations)))
    }
}

/// Like [`resolve`], but returns the materialized card together with the
/// violations instead of failing, so callers can decide severity.
///
/// ## Errors
/// Returns an error only if the card cannot be re-read after patching,
/// which indicates a bug rather than bad overlay data.
pub fn resolve_collect(base: &Card, language: &str) -> RfcResult<(Card, Vec<Violation>)> {
    let mut root = serde_json::to_value(base)?;
    if let Value::Object(map) = &mut root {
        map.remove("localizations");
        map.insert(
            "language".to_string(),
            Value::String(language.to_string()),
        );
    }

    let Some(entries) = base.localizations.get(language) else {
        let card = serde_json::from_value(root)?;
        return Ok((card, Vec::new()));
    };

    let mut violations = Vec::new();
    let mut applied: Vec<(&String, &Value)> = Vec::new();

    for (path, value) in entries {
        match pointer::resolve_mut(&mut root, path) {
            None => violations.push(Violation::new(
                path.clone(),
                "localization pointer does not resolve",
            )),
            Some(slot) => {
                if type_compatible(slot, value) {
                    *slot = value.clone();
                    applied.push((path, value));
                } else {
                    violations.push(Violation::new(
                        path.clone(),
                        format!(
                            "override type {} does not match target type {}",
                            type_name(value),
                            type_name(slot)
                        ),
                    ));
                }
            }
        }
    }

    match serde_json::from_value::<Card>(root.clone()) {
        Ok(card) => Ok((card, violations)),
        // A patch produced a shape the model cannot hold; retry one at a
        // time so the offending path is named and the rest still apply.
        Err(_) => Ok(isolate_bad_patches(base, language, &applied, violations)),
    }
}

/// Reapplies patches individually to find which ones break the model.
fn isolate_bad_patches(
    base: &Card,
    language: &str,
    applied: &[(&String, &Value)],
    mut violations: Vec<Violation>,
) -> (Card, Vec<Violation>) {
    let mut pristine = match serde_json::to_value(base) {
        Ok(v) => v,
        Err(_) => return (base.clone(), violations),
    };
    if let Value::Object(map) = &mut pristine {
        map.remove("localizations");
        map.insert(
            "language".to_string(),
            Value::String(language.to_string()),
        );
    }

    let mut good = pristine.clone();
    for &(path, value) in applied {
        let mut trial = pristine.clone();
        if let Some(slot) = pointer::resolve_mut(&mut trial, path) {
            *slot = value.clone();
        }
        if serde_json::from_value::<Card>(trial).is_ok() {
            if let Some(slot) = pointer::resolve_mut(&mut good, path) {
                *slot = value.clone();
            }
        } else {
            violations.push(Violation::new(
                path.clone(),
                "override does not fit the model at this path",
            ));
        }
    }

    let card = serde_json::from_value(good).unwrap_or_else(|_| base.clone());
    (card, violations)
}

/// Checks every overlay entry of every language without materializing.
#[must_use]
pub fn check_overlay(card: &Card) -> Vec<Violation> {
    let mut violations = Vec::new();
    for language in card.localizations.keys() {
        match resolve_collect(card, language) {
            Ok((_, mut found)) => violations.append(&mut found),
            Err(e) => violations.push(Violation::new(
                format!("localizations/{language}"),
                e.to_string(),
            )),
        }
    }
    violations
}

/// Structural diff of two card variants: one `(path, value)` entry per
/// differing leaf or differing sub-object, suitable for the overlay.
#[must_use]
pub fn extract_overlay(localized: &Value, base: &Value, prefix: &str) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    diff(localized, base, prefix, &mut out);
    out
}

fn diff(localized: &Value, base: &Value, path: &str, out: &mut Vec<(String, Value)>) {
    if localized == base {
        return;
    }

    match (localized, base) {
        (Value::Object(l), Value::Object(b)) => {
            // A variant that dropped keys cannot be expressed as per-key
            // overrides; replace the whole object.
            if b.keys().any(|k| !l.contains_key(k)) {
                out.push((path.to_string(), localized.clone()));
                return;
            }
            for (key, lv) in l {
                let child = join(path, key);
                match b.get(key) {
                    Some(bv) => diff(lv, bv, &child, out),
                    None => out.push((child, lv.clone())),
                }
            }
        }
        (Value::Array(l), Value::Array(b)) if l.len() == b.len() => {
            for (i, (lv, bv)) in l.iter().zip(b).enumerate() {
                diff(lv, bv, &join(path, &i.to_string()), out);
            }
        }
        _ => out.push((path.to_string(), localized.clone())),
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}/{segment}")
    }
}

/// Structural type compatibility between a target value and its override.
///
/// Scalars must agree on JSON kind; objects must agree on their `@type`
/// marker when both carry one.
fn type_compatible(target: &Value, override_value: &Value) -> bool {
    match (target, override_value) {
        (Value::Object(a), Value::Object(b)) => match (object_type(a), object_type(b)) {
            (Some(x), Some(y)) => x == y,
            _ => true,
        },
        (Value::Array(_), Value::Array(_))
        | (Value::String(_), Value::String(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Null, _)
        | (_, Value::Null) => true,
        _ => false,
    }
}

fn object_type(map: &Map<String, Value>) -> Option<&str> {
    map.get("@type").and_then(Value::as_str)
}

fn type_name(value: &Value) -> String {
    match value {
        // Report the model type when the marker is present.
        Value::Object(map) => object_type(map).unwrap_or("object").to_string(),
        Value::Array(_) => "array".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::jscontact::properties::{Address, Title};
    use serde_json::json;

    fn base_card() -> Card {
        let mut card = Card::new("urn:uuid:c1");
        let mut adr = Address::new();
        adr.locality = Some("Turin".to_string());
        adr.street = Some("Via Roma".to_string());
        card.addresses.insert("ADR-1".to_string(), adr);
        card.titles
            .insert("TITLE-1".to_string(), Title::new("Research Scientist"));
        card
    }

    #[test]
    fn resolve_applies_scalar_override() {
        let mut card = base_card();
        card.add_localization("it", "addresses/ADR-1/locality", json!("Torino"));

        let localized = resolve(&card, "it").expect("resolves");
        assert_eq!(localized.language.as_deref(), Some("it"));
        assert!(localized.localizations.is_empty());
        assert_eq!(
            localized.addresses["ADR-1"].locality.as_deref(),
            Some("Torino")
        );
        // Base card untouched
        assert_eq!(card.addresses["ADR-1"].locality.as_deref(), Some("Turin"));
    }

    #[test]
    fn resolve_applies_whole_object_override() {
        let mut card = base_card();
        let mut replacement = Address::new();
        replacement.locality = Some("Roma".to_string());
        card.add_localization(
            "it",
            "addresses/ADR-1",
            serde_json::to_value(&replacement).expect("serializes"),
        );

        let localized = resolve(&card, "it").expect("resolves");
        assert_eq!(
            localized.addresses["ADR-1"].locality.as_deref(),
            Some("Roma")
        );
        assert!(localized.addresses["ADR-1"].street.is_none());
    }

    #[test]
    fn mismatched_override_type_names_path() {
        let mut card = base_card();
        // Address target, Title override: rejected by the @type markers.
        card.add_localization(
            "it",
            "addresses/ADR-1",
            serde_json::to_value(Title::new("Ricercatore")).expect("serializes"),
        );
        card.add_localization("it", "titles/TITLE-1/name", json!("Ricercatore"));

        let (localized, violations) = resolve_collect(&card, "it").expect("collects");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "addresses/ADR-1");
        // The unrelated override still applied.
        assert_eq!(localized.titles["TITLE-1"].name, "Ricercatore");
    }

    #[test]
    fn scalar_kind_mismatch_is_violation() {
        let mut card = base_card();
        card.add_localization("it", "addresses/ADR-1/locality", json!(42));

        let (_, violations) = resolve_collect(&card, "it").expect("collects");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("number"));
    }

    #[test]
    fn dangling_pointer_is_violation() {
        let mut card = base_card();
        card.add_localization("it", "addresses/ADR-9/locality", json!("Torino"));

        let (_, violations) = resolve_collect(&card, "it").expect("collects");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "addresses/ADR-9/locality");
    }

    #[test]
    fn extract_overlay_emits_differing_leaves() {
        let base = json!({"locality": "Turin", "street": "Via Roma"});
        let localized = json!({"locality": "Torino", "street": "Via Roma"});

        let entries = extract_overlay(&localized, &base, "addresses/ADR-1");
        assert_eq!(
            entries,
            vec![("addresses/ADR-1/locality".to_string(), json!("Torino"))]
        );
    }

    #[test]
    fn extract_overlay_replaces_object_on_dropped_keys() {
        let base = json!({"locality": "Turin", "street": "Via Roma"});
        let localized = json!({"locality": "Torino"});

        let entries = extract_overlay(&localized, &base, "addresses/ADR-1");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "addresses/ADR-1");
        assert_eq!(entries[0].1, localized);
    }

    #[test]
    fn extract_overlay_descends_arrays_of_equal_length() {
        let base = json!({"components": [{"kind": "given", "value": "Mario"}]});
        let localized = json!({"components": [{"kind": "given", "value": "マリオ"}]});

        let entries = extract_overlay(&localized, &base, "name");
        assert_eq!(
            entries,
            vec![("name/components/0/value".to_string(), json!("マリオ"))]
        );
    }
}
