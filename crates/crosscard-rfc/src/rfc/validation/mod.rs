//! Native-card validation.
//!
//! Violations are accumulated across the whole card so callers see every
//! problem in one pass; whether a non-empty list is fatal is the caller's
//! (or the configuration's) decision.

use std::fmt;

use crate::rfc::jscontact::{Card, localize};

/// One validation finding, anchored to the path it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Pointer path into the card (empty for card-level findings).
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A list of violations, displayed as one human-readable report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join("; "))
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(list: Vec<Violation>) -> Self {
        Self(list)
    }
}

/// Validates a native card. The card is valid iff the list is empty.
///
/// Checks: required identifier, well-formed localization pointers with
/// type-matching overrides, forbidden-empty values, and mutually exclusive
/// field pairs.
#[must_use]
pub fn validate(card: &Card) -> Vec<Violation> {
    let mut violations = Vec::new();

    if card.uid.trim().is_empty() {
        violations.push(Violation::new("uid", "uid is required and must not be empty"));
    }

    violations.extend(localize::check_overlay(card));

    if let Some(name) = &card.name
        && name.is_empty()
    {
        violations.push(Violation::new(
            "name",
            "name must have a full text or at least one component",
        ));
    }

    for (id, phone) in &card.phones {
        if phone.number.trim().is_empty() {
            violations.push(Violation::new(
                format!("phones/{id}/number"),
                "phone number must not be empty",
            ));
        }
    }

    for (id, email) in &card.emails {
        if email.address.trim().is_empty() {
            violations.push(Violation::new(
                format!("emails/{id}/address"),
                "email address must not be empty",
            ));
        }
    }

    for (id, resource) in &card.online {
        if resource.uri.trim().is_empty() {
            violations.push(Violation::new(
                format!("online/{id}/uri"),
                "resource uri must not be empty",
            ));
        }
    }

    for (id, org) in &card.organizations {
        if org.name.is_empty() && org.units.is_empty() {
            violations.push(Violation::new(
                format!("organizations/{id}"),
                "organization must have a name or at least one unit",
            ));
        }
    }

    for (id, address) in &card.addresses {
        if address.is_empty() {
            violations.push(Violation::new(
                format!("addresses/{id}"),
                "address must have at least one component",
            ));
        }
    }

    for (id, relation) in &card.relations {
        match (&relation.uri, &relation.text) {
            (Some(_), Some(_)) => violations.push(Violation::new(
                format!("relations/{id}"),
                "uri and text are mutually exclusive",
            )),
            (None, None) => violations.push(Violation::new(
                format!("relations/{id}"),
                "relation must be identified by uri or text",
            )),
            _ => {}
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::jscontact::{Phone, Relation, Title};
    use serde_json::json;

    #[test]
    fn valid_card_has_no_violations() {
        let mut card = Card::new("urn:uuid:ok");
        card.phones
            .insert("PHONE-1".to_string(), Phone::new("tel:+1"));
        assert!(validate(&card).is_empty());
    }

    #[test]
    fn missing_uid_is_reported() {
        let card = Card::default();
        let violations = validate(&card);
        assert!(violations.iter().any(|v| v.path == "uid"));
    }

    #[test]
    fn exclusive_relation_fields_are_reported() {
        let mut card = Card::new("urn:uuid:x");
        let mut rel = Relation::to_uri("urn:uuid:other");
        rel.text = Some("my friend".to_string());
        card.relations.insert("REL-1".to_string(), rel);

        let violations = validate(&card);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "relations/REL-1");
    }

    #[test]
    fn overlay_problems_surface_with_paths() {
        let mut card = Card::new("urn:uuid:x");
        card.titles
            .insert("TITLE-1".to_string(), Title::new("Scientist"));
        card.add_localization("it", "titles/TITLE-9/name", json!("Ricercatore"));

        let violations = validate(&card);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "titles/TITLE-9/name");
    }

    #[test]
    fn violations_display_joins_findings() {
        let list = Violations(vec![
            Violation::new("uid", "missing"),
            Violation::new("", "card is odd"),
        ]);
        assert_eq!(list.to_string(), "uid: missing; card is odd");
    }
}
