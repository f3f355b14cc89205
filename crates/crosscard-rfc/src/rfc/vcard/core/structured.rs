//! Structured vCard values (RFC 6350).
//!
//! These types represent positional property values like N, ADR, and ORG.
//! Components are `Vec<String>` because every position may carry several
//! comma-separated values on the wire.

/// Structured name (N property, RFC 6350 §6.2.2).
///
/// All components are optional per RFC 6350.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredName {
    /// Family names (surnames).
    pub family: Vec<String>,
    /// Given names (first names).
    pub given: Vec<String>,
    /// Additional names (middle names).
    pub additional: Vec<String>,
    /// Honorific prefixes (e.g., "Mr.", "Dr.").
    pub prefixes: Vec<String>,
    /// Honorific suffixes (e.g., "Jr.", "M.D.").
    pub suffixes: Vec<String>,
}

impl StructuredName {
    /// Creates an empty structured name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a structured name with family and given names.
    #[must_use]
    pub fn simple(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: vec![family.into()],
            given: vec![given.into()],
            ..Self::default()
        }
    }

    /// Returns whether the name is empty (all components are empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.family.is_empty()
            && self.given.is_empty()
            && self.additional.is_empty()
            && self.prefixes.is_empty()
            && self.suffixes.is_empty()
    }

    /// Formats as a display name (given + family).
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();
        if !self.given.is_empty() {
            parts.push(self.given.join(" "));
        }
        if !self.family.is_empty() {
            parts.push(self.family.join(" "));
        }
        parts.join(" ")
    }
}

/// Address (ADR property, RFC 6350 §6.3.1).
///
/// All components are optional per RFC 6350.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Post office box.
    pub po_box: Vec<String>,
    /// Extended address (e.g., apartment or suite number).
    pub extended: Vec<String>,
    /// Street address.
    pub street: Vec<String>,
    /// Locality (city).
    pub locality: Vec<String>,
    /// Region (state or province).
    pub region: Vec<String>,
    /// Postal code.
    pub postal_code: Vec<String>,
    /// Country name.
    pub country: Vec<String>,
}

impl Address {
    /// Creates an empty address.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the address is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.po_box.is_empty()
            && self.extended.is_empty()
            && self.street.is_empty()
            && self.locality.is_empty()
            && self.region.is_empty()
            && self.postal_code.is_empty()
            && self.country.is_empty()
    }
}

/// Organization (ORG property, RFC 6350 §6.6.4).
///
/// First value is the organizational name, subsequent values are
/// organizational units in order of decreasing specificity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    /// Organization name.
    pub name: String,
    /// Organizational units (department, division, etc.).
    pub units: Vec<String>,
}

impl Organization {
    /// Creates an organization with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
        }
    }

    /// Creates an organization with name and units.
    #[must_use]
    pub fn with_units(name: impl Into<String>, units: Vec<String>) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }

    /// Returns whether the organization is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_name_simple() {
        let name = StructuredName::simple("Doe", "John");
        assert_eq!(name.display_name(), "John Doe");
    }

    #[test]
    fn structured_name_empty() {
        let name = StructuredName::new();
        assert!(name.is_empty());
    }

    #[test]
    fn organization_with_units() {
        let org = Organization::with_units(
            "Acme Inc.",
            vec!["Engineering".to_string(), "Backend Team".to_string()],
        );
        assert_eq!(org.name, "Acme Inc.");
        assert_eq!(org.units.len(), 2);
    }

    #[test]
    fn address_empty() {
        assert!(Address::new().is_empty());
    }
}
