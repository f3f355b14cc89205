//! Core vCard types.

pub mod parameter;
pub mod property;
pub mod structured;
pub mod value;

pub use parameter::VCardParameter;
pub use property::VCardProperty;
pub use structured::{Address, Organization, StructuredName};
pub use value::VCardValue;

use crosscard_core::VCardVersion;

use property::names;

/// A single vCard: a version plus an ordered, flat list of properties.
///
/// Order is significant; the converters rely on same-ALTID variants being
/// contiguous when they emit, and preserve source order when they read.
#[derive(Debug, Clone, PartialEq)]
pub struct VCard {
    /// Syntax version the record was read from or will be written as.
    pub version: VCardVersion,
    /// Properties in order of appearance.
    pub properties: Vec<VCardProperty>,
}

impl VCard {
    /// Creates an empty vCard 4.0 record.
    #[must_use]
    pub fn new() -> Self {
        Self::with_version(VCardVersion::V4)
    }

    /// Creates an empty record targeting the given version.
    #[must_use]
    pub fn with_version(version: VCardVersion) -> Self {
        Self {
            version,
            properties: Vec::new(),
        }
    }

    /// Appends a property.
    pub fn add_property(&mut self, property: VCardProperty) {
        self.properties.push(property);
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VCardProperty> {
        let name_upper = name.to_ascii_uppercase();
        self.properties.iter().find(|p| p.name == name_upper)
    }

    /// Iterates over every property with the given name, in source order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a VCardProperty> {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the UID property value, if any.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.get(names::UID).and_then(|p| p.value.as_text_or_uri())
    }

    /// Returns the formatted name (FN), if any.
    #[must_use]
    pub fn formatted_name(&self) -> Option<&str> {
        self.get(names::FN).and_then(VCardProperty::as_text)
    }
}

impl Default for VCard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_accessor() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::uri("UID", "urn:uuid:1234"));
        assert_eq!(card.uid(), Some("urn:uuid:1234"));
    }

    #[test]
    fn get_all_filters_by_name() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("TEL", "+1"));
        card.add_property(VCardProperty::text("EMAIL", "a@b.c"));
        card.add_property(VCardProperty::text("TEL", "+2"));
        assert_eq!(card.get_all("TEL").count(), 2);
    }
}
