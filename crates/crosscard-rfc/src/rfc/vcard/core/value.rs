//! vCard value types (RFC 6350 §4).

use chrono::{DateTime, NaiveDate, Utc};

use super::structured::{Address, Organization, StructuredName};

/// A vCard property value.
#[derive(Debug, Clone, PartialEq)]
pub enum VCardValue {
    /// Text value (RFC 6350 §4.1).
    Text(String),

    /// Multi-valued text (comma-separated in source).
    TextList(Vec<String>),

    /// URI value (RFC 6350 §4.2).
    Uri(String),

    /// Calendar date (BDAY, ANNIVERSARY, DEATHDATE).
    Date(NaiveDate),

    /// Timestamp (REV property).
    Timestamp(DateTime<Utc>),

    /// Structured name (N property).
    StructuredName(StructuredName),

    /// Address (ADR property).
    Address(Address),

    /// Organization (ORG property).
    Organization(Organization),

    /// Integer value (RFC 6350 §4.5).
    Integer(i64),

    /// Boolean value (RFC 6350 §4.4).
    Boolean(bool),

    /// Binary data (base64 encoded on the wire).
    Binary(Vec<u8>),

    /// Unknown/extension value (preserved as text).
    Unknown(String),
}

impl VCardValue {
    /// Returns the value as text if applicable.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Unknown(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a URI if applicable.
    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(s) => Some(s),
            _ => None,
        }
    }

    /// Returns text or URI content, the two shapes most properties carry.
    #[must_use]
    pub fn as_text_or_uri(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Uri(s) | Self::Unknown(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a structured name if applicable.
    #[must_use]
    pub fn as_structured_name(&self) -> Option<&StructuredName> {
        match self {
            Self::StructuredName(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the value as an address if applicable.
    #[must_use]
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the value as an organization if applicable.
    #[must_use]
    pub fn as_organization(&self) -> Option<&Organization> {
        match self {
            Self::Organization(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the value as a date if applicable.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the value as a timestamp if applicable.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<String> for VCardValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for VCardValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<StructuredName> for VCardValue {
    fn from(n: StructuredName) -> Self {
        Self::StructuredName(n)
    }
}

impl From<Address> for VCardValue {
    fn from(a: Address) -> Self {
        Self::Address(a)
    }
}

impl From<Organization> for VCardValue {
    fn from(o: Organization) -> Self {
        Self::Organization(o)
    }
}

impl From<NaiveDate> for VCardValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_from_string() {
        let val: VCardValue = "Hello".into();
        assert_eq!(val.as_text(), Some("Hello"));
    }

    #[test]
    fn value_from_structured_name() {
        let name = StructuredName::simple("Doe", "John");
        let val: VCardValue = name.clone().into();
        assert_eq!(val.as_structured_name(), Some(&name));
    }

    #[test]
    fn text_or_uri_covers_both() {
        assert_eq!(
            VCardValue::Uri("tel:+1".into()).as_text_or_uri(),
            Some("tel:+1")
        );
        assert_eq!(VCardValue::Text("x".into()).as_text_or_uri(), Some("x"));
        assert_eq!(VCardValue::Integer(3).as_text_or_uri(), None);
    }
}
