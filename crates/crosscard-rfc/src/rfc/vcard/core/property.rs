//! vCard property types (RFC 6350).

use super::parameter::{VCardParameter, names as params};
use super::value::VCardValue;

/// A vCard property.
///
/// Contains the parsed value along with the original raw value
/// for round-trip fidelity.
#[derive(Debug, Clone, PartialEq)]
pub struct VCardProperty {
    /// Optional property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<VCardParameter>,
    /// Parsed value.
    pub value: VCardValue,
    /// Original raw value string (for round-trip).
    pub raw_value: String,
}

impl VCardProperty {
    /// Creates a property from an already-typed value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: VCardValue, raw_value: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value,
            raw_value: raw_value.into(),
        }
    }

    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value_str = value.into();
        Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: VCardValue::Text(value_str.clone()),
            raw_value: value_str,
        }
    }

    /// Creates a property with a URI value.
    #[must_use]
    pub fn uri(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value_str = value.into();
        Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: VCardValue::Uri(value_str.clone()),
            raw_value: value_str,
        }
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&VCardParameter> {
        let name_upper = name.to_ascii_uppercase();
        self.params.iter().find(|p| p.name == name_upper)
    }

    /// Returns the first value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        let p = self.get_param(name)?;
        p.value()
    }

    /// Returns the ALTID parameter value, if any.
    #[must_use]
    pub fn altid(&self) -> Option<&str> {
        self.get_param_value(params::ALTID)
    }

    /// Returns the LANGUAGE parameter value, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.get_param_value(params::LANGUAGE)
    }

    /// Returns the PREF value if present (1-100, lower is preferred).
    #[must_use]
    pub fn pref(&self) -> Option<u32> {
        self.get_param_value(params::PREF).and_then(|v| v.parse().ok())
    }

    /// Returns the TYPE tokens, flattened across repeated TYPE parameters.
    #[must_use]
    pub fn type_tokens(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.name == params::TYPE)
            .flat_map(|p| p.values.iter().map(String::as_str))
            .collect()
    }

    /// Returns whether this property has the specified TYPE value.
    #[must_use]
    pub fn has_type(&self, type_value: &str) -> bool {
        self.get_param(params::TYPE)
            .is_some_and(|p| p.has_value(type_value))
    }

    /// Returns the value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Adds a parameter to this property.
    pub fn add_param(&mut self, param: VCardParameter) {
        self.params.push(param);
    }

    /// Adds a parameter and returns self, for builder-style assembly.
    #[must_use]
    pub fn with_param(mut self, param: VCardParameter) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the property group and returns self.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Property names used by the conversion engine.
pub mod names {
    // Identification
    pub const FN: &str = "FN";
    pub const N: &str = "N";
    pub const NICKNAME: &str = "NICKNAME";
    pub const PHOTO: &str = "PHOTO";
    pub const BDAY: &str = "BDAY";
    pub const ANNIVERSARY: &str = "ANNIVERSARY";
    /// RFC 6474 extension.
    pub const DEATHDATE: &str = "DEATHDATE";

    // Delivery addressing
    pub const ADR: &str = "ADR";

    // Communications
    pub const TEL: &str = "TEL";
    pub const EMAIL: &str = "EMAIL";

    // Organizational
    pub const TITLE: &str = "TITLE";
    pub const LOGO: &str = "LOGO";
    pub const ORG: &str = "ORG";
    pub const MEMBER: &str = "MEMBER";
    pub const RELATED: &str = "RELATED";

    // Explanatory
    pub const NOTE: &str = "NOTE";
    pub const PRODID: &str = "PRODID";
    pub const REV: &str = "REV";
    pub const SOUND: &str = "SOUND";
    pub const UID: &str = "UID";
    pub const URL: &str = "URL";

    // Security
    pub const KEY: &str = "KEY";

    // Calendar
    pub const FBURL: &str = "FBURL";
    pub const CALADRURI: &str = "CALADRURI";
    pub const CALURI: &str = "CALURI";

    // RFC 8605
    pub const CONTACT_URI: &str = "CONTACT-URI";

    // RFC 6715 (personal information)
    pub const EXPERTISE: &str = "EXPERTISE";
    pub const HOBBY: &str = "HOBBY";
    pub const INTEREST: &str = "INTEREST";

    // General/structural
    pub const BEGIN: &str = "BEGIN";
    pub const END: &str = "END";
    pub const VERSION: &str = "VERSION";
    pub const SOURCE: &str = "SOURCE";
    pub const KIND: &str = "KIND";

    /// Vendor passthrough property for native data with no mapping rule.
    pub const JSPROP: &str = "JSPROP";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_text() {
        let prop = VCardProperty::text("FN", "John Doe");
        assert_eq!(prop.name, "FN");
        assert_eq!(prop.as_text(), Some("John Doe"));
    }

    #[test]
    fn property_param_accessors() {
        let prop = VCardProperty::text("TITLE", "Ricercatore")
            .with_param(VCardParameter::altid("1"))
            .with_param(VCardParameter::language("it"))
            .with_param(VCardParameter::pref(2));

        assert_eq!(prop.altid(), Some("1"));
        assert_eq!(prop.language(), Some("it"));
        assert_eq!(prop.pref(), Some(2));
    }

    #[test]
    fn type_tokens_flatten_repeats() {
        let prop = VCardProperty::text("TEL", "+1-555-555-5555")
            .with_param(VCardParameter::type_multi(vec![
                "home".into(),
                "work".into(),
            ]))
            .with_param(VCardParameter::type_param("voice"));

        assert_eq!(prop.type_tokens(), vec!["home", "work", "voice"]);
        assert!(prop.has_type("VOICE"));
    }
}
