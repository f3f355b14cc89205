//! vCard parameter types (RFC 6350).

/// A vCard parameter.
///
/// Parameters can have multiple values (e.g., TYPE=home,work).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardParameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter values.
    pub values: Vec<String>,
}

impl VCardParameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a parameter with multiple values.
    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Returns whether the parameter has the specified value (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    // --- Convenience constructors ---

    /// Creates a TYPE parameter.
    #[must_use]
    pub fn type_param(value: impl Into<String>) -> Self {
        Self::new(names::TYPE, value)
    }

    /// Creates a TYPE parameter with multiple tokens.
    #[must_use]
    pub fn type_multi(values: Vec<String>) -> Self {
        Self::multi(names::TYPE, values)
    }

    /// Creates a PREF parameter with priority (1-100).
    #[must_use]
    pub fn pref(priority: u32) -> Self {
        Self::new(names::PREF, priority.to_string())
    }

    /// Creates an ALTID parameter for grouping alternate representations.
    #[must_use]
    pub fn altid(id: impl Into<String>) -> Self {
        Self::new(names::ALTID, id)
    }

    /// Creates a LANGUAGE parameter.
    #[must_use]
    pub fn language(tag: impl Into<String>) -> Self {
        Self::new(names::LANGUAGE, tag)
    }

    /// Creates a VALUE parameter specifying the value type.
    #[must_use]
    pub fn value_type(type_name: impl Into<String>) -> Self {
        Self::new(names::VALUE, type_name)
    }

    /// Creates a JSPTR parameter carrying the native-graph path of a
    /// passthrough property.
    #[must_use]
    pub fn jsptr(path: impl Into<String>) -> Self {
        Self::new(names::JSPTR, path)
    }

    /// Creates a SORT-AS parameter for collation.
    #[must_use]
    pub fn sort_as(value: impl Into<String>) -> Self {
        Self::new(names::SORT_AS, value)
    }

    /// Creates a LEVEL parameter (expertise/hobby/interest level).
    #[must_use]
    pub fn level(value: impl Into<String>) -> Self {
        Self::new(names::LEVEL, value)
    }

    /// Creates a MEDIATYPE parameter.
    #[must_use]
    pub fn mediatype(value: impl Into<String>) -> Self {
        Self::new(names::MEDIATYPE, value)
    }
}

/// Parameter names used by the conversion engine.
pub mod names {
    pub const ALTID: &str = "ALTID";
    pub const PREF: &str = "PREF";
    pub const LANGUAGE: &str = "LANGUAGE";
    pub const TYPE: &str = "TYPE";
    pub const VALUE: &str = "VALUE";
    pub const SORT_AS: &str = "SORT-AS";
    pub const LEVEL: &str = "LEVEL";
    pub const MEDIATYPE: &str = "MEDIATYPE";
    pub const ENCODING: &str = "ENCODING";

    /// Vendor parameter carrying the JSON-pointer-style path a passthrough
    /// property originated from.
    pub const JSPTR: &str = "JSPTR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_single_value() {
        let param = VCardParameter::new("type", "home");
        assert_eq!(param.name, "TYPE");
        assert_eq!(param.value(), Some("home"));
    }

    #[test]
    fn parameter_has_value() {
        let param = VCardParameter::multi("TYPE", vec!["home".into(), "work".into()]);
        assert!(param.has_value("home"));
        assert!(param.has_value("HOME"));
        assert!(param.has_value("work"));
        assert!(!param.has_value("cell"));
    }

    #[test]
    fn pref_parameter() {
        let param = VCardParameter::pref(1);
        assert_eq!(param.name, "PREF");
        assert_eq!(param.value(), Some("1"));
    }

    #[test]
    fn jsptr_parameter() {
        let param = VCardParameter::jsptr("addresses/ADR-1/locality");
        assert_eq!(param.name, "JSPTR");
        assert_eq!(param.value(), Some("addresses/ADR-1/locality"));
    }
}
