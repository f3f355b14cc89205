use serde::{Deserialize, Serialize};

/// vCard syntax version targeted by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VCardVersion {
    /// vCard 3.0 (RFC 2426).
    #[serde(rename = "3.0")]
    V3,
    /// vCard 4.0 (RFC 6350).
    #[serde(rename = "4.0")]
    V4,
}

impl VCardVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3 => "3.0",
            Self::V4 => "4.0",
        }
    }

    /// Parses a VERSION property value.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim() {
            "3.0" => Some(Self::V3),
            "4.0" => Some(Self::V4),
            _ => None,
        }
    }
}

impl Default for VCardVersion {
    fn default() -> Self {
        Self::V4
    }
}

impl std::fmt::Display for VCardVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_round_trip() {
        assert_eq!(VCardVersion::from_str_opt("4.0"), Some(VCardVersion::V4));
        assert_eq!(VCardVersion::V3.as_str(), "3.0");
        assert_eq!(VCardVersion::from_str_opt("2.1"), None);
    }
}
