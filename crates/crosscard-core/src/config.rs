use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::types::VCardVersion;

/// Immutable conversion options.
///
/// A single `ConversionConfig` can be shared across any number of conversion
/// calls; nothing in the engine mutates it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Target vCard syntax version for native→legacy conversion.
    pub version: VCardVersion,
    /// Validate the native card before converting; a card with violations
    /// aborts the conversion and reports every violation in one pass.
    pub validate_input: bool,
    /// Emit a PRODID property when the card carries no product identifier.
    pub auto_prod_id: bool,
    /// Language that wins ties when ordering alternate representations.
    pub default_language: Option<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            version: VCardVersion::V4,
            validate_input: true,
            auto_prod_id: true,
            default_language: None,
        }
    }
}

impl ConversionConfig {
    /// Returns a configuration with validation and PRODID generation turned
    /// off, useful for lossless passthrough pipelines.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            validate_input: false,
            auto_prod_id: false,
            ..Self::default()
        }
    }

    /// Sets the default language used by the alternate-id comparator.
    #[must_use]
    pub fn with_default_language(mut self, tag: impl Into<String>) -> Self {
        self.default_language = Some(tag.into());
        self
    }

    /// Sets the target vCard version.
    #[must_use]
    pub fn with_version(mut self, version: VCardVersion) -> Self {
        self.version = version;
        self
    }

    /// ## Errors
    /// Returns an error if the default language is present but empty.
    pub fn check(&self) -> CoreResult<()> {
        if let Some(tag) = &self.default_language
            && tag.trim().is_empty()
        {
            return Err(CoreError::InvalidConfiguration(
                "default_language must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_v4() {
        let config = ConversionConfig::default();
        assert_eq!(config.version, VCardVersion::V4);
        assert!(config.validate_input);
    }

    #[test]
    fn empty_default_language_rejected() {
        let config = ConversionConfig::default().with_default_language("  ");
        assert!(config.check().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ConversionConfig =
            serde_json::from_str(r#"{"default_language": "en"}"#).expect("valid config json");
        assert_eq!(config.default_language.as_deref(), Some("en"));
        assert!(config.auto_prod_id);
    }
}
