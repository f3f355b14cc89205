//! Typed value objects of the native model's collection properties.
//!
//! Every entity carries [`PropMeta`] (contexts, preference, language, legacy
//! group label), serde-flattened so overlay pointer paths address its fields
//! directly (e.g. `phones/PHONE-1/pref`).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{
    AnniversaryKind, Context, NameComponentKind, ObjectType, PersonalInfoKind, PersonalInfoLevel,
    PhoneFeature, RelationType, ResourceLabel,
};

/// Metadata every property-valued entity may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropMeta {
    /// Usage contexts, as a token→true map.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contexts: BTreeMap<Context, bool>,
    /// Preference among same-field siblings; 1 is most preferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pref: Option<u32>,
    /// Language of this value, when the base value itself is localized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Explicit legacy GROUP label applied to every emitted property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl PropMeta {
    /// Returns metadata with a single context flag set.
    #[must_use]
    pub fn with_context(context: Context) -> Self {
        let mut meta = Self::default();
        meta.contexts.insert(context, true);
        meta
    }
}

/// A structured personal name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    /// Free-text full name (legacy FN).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
    /// Ordered name components (legacy N positions).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<NameComponent>,
}

impl Name {
    /// Creates a name from free text only.
    #[must_use]
    pub fn from_full(full: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Name),
            full: Some(full.into()),
            components: Vec::new(),
        }
    }

    /// Returns whether nothing at all is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full.is_none() && self.components.is_empty()
    }

    /// Joins components of one kind with spaces.
    #[must_use]
    pub fn joined(&self, kind: &NameComponentKind) -> Vec<String> {
        self.components
            .iter()
            .filter(|c| &c.kind == kind)
            .map(|c| c.value.clone())
            .collect()
    }
}

/// One component of a structured name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameComponent {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    pub kind: NameComponentKind,
    pub value: String,
    /// Phonetic rendering of this component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronounce: Option<String>,
}

impl NameComponent {
    #[must_use]
    pub fn new(kind: NameComponentKind, value: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::NameComponent),
            kind,
            value: value.into(),
            pronounce: None,
        }
    }
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    /// Free-text form (legacy LABEL parameter).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_box: Option<String>,
    /// Extended address: apartment, suite, floor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Address {
    /// Creates an empty address with the type marker set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            object_type: Some(ObjectType::Address),
            ..Self::default()
        }
    }

    /// Returns whether every component is absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full.is_none()
            && self.po_box.is_none()
            && self.extended.is_none()
            && self.street.is_none()
            && self.locality.is_none()
            && self.region.is_none()
            && self.postcode.is_none()
            && self.country.is_none()
    }
}

/// A phone number with capability flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    /// Number or tel: URI.
    pub number: String,
    /// Capability flags, as a token→true map.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<PhoneFeature, bool>,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Phone {
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Phone),
            number: number.into(),
            ..Self::default()
        }
    }

    /// Adds a capability flag and returns self.
    #[must_use]
    pub fn with_feature(mut self, feature: PhoneFeature) -> Self {
        self.features.insert(feature, true);
        self
    }
}

/// An email address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    pub address: String,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl EmailAddress {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::EmailAddress),
            address: address.into(),
            meta: PropMeta::default(),
        }
    }
}

/// An online resource: a URI plus a label saying what it points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    pub uri: String,
    pub label: ResourceLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Resource {
    #[must_use]
    pub fn new(label: ResourceLabel, uri: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Resource),
            uri: uri.into(),
            label,
            media_type: None,
            meta: PropMeta::default(),
        }
    }
}

/// An organization the card holder belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Organizational units in decreasing specificity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_as: Option<String>,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Organization {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Organization),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A job title or role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    pub name: String,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Title {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Title),
            name: name.into(),
            meta: PropMeta::default(),
        }
    }
}

/// A free-text note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    pub note: String,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Note {
    #[must_use]
    pub fn new(note: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Note),
            note: note.into(),
            meta: PropMeta::default(),
        }
    }
}

/// A nickname.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nickname {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    pub name: String,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Nickname {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Nickname),
            name: name.into(),
            meta: PropMeta::default(),
        }
    }
}

/// A memorable date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anniversary {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    pub kind: AnniversaryKind,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Anniversary {
    #[must_use]
    pub fn new(kind: AnniversaryKind, date: NaiveDate) -> Self {
        Self {
            object_type: Some(ObjectType::Anniversary),
            kind,
            date,
            meta: PropMeta::default(),
        }
    }
}

/// A personal-information entry: expertise, hobby, or interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    pub kind: PersonalInfoKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<PersonalInfoLevel>,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl PersonalInfo {
    #[must_use]
    pub fn new(kind: PersonalInfoKind, value: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::PersonalInfo),
            kind,
            value: value.into(),
            level: None,
            meta: PropMeta::default(),
        }
    }
}

/// A relation to another entity, identified by URI or by free text.
///
/// `uri` and `text` are mutually exclusive; validation rejects entries with
/// both populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    /// Relationship flags, as a token→true map.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relation: BTreeMap<RelationType, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub meta: PropMeta,
}

impl Relation {
    /// Creates a relation identified by URI.
    #[must_use]
    pub fn to_uri(uri: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Relation),
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Creates a relation identified by free text.
    #[must_use]
    pub fn to_text(text: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Relation),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Adds a relationship flag and returns self.
    #[must_use]
    pub fn with_kind(mut self, kind: RelationType) -> Self {
        self.relation.insert(kind, true);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_flattens_into_entity_json() {
        let mut phone = Phone::new("tel:+1-555-555-5555").with_feature(PhoneFeature::Voice);
        phone.meta.pref = Some(1);
        phone.meta.contexts.insert(Context::Work, true);

        let json = serde_json::to_value(&phone).expect("serializes");
        assert_eq!(json["pref"], 1);
        assert_eq!(json["contexts"]["work"], true);
        assert_eq!(json["features"]["voice"], true);
        assert_eq!(json["@type"], "Phone");
    }

    #[test]
    fn entity_round_trips() {
        let title = Title::new("Research Scientist");
        let json = serde_json::to_string(&title).expect("serializes");
        let back: Title = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, title);
    }

    #[test]
    fn relation_builders_are_exclusive() {
        let rel = Relation::to_uri("urn:uuid:other").with_kind(RelationType::Friend);
        assert!(rel.text.is_none());
        assert_eq!(rel.relation.get(&RelationType::Friend), Some(&true));
    }
}
