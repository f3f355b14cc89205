//! The top-level native entities: [`Card`] and [`CardGroup`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::{CardKind, ObjectType, ResourceLabel};
use super::properties::{
    Address, Anniversary, EmailAddress, Name, Nickname, Note, Organization, PersonalInfo, Phone,
    Relation, Resource, Title,
};

/// Overlay entries for one language: pointer path → override value.
pub type OverlayEntries = BTreeMap<String, Value>;

/// A contact card in the native, map-keyed model.
///
/// Collection properties map caller-chosen ids (unique within the card,
/// insertion order irrelevant) to typed values. Two entities are language
/// variants of one logical field iff they are reachable from the same
/// collection key; the legacy converter turns that identity into shared
/// ALTID tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    /// Globally unique identifier. Required.
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CardKind>,
    /// Language of the card's base values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Product identifier of the generating software.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod_id: Option<String>,
    /// Last modification timestamp (legacy REV).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nicknames: BTreeMap<String, Nickname>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub addresses: BTreeMap<String, Address>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub phones: BTreeMap<String, Phone>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub emails: BTreeMap<String, EmailAddress>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub online: BTreeMap<String, Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub organizations: BTreeMap<String, Organization>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub titles: BTreeMap<String, Title>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, Note>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub anniversaries: BTreeMap<String, Anniversary>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub personal_info: BTreeMap<String, PersonalInfo>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<String, Relation>,

    /// Member-uid flags; meaningful for `kind = group`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub members: BTreeMap<String, bool>,

    /// Lossless passthrough bucket: data with no conversion rule, keyed by
    /// the pointer path (or legacy name) it originated from.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Value>,

    /// Per-language override overlay: language tag → (path → value).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localizations: BTreeMap<String, OverlayEntries>,
}

impl Card {
    /// Creates an empty card with the given uid.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            object_type: Some(ObjectType::Card),
            uid: uid.into(),
            ..Self::default()
        }
    }

    /// Creates a card with a freshly generated urn:uuid identifier.
    #[must_use]
    pub fn with_generated_uid() -> Self {
        Self::new(uuid::Uuid::new_v4().urn().to_string())
    }

    /// Builds the minimal card a directory registry (RDAP) entry needs:
    /// identifier, display name, and one reachable address.
    #[must_use]
    pub fn for_registry(
        full_name: impl Into<String>,
        email: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let mut card = Self::with_generated_uid();
        card.kind = Some(CardKind::Individual);
        card.name = Some(Name::from_full(full_name));
        card.emails
            .insert("EMAIL-1".to_string(), EmailAddress::new(email));
        card.online.insert(
            "LINK-1".to_string(),
            Resource::new(ResourceLabel::Url, url),
        );
        card
    }

    /// Registers a localization override.
    pub fn add_localization(
        &mut self,
        language: impl Into<String>,
        path: impl Into<String>,
        value: Value,
    ) {
        self.localizations
            .entry(language.into())
            .or_default()
            .insert(path.into(), value);
    }

    /// Languages with at least one override, in lexical order.
    #[must_use]
    pub fn localization_languages(&self) -> Vec<&str> {
        self.localizations.keys().map(String::as_str).collect()
    }
}

/// A collective (e.g. a family): one main card plus member-uid flags.
///
/// Members are free-standing cards with independent lifecycles; the group
/// only references them by uid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardGroup {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    /// The card describing the group itself.
    pub card: Card,
    /// Member-uid flags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub members: BTreeMap<String, bool>,
}

impl CardGroup {
    /// Creates a group around a main card.
    #[must_use]
    pub fn new(mut card: Card) -> Self {
        card.kind = Some(CardKind::Group);
        Self {
            object_type: Some(ObjectType::CardGroup),
            card,
            members: BTreeMap::new(),
        }
    }

    /// Adds a member by uid and returns self.
    #[must_use]
    pub fn with_member(mut self, uid: impl Into<String>) -> Self {
        self.members.insert(uid.into(), true);
        self
    }
}
