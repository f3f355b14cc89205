//! Open-ended enumerations of the native model.
//!
//! Each is a closed set of registered tokens plus an `Extended` escape hatch:
//! comparators and token tables operate on the closed cases, unknown tokens
//! pass through unchanged.

/// Defines an enum of registered tokens with an `Extended(String)` escape
/// hatch, wire-token round-tripping, and string-based serde.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $token:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Escape hatch for tokens outside the registered set.
            Extended(String),
        }

        impl $name {
            /// Returns the wire token for this value.
            #[must_use]
            pub fn as_token(&self) -> &str {
                match self {
                    $(Self::$variant => $token,)+
                    Self::Extended(s) => s.as_str(),
                }
            }

            /// Parses a wire token; unknown tokens become [`Self::Extended`].
            #[must_use]
            pub fn from_token(token: &str) -> Self {
                match token {
                    $($token => Self::$variant,)+
                    other => Self::Extended(other.to_string()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_token())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_token())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let token = <String as serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from_token(&token))
            }
        }
    };
}

open_enum! {
    /// The kind of entity a card represents.
    CardKind {
        Individual => "individual",
        Org => "org",
        Group => "group",
        Location => "location",
        Device => "device",
        Application => "application",
    }
}

open_enum! {
    /// Usage context of a property (the TYPE dimension shared by most
    /// legacy properties).
    Context {
        /// Professional use. Canonical legacy token: `work`.
        Work => "work",
        /// Personal use. Canonical legacy token: `home`.
        Private => "private",
        Other => "other",
    }
}

open_enum! {
    /// Capability of a phone number.
    PhoneFeature {
        Voice => "voice",
        Text => "text",
        Fax => "fax",
        Cell => "cell",
        Video => "video",
        Pager => "pager",
        Textphone => "textphone",
    }
}

open_enum! {
    /// What an online resource points at; recognized labels map to
    /// dedicated legacy properties.
    ResourceLabel {
        Source => "source",
        Photo => "photo",
        Logo => "logo",
        Sound => "sound",
        Url => "url",
        Key => "key",
        ContactUri => "contact-uri",
        FbUrl => "fburl",
        CalAdrUri => "caladruri",
        CalUri => "caluri",
    }
}

open_enum! {
    /// How a related entity relates to the card holder (RFC 6350 §6.6.6
    /// registry).
    RelationType {
        Contact => "contact",
        Acquaintance => "acquaintance",
        Friend => "friend",
        Met => "met",
        CoWorker => "co-worker",
        Colleague => "colleague",
        CoResident => "co-resident",
        Neighbor => "neighbor",
        Child => "child",
        Parent => "parent",
        Sibling => "sibling",
        Spouse => "spouse",
        Kin => "kin",
        Muse => "muse",
        Crush => "crush",
        Date => "date",
        Sweetheart => "sweetheart",
        Me => "me",
        Agent => "agent",
        Emergency => "emergency",
    }
}

open_enum! {
    /// Kind of a personal-information entry (RFC 6715 property family).
    PersonalInfoKind {
        Expertise => "expertise",
        Hobby => "hobby",
        Interest => "interest",
    }
}

open_enum! {
    /// Level attached to a personal-information entry.
    PersonalInfoLevel {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

open_enum! {
    /// Kind of an anniversary.
    AnniversaryKind {
        Birth => "birth",
        Death => "death",
        Wedding => "wedding",
    }
}

open_enum! {
    /// Kind of a structured name component, in legacy N-position terms.
    NameComponentKind {
        Surname => "surname",
        Given => "given",
        Given2 => "given2",
        Title => "title",
        Credential => "credential",
    }
}

open_enum! {
    /// JSContact object type marker, serialized as the `@type` member.
    ObjectType {
        Card => "Card",
        CardGroup => "CardGroup",
        Name => "Name",
        NameComponent => "NameComponent",
        Address => "Address",
        Phone => "Phone",
        EmailAddress => "EmailAddress",
        Resource => "Resource",
        Organization => "Organization",
        Title => "Title",
        Note => "Note",
        Nickname => "Nickname",
        Anniversary => "Anniversary",
        PersonalInfo => "PersonalInfo",
        Relation => "Relation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_token_round_trip() {
        assert_eq!(Context::from_token("work"), Context::Work);
        assert_eq!(Context::Private.as_token(), "private");
    }

    #[test]
    fn unknown_token_passes_through() {
        let label = ResourceLabel::from_token("myres");
        assert_eq!(label, ResourceLabel::Extended("myres".to_string()));
        assert_eq!(label.as_token(), "myres");
    }

    #[test]
    fn serde_as_plain_string() {
        let json = serde_json::to_string(&PhoneFeature::Textphone).expect("serializes");
        assert_eq!(json, "\"textphone\"");
        let back: PhoneFeature = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, PhoneFeature::Textphone);
    }

    #[test]
    fn enum_usable_as_map_key() {
        let mut contexts = std::collections::BTreeMap::new();
        contexts.insert(Context::Work, true);
        contexts.insert(Context::Private, true);
        let json = serde_json::to_string(&contexts).expect("serializes");
        assert_eq!(json, "{\"work\":true,\"private\":true}");
    }
}
