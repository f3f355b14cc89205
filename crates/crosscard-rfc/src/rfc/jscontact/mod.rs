//! The native, JSON-first contact model and its localization machinery.
//!
//! ## Overview
//!
//! A [`Card`] keys every collection property by a caller-chosen id and
//! expresses language variants as a separate overlay
//! (language → pointer path → override). This module owns that model and the
//! two overlay operations the converters build on:
//!
//! - [`localize::resolve`] — materialize one language as a full card
//! - [`localize::extract_overlay`] — diff two variants back into overlay
//!   entries
//!
//! The JSON boundary is plain serde: [`Card`] round-trips byte-stably,
//! including extension payloads.

pub mod card;
pub mod enums;
pub mod localize;
pub mod pointer;
pub mod properties;

pub use card::{Card, CardGroup, OverlayEntries};
pub use enums::{
    AnniversaryKind, CardKind, Context, NameComponentKind, ObjectType, PersonalInfoKind,
    PersonalInfoLevel, PhoneFeature, RelationType, ResourceLabel,
};
pub use properties::{
    Address, Anniversary, EmailAddress, Name, NameComponent, Nickname, Note, Organization,
    PersonalInfo, Phone, PropMeta, Relation, Resource, Title,
};
