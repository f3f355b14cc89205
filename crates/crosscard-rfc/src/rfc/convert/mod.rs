//! The bidirectional mapping engine between the native and legacy models.
//!
//! ## Overview
//!
//! - [`to_vcard`] walks every native property and emits legacy properties,
//!   allocating shared ALTIDs across localized variants of one field.
//! - [`from_vcard`] groups legacy properties by name and ALTID and
//!   reconstructs native entries with a localization overlay.
//! - [`card_group_to_vcards`] / [`group_from_vcards`] handle member-linked
//!   record sets.
//!
//! Both directions pass data they have no rule for through losslessly as
//! extensions; nothing is dropped silently.

pub mod order;
pub mod tokens;

mod from_vcard;
mod to_vcard;

#[cfg(test)]
mod tests;

pub use from_vcard::{from_vcard, from_vcards, group_from_vcards};
pub use to_vcard::{card_group_to_vcards, to_vcard};
