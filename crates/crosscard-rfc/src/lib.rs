//! crosscard: conversion between the JSON-native contact model (JSContact)
//! and the legacy line/parameter contact model (vCard).
//!
//! The engine is a pure, synchronous, in-memory transform: no I/O, no
//! shared mutable state, configuration is an immutable value object.
//!
//! ## Usage
//!
//! ```rust
//! use crosscard_core::ConversionConfig;
//! use crosscard_rfc::rfc::convert::{from_vcard, to_vcard};
//! use crosscard_rfc::rfc::jscontact::{Card, Title};
//! use crosscard_rfc::rfc::vcard;
//!
//! let mut card = Card::new("urn:uuid:d2f33844-0b2d-4df6-9e57-8165b5d9ca2b");
//! card.titles
//!     .insert("TITLE-1".to_string(), Title::new("Research Scientist"));
//!
//! let config = ConversionConfig::default();
//! let record = to_vcard(&card, &config).unwrap();
//! let text = vcard::write_text(std::slice::from_ref(&record));
//! assert!(text.contains("TITLE:Research Scientist"));
//!
//! let back = from_vcard(&record, &config).unwrap();
//! assert_eq!(back.uid, card.uid);
//! ```

pub mod error;
pub mod rfc;

pub use error::{RfcError, RfcResult};
