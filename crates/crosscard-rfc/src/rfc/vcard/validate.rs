//! Stand-alone structural validation of legacy records.
//!
//! Used by callers that want to check records without performing a full
//! native conversion.

use std::collections::BTreeMap;

use crosscard_core::VCardVersion;

use super::core::parameter::names as params;
use super::core::property::names;
use super::core::VCard;
use crate::rfc::validation::Violation;

/// Validates each record's structure; the list is empty iff all records
/// are well formed.
#[must_use]
pub fn structural_validate(records: &[VCard]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let at = |suffix: &str| format!("vcard/{index}/{suffix}");

        if record.uid().is_none() {
            violations.push(Violation::new(at(names::UID), "UID property is required"));
        }

        if record.version == VCardVersion::V4 && record.formatted_name().is_none() {
            violations.push(Violation::new(
                at(names::FN),
                "FN property is required in vCard 4.0",
            ));
        }

        for prop in &record.properties {
            if let Some(raw) = prop.get_param_value(params::PREF) {
                let parsed: Option<u32> = raw.parse().ok();
                if !parsed.is_some_and(|v| (1..=100).contains(&v)) {
                    violations.push(Violation::new(
                        at(&prop.name),
                        format!("PREF must be an integer in 1..=100, found {raw}"),
                    ));
                }
            }
        }

        violations.extend(altid_group_violations(record, index));
    }

    violations
}

/// Within one (name, ALTID) group, at most one member may lack LANGUAGE
/// and no two members may share one.
fn altid_group_violations(record: &VCard, index: usize) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen: BTreeMap<(&str, &str), Vec<Option<&str>>> = BTreeMap::new();

    for prop in &record.properties {
        if let Some(altid) = prop.altid() {
            seen.entry((prop.name.as_str(), altid))
                .or_default()
                .push(prop.language());
        }
    }

    for ((name, altid), languages) in seen {
        let missing = languages.iter().filter(|l| l.is_none()).count();
        if missing > 1 {
            violations.push(Violation::new(
                format!("vcard/{index}/{name}"),
                format!("ALTID={altid} group has {missing} members without LANGUAGE"),
            ));
        }

        let mut tags: Vec<&str> = languages.into_iter().flatten().collect();
        tags.sort_unstable();
        let before = tags.len();
        tags.dedup();
        if tags.len() != before {
            violations.push(Violation::new(
                format!("vcard/{index}/{name}"),
                format!("ALTID={altid} group repeats a LANGUAGE tag"),
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::{VCardParameter, VCardProperty};

    fn valid_record() -> VCard {
        let mut record = VCard::new();
        record.add_property(VCardProperty::uri("UID", "urn:uuid:v"));
        record.add_property(VCardProperty::text("FN", "J. Doe"));
        record
    }

    #[test]
    fn well_formed_record_passes() {
        assert!(structural_validate(&[valid_record()]).is_empty());
    }

    #[test]
    fn missing_uid_and_fn_reported() {
        let record = VCard::new();
        let violations = structural_validate(&[record]);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path, "vcard/0/UID");
        assert_eq!(violations[1].path, "vcard/0/FN");
    }

    #[test]
    fn pref_out_of_range_reported() {
        let mut record = valid_record();
        record.add_property(
            VCardProperty::text("TEL", "+1").with_param(VCardParameter::new("PREF", "200")),
        );
        let violations = structural_validate(&[record]);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("200"));
    }

    #[test]
    fn altid_group_with_duplicate_language_reported() {
        let mut record = valid_record();
        for _ in 0..2 {
            record.add_property(
                VCardProperty::text("TITLE", "x")
                    .with_param(VCardParameter::altid("1"))
                    .with_param(VCardParameter::language("it")),
            );
        }
        let violations = structural_validate(&[record]);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("repeats"));
    }
}
