//! Total orders used when the legacy model must linearize what the native
//! model expresses as parallel localized values.

use std::cmp::Ordering;

use crate::rfc::vcard::core::VCardProperty;

/// Orders two properties that may belong to the same logical field.
///
/// A property without an ALTID sorts before any with one; numeric ALTIDs
/// compare in allocation order; equal ALTIDs tie-break on language with
/// no-language first and the configured default language next.
#[must_use]
pub fn altid_order(
    a: &VCardProperty,
    b: &VCardProperty,
    default_language: Option<&str>,
) -> Ordering {
    match (a.altid(), b.altid()) {
        // Unrelated singleton fields; order does not matter.
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(xi), Ok(yi)) => xi
                .cmp(&yi)
                .then_with(|| language_order(a.language(), b.language(), default_language)),
            // Ids are allocated numerically; anything else falls back to
            // lexical order so the sort stays total.
            _ => x
                .cmp(y)
                .then_with(|| language_order(a.language(), b.language(), default_language)),
        },
    }
}

fn language_order(a: Option<&str>, b: Option<&str>, default_language: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => {
            let x_default = default_language.is_some_and(|d| d.eq_ignore_ascii_case(x));
            let y_default = default_language.is_some_and(|d| d.eq_ignore_ascii_case(y));
            match (x_default, y_default) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        }
    }
}

/// Orders two properties by preference: absent PREF sorts after any present
/// value; present values ascend (1 is most preferred).
#[must_use]
pub fn pref_order(a: &VCardProperty, b: &VCardProperty) -> Ordering {
    pref_value_order(a.pref(), b.pref())
}

/// The same order over bare preference values.
#[must_use]
pub fn pref_value_order(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::{VCardParameter, VCardProperty};

    fn prop(altid: Option<&str>, language: Option<&str>) -> VCardProperty {
        let mut p = VCardProperty::text("TITLE", "x");
        if let Some(id) = altid {
            p.add_param(VCardParameter::altid(id));
        }
        if let Some(tag) = language {
            p.add_param(VCardParameter::language(tag));
        }
        p
    }

    #[test]
    fn missing_altid_sorts_first() {
        let a = prop(None, None);
        let b = prop(Some("1"), None);
        assert_eq!(altid_order(&a, &b, None), Ordering::Less);
        assert_eq!(altid_order(&b, &a, None), Ordering::Greater);
    }

    #[test]
    fn numeric_altids_compare_numerically() {
        let a = prop(Some("2"), None);
        let b = prop(Some("10"), None);
        assert_eq!(altid_order(&a, &b, None), Ordering::Less);
    }

    #[test]
    fn equal_altids_tie_break_on_language() {
        let base = prop(Some("1"), None);
        let it = prop(Some("1"), Some("it"));
        let en = prop(Some("1"), Some("en"));

        assert_eq!(altid_order(&base, &it, None), Ordering::Less);
        assert_eq!(altid_order(&en, &it, Some("en")), Ordering::Less);
        assert_eq!(altid_order(&en, &it, None), Ordering::Equal);
    }

    #[test]
    fn pref_absent_sorts_last() {
        let mut a = VCardProperty::text("TEL", "+1");
        let b = VCardProperty::text("TEL", "+2");
        a.add_param(VCardParameter::pref(1));
        assert_eq!(pref_order(&a, &b), Ordering::Less);
        assert_eq!(pref_order(&b, &a), Ordering::Greater);
    }

    #[test]
    fn pref_present_ascends() {
        assert_eq!(pref_value_order(Some(1), Some(2)), Ordering::Less);
        assert_eq!(pref_value_order(Some(50), Some(50)), Ordering::Equal);
    }
}
