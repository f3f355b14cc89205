//! The authoritative TYPE token table.
//!
//! One table drives both directions: native context/feature flags to a
//! canonically ordered comma list, and legacy tokens partitioned back into
//! context flags vs feature flags. Tokens outside the table pass through
//! unchanged as extended flags.

use std::collections::BTreeMap;

use crate::rfc::jscontact::{Context, PhoneFeature};

/// Context tokens in canonical emission order. `home` is the canonical
/// legacy token for the native `private` context.
const CONTEXTS: &[(&str, Context)] = &[
    ("home", Context::Private),
    ("work", Context::Work),
    ("other", Context::Other),
];

/// Phone feature tokens in canonical emission order.
const FEATURES: &[(&str, PhoneFeature)] = &[
    ("voice", PhoneFeature::Voice),
    ("text", PhoneFeature::Text),
    ("fax", PhoneFeature::Fax),
    ("cell", PhoneFeature::Cell),
    ("video", PhoneFeature::Video),
    ("pager", PhoneFeature::Pager),
    ("textphone", PhoneFeature::Textphone),
];

/// Returns the legacy TYPE token for a context.
#[must_use]
pub fn context_token(context: &Context) -> &str {
    CONTEXTS
        .iter()
        .find(|(_, c)| c == context)
        .map_or_else(|| context.as_token(), |(token, _)| token)
}

/// Interprets a TYPE token as a context, if it is a registered one.
#[must_use]
pub fn context_from_token(token: &str) -> Option<Context> {
    CONTEXTS
        .iter()
        .find(|(t, _)| token.eq_ignore_ascii_case(t))
        .map(|(_, c)| c.clone())
}

/// Interprets a TYPE token as a phone feature, if it is a registered one.
#[must_use]
pub fn feature_from_token(token: &str) -> Option<PhoneFeature> {
    FEATURES
        .iter()
        .find(|(t, _)| token.eq_ignore_ascii_case(t))
        .map(|(_, f)| f.clone())
}

/// Builds the TYPE token list for an entity, deterministically:
/// registered contexts in table order, extended contexts in lexical order,
/// then registered features in table order, extended features in lexical
/// order.
#[must_use]
pub fn type_tokens(
    contexts: &BTreeMap<Context, bool>,
    features: &BTreeMap<PhoneFeature, bool>,
) -> Vec<String> {
    let mut tokens = Vec::new();

    for (token, context) in CONTEXTS {
        if contexts.get(context) == Some(&true) {
            tokens.push((*token).to_string());
        }
    }
    for (context, set) in contexts {
        if *set && let Context::Extended(token) = context {
            tokens.push(token.clone());
        }
    }

    for (token, feature) in FEATURES {
        if features.get(feature) == Some(&true) {
            tokens.push((*token).to_string());
        }
    }
    for (feature, set) in features {
        if *set && let PhoneFeature::Extended(token) = feature {
            tokens.push(token.clone());
        }
    }

    tokens
}

/// Partitions legacy TYPE tokens into context flags and leftover tokens.
///
/// Leftovers are lowercased; the caller interprets them per property (phone
/// features for TEL, extended contexts elsewhere).
#[must_use]
pub fn partition(tokens: &[&str]) -> (BTreeMap<Context, bool>, Vec<String>) {
    let mut contexts = BTreeMap::new();
    let mut leftovers = Vec::new();

    for token in tokens {
        if let Some(context) = context_from_token(token) {
            contexts.insert(context, true);
        } else {
            leftovers.push(token.to_ascii_lowercase());
        }
    }

    (contexts, leftovers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_stable() {
        let mut contexts = BTreeMap::new();
        contexts.insert(Context::Work, true);
        contexts.insert(Context::Private, true);
        let mut features = BTreeMap::new();
        features.insert(PhoneFeature::Voice, true);

        assert_eq!(type_tokens(&contexts, &features), vec!["home", "work", "voice"]);
    }

    #[test]
    fn extended_tokens_pass_through() {
        let mut contexts = BTreeMap::new();
        contexts.insert(Context::Extended("billing".to_string()), true);
        let features = BTreeMap::new();

        assert_eq!(type_tokens(&contexts, &features), vec!["billing"]);
    }

    #[test]
    fn partition_splits_contexts_from_leftovers() {
        let (contexts, leftovers) = partition(&["HOME", "voice", "textphone", "x-custom"]);
        assert_eq!(contexts.get(&Context::Private), Some(&true));
        assert_eq!(leftovers, vec!["voice", "textphone", "x-custom"]);
    }

    #[test]
    fn private_maps_to_home_token() {
        assert_eq!(context_token(&Context::Private), "home");
        assert_eq!(context_from_token("home"), Some(Context::Private));
    }
}
