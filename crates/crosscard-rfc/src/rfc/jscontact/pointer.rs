//! Slash-delimited pointers into the native object graph.
//!
//! A path addresses map keys and list indices, e.g.
//! `addresses/ADR-1/locality` or `name/components/2/pronounce`. There is no
//! escaping; a property id containing `/` is not addressable.

use serde_json::Value;

/// Resolves a path against a JSON tree.
#[must_use]
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = step(current, segment)?;
    }
    Some(current)
}

/// Resolves a path against a mutable JSON tree.
#[must_use]
pub fn resolve_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments(path) {
        current = step_mut(current, segment)?;
    }
    Some(current)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "addresses": {
                "ADR-1": { "locality": "Turin", "street": "Via Roma" }
            },
            "name": {
                "components": [
                    { "kind": "given", "value": "Mario" },
                    { "kind": "surname", "value": "Rossi" }
                ]
            }
        })
    }

    #[test]
    fn resolve_map_key_path() {
        let root = sample();
        assert_eq!(
            resolve(&root, "addresses/ADR-1/locality"),
            Some(&json!("Turin"))
        );
    }

    #[test]
    fn resolve_list_index_path() {
        let root = sample();
        assert_eq!(
            resolve(&root, "name/components/1/value"),
            Some(&json!("Rossi"))
        );
    }

    #[test]
    fn missing_path_is_none() {
        let root = sample();
        assert!(resolve(&root, "addresses/ADR-2/locality").is_none());
        assert!(resolve(&root, "name/components/9/value").is_none());
        assert!(resolve(&root, "addresses/ADR-1/locality/deeper").is_none());
    }

    #[test]
    fn resolve_mut_allows_patch() {
        let mut root = sample();
        *resolve_mut(&mut root, "addresses/ADR-1/locality").expect("resolves") = json!("Torino");
        assert_eq!(
            resolve(&root, "addresses/ADR-1/locality"),
            Some(&json!("Torino"))
        );
    }
}
