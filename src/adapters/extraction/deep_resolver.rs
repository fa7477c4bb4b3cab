//! Keyed search over JSON of unknown shape.
//!
//! Listing sites nest the same facts under different paths and slightly
//! different key names. The resolver walks the tree pre-order in document
//! key order and returns the first value whose key contains one of the
//! synonym fragments and whose JSON type matches what the caller expects.

use serde_json::Value;

/// Upper bound on visited nodes per search.
pub const NODE_BUDGET: usize = 50_000;

/// Paths where sites commonly keep the listing object itself.
pub const KNOWN_LISTING_PATHS: &[&[&str]] = &[
    &["props", "pageProps", "listingDetails", "listing"],
    &["props", "pageProps", "listing"],
    &["props", "pageProps", "listingData", "listing"],
    &["listing"],
    &["bootstrapData", "reduxData", "homePDP", "listingInfo", "listing"],
];

/// Keys holding the display label of an object inside a label array.
pub const LABEL_KEYS: &[&str] = &["name", "title", "amenity"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    Text,
    Number,
    /// Non-empty array whose items are all labels: non-blank strings or
    /// objects carrying one under [`LABEL_KEYS`].
    Array,
    Bool,
    Object,
}

impl ExpectedType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Text => value.as_str().is_some_and(|s| !s.trim().is_empty()),
            Self::Number => value.is_number(),
            Self::Array => value
                .as_array()
                .is_some_and(|items| !items.is_empty() && items.iter().all(is_label)),
            Self::Bool => value.is_boolean(),
            Self::Object => value.is_object(),
        }
    }
}

/// Return the first value under a key matching any synonym with the expected type.
pub fn resolve<'a>(root: &'a Value, synonyms: &[&str], expected: ExpectedType) -> Option<&'a Value> {
    resolve_with_budget(root, synonyms, expected, NODE_BUDGET)
}

pub fn resolve_with_budget<'a>(
    root: &'a Value,
    synonyms: &[&str],
    expected: ExpectedType,
    budget: usize,
) -> Option<&'a Value> {
    let fragments: Vec<String> = synonyms.iter().map(|s| s.to_ascii_lowercase()).collect();
    let mut stack: Vec<&Value> = vec![root];
    let mut visited = 0usize;

    while let Some(node) = stack.pop() {
        visited += 1;
        if visited > budget {
            return None;
        }
        match node {
            Value::Object(map) => {
                for (key, value) in map {
                    if key.starts_with("__") {
                        continue;
                    }
                    let lower = key.to_ascii_lowercase();
                    if fragments.iter().any(|f| lower.contains(f.as_str())) && expected.matches(value)
                    {
                        return Some(value);
                    }
                }
                // Reverse push keeps document order when popping.
                for (key, value) in map.iter().rev() {
                    if !key.starts_with("__") && is_container(value) {
                        stack.push(value);
                    }
                }
            }
            Value::Array(items) => {
                for item in items.iter().rev() {
                    if is_container(item) {
                        stack.push(item);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn is_label(item: &Value) -> bool {
    match item {
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(_) => LABEL_KEYS
            .iter()
            .any(|k| item.get(*k).and_then(Value::as_str).is_some_and(|s| !s.trim().is_empty())),
        _ => false,
    }
}

fn is_container(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

/// Follow an exact key path from `root`.
pub fn at_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(*key))
}

/// The listing object under the first known path that holds an object.
pub fn find_listing_node(root: &Value) -> Option<&Value> {
    KNOWN_LISTING_PATHS
        .iter()
        .filter_map(|path| at_path(root, path))
        .find(|v| v.is_object())
}

/// Resolve against the listing node first, then the whole document.
pub fn resolve_scoped<'a>(
    root: &'a Value,
    synonyms: &[&str],
    expected: ExpectedType,
) -> Option<&'a Value> {
    find_listing_node(root)
        .and_then(|listing| resolve(listing, synonyms, expected))
        .or_else(|| resolve(root, synonyms, expected))
}
