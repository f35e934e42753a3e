//! Policy name resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The policy that supersedes every other policy in a set.
pub const ROOT_POLICY: &str = "root";

/// Policy list as supplied by a caller: either `"a,b,c"` or `["a", "b", "c"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyInput {
    Delimited(String),
    List(Vec<String>),
}

impl PolicyInput {
    /// Canonical policy set: trimmed, lowercased, deduplicated and sorted.
    pub fn resolve(&self) -> Vec<String> {
        match self {
            PolicyInput::Delimited(raw) => sanitize_policies(raw.split(',')),
            PolicyInput::List(items) => sanitize_policies(items.iter().map(String::as_str)),
        }
    }
}

impl Default for PolicyInput {
    fn default() -> Self {
        PolicyInput::List(Vec::new())
    }
}

impl From<&str> for PolicyInput {
    fn from(raw: &str) -> Self {
        PolicyInput::Delimited(raw.to_string())
    }
}

impl From<Vec<String>> for PolicyInput {
    fn from(items: Vec<String>) -> Self {
        PolicyInput::List(items)
    }
}

/// Normalize raw policy names.
///
/// Empty names are dropped. If `root` is present the result is exactly
/// `["root"]`, since it already grants everything the others could.
pub fn sanitize_policies<'a, I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut policies = BTreeSet::new();

    for name in raw {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        if name == ROOT_POLICY {
            return vec![ROOT_POLICY.to_string()];
        }
        policies.insert(name);
    }

    policies.into_iter().collect()
}
