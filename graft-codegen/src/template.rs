//! Token substitution over template text.
//!
//! Tokens are literal keys such as `__NAME__`. Matching is case-insensitive
//! and happens in a single left-to-right pass, so replacement text is never
//! scanned again.

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Ordered map from token to replacement.
///
/// When one key is a prefix of another at the same position, the key that
/// was inserted first wins.
pub type TokenMap = IndexMap<String, String>;

/// Build a [`TokenMap`] from key/value pairs.
pub fn token_map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> TokenMap
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Replace every occurrence of every token in `template`.
pub fn substitute(template: &str, tokens: &TokenMap) -> String {
    let keys: Vec<&str> = tokens
        .keys()
        .map(String::as_str)
        .filter(|k| !k.is_empty())
        .collect();
    if keys.is_empty() {
        return template.to_string();
    }

    // Lookup by lowercased key; the first of two keys differing only by case wins
    let mut lookup: IndexMap<String, &str> = IndexMap::new();
    for key in &keys {
        lookup
            .entry(key.to_lowercase())
            .or_insert_with(|| tokens[*key].as_str());
    }

    match token_pattern(&keys) {
        Some(pattern) => pattern
            .replace_all(template, |caps: &regex::Captures<'_>| {
                let matched = &caps[0];
                lookup
                    .get(&matched.to_lowercase())
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| matched.to_string())
            })
            .into_owned(),
        None => {
            warn!(tokens = keys.len(), "token pattern too large, substituting sequentially");
            keys.iter().fold(template.to_string(), |text, key| {
                text.replace(*key, lookup[&key.to_lowercase()])
            })
        }
    }
}

/// Apply [`substitute`] once per item and join the results with newlines.
///
/// Zero items yield the empty string.
pub fn expand_each<T>(template: &str, items: &[T], tokens_for: impl Fn(&T) -> TokenMap) -> String {
    items
        .iter()
        .map(|item| substitute(template, &tokens_for(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn token_pattern(keys: &[&str]) -> Option<Regex> {
    let alternation = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .ok()
}
