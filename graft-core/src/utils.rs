//! Naming helpers used when deriving identifiers for generated code.

/// Lowercase the first character (e.g., "GameService" -> "gameService")
pub fn lowercase_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
    }
}

/// Uppercase the first character (e.g., "gameService" -> "GameService")
pub fn uppercase_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

/// Convert free-form input into a capitalized camel case identifier.
///
/// Every character that is not ASCII alphanumeric acts as a word separator;
/// a lowercase letter following a separator is uppercased.
///
/// ```
/// use graft_core::capitalized_camel_case;
///
/// assert_eq!(capitalized_camel_case("my cool_feature"), "MyCoolFeature");
/// assert_eq!(capitalized_camel_case("warm-launch v2"), "WarmLaunchV2");
/// ```
pub fn capitalized_camel_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut after_separator = false;

    for c in input.chars() {
        if !c.is_ascii_alphanumeric() {
            after_separator = true;
            continue;
        }
        if after_separator && c.is_ascii_lowercase() {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
        after_separator = false;
    }

    uppercase_first_letter(&result)
}

/// Check whether `s` is a valid TypeScript identifier (ASCII subset).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
