//! Updates to JSON defaults files.

use eyre::{Result, WrapErr, eyre};
use serde_json::Value;

/// Insert or replace `key` in the top-level object of `source`.
///
/// Existing key order is preserved and a new key is appended. Output is
/// pretty-printed with two-space indentation; a trailing newline is kept if
/// the source had one. A blank source is treated as an empty object.
pub fn update_json(source: &str, key: &str, value: Value) -> Result<String> {
    let mut document: Value = if source.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(source).wrap_err("failed to parse JSON")?
    };

    let Some(object) = document.as_object_mut() else {
        return Err(eyre!("expected a JSON object at the top level"));
    };
    object.insert(key.to_string(), value);

    let mut out = serde_json::to_string_pretty(&document)?;
    if source.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
