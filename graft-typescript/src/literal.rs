//! JSON values as TypeScript literals and structural types.

use graft_codegen::CodeBuilder;
use graft_core::is_identifier;
use serde_json::Value;

/// Render `value` as a TypeScript literal.
///
/// Strings are single-quoted. Arrays of primitives stay on one line;
/// objects and other arrays are printed one entry per line with trailing
/// commas.
pub fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) if items.iter().all(is_primitive) => {
            let items: Vec<_> = items.iter().map(render_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Array(items) => block("[", "]", items.iter().map(render_literal)),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => block(
            "{",
            "}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", property_key(k), render_literal(v))),
        ),
    }
}

/// A key usable in an object literal or type, quoted when necessary.
pub fn property_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Single-quoted string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn block(open: &str, close: &str, entries: impl Iterator<Item = String>) -> String {
    let mut builder = CodeBuilder::typescript();
    builder.push_line(open).push_indent();
    for entry in entries {
        builder.push_lines(&format!("{entry},"));
    }
    builder.push_dedent().push_raw(close);
    builder.build()
}

/// A TypeScript type inferred from the shape of a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    String,
    Number,
    Boolean,
    Any,
    Array(Box<TsType>),
    /// Object type with readonly fields, in key order.
    Object(Vec<(String, TsType)>),
}

impl TsType {
    /// Infer the type of `value`. `null` and mixed arrays become `any`.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Null => Self::Any,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(items) => {
                let mut types = items.iter().map(Self::infer);
                let element = match types.next() {
                    Some(first) if types.all(|t| t == first) => first,
                    _ => Self::Any,
                };
                Self::Array(Box::new(element))
            }
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::infer(v)))
                    .collect(),
            ),
        }
    }

    /// Single-line form, `{ readonly a: string; readonly b: number[] }`.
    pub fn inline(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Any => "any".to_string(),
            Self::Array(element) => format!("{}[]", element.inline()),
            Self::Object(fields) if fields.is_empty() => "{}".to_string(),
            Self::Object(fields) => {
                let fields: Vec<_> = fields
                    .iter()
                    .map(|(k, t)| format!("readonly {}: {}", property_key(k), t.inline()))
                    .collect();
                format!("{{ {} }}", fields.join("; "))
            }
        }
    }

    /// Object types spread over several lines, other types inline.
    pub fn multiline(&self) -> String {
        match self {
            Self::Array(element) if matches!(**element, Self::Object(_)) => {
                format!("{}[]", element.multiline())
            }
            Self::Object(fields) if !fields.is_empty() => {
                let mut builder = CodeBuilder::typescript();
                builder.push_line("{").push_indent();
                for (key, ty) in fields {
                    builder.push_lines(&format!(
                        "readonly {}: {};",
                        property_key(key),
                        ty.multiline()
                    ));
                }
                builder.push_dedent().push_raw("}");
                builder.build()
            }
            _ => self.inline(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_primitive_literals() {
        assert_eq!(render_literal(&json!("it's")), "'it\\'s'");
        assert_eq!(render_literal(&json!(3.5)), "3.5");
        assert_eq!(render_literal(&json!(false)), "false");
        assert_eq!(render_literal(&json!(null)), "null");
        assert_eq!(render_literal(&json!(["a", 1])), "['a', 1]");
        assert_eq!(render_literal(&json!({})), "{}");
    }

    #[test]
    fn test_nested_object_literal() {
        let value = json!({ "enabled": true, "retry-count": 2, "tags": ["x"], "nested": { "a": [{ "b": 1 }] } });
        insta::assert_snapshot!(render_literal(&value), @r"
        {
          enabled: true,
          'retry-count': 2,
          tags: ['x'],
          nested: {
            a: [
              {
                b: 1,
              },
            ],
          },
        }
        ");
    }

    #[test]
    fn test_infer_types() {
        assert_eq!(TsType::infer(&json!("s")).inline(), "string");
        assert_eq!(TsType::infer(&json!(null)).inline(), "any");
        assert_eq!(TsType::infer(&json!([])).inline(), "any[]");
        assert_eq!(TsType::infer(&json!(["a", "b"])).inline(), "string[]");
        assert_eq!(TsType::infer(&json!([1, "b"])).inline(), "any[]");
        assert_eq!(
            TsType::infer(&json!([{ "id": 1 }])).inline(),
            "{ readonly id: number }[]"
        );
        assert_eq!(
            TsType::infer(&json!({ "a": true, "b": { "c": "d" } })).inline(),
            "{ readonly a: boolean; readonly b: { readonly c: string } }"
        );
    }

    #[test]
    fn test_multiline_type() {
        let ty = TsType::infer(&json!({ "items": [{ "id": 1 }], "total": 3 }));
        insta::assert_snapshot!(ty.multiline(), @r"
        {
          readonly items: {
            readonly id: number;
          }[];
          readonly total: number;
        }
        ");
    }
}
