//! TypeScript interface builder.

use graft_codegen::CodeBuilder;
use serde_json::Value;

use crate::{
    error::{Error, Result},
    literal::{TsType, property_key},
};

/// A field in a TypeScript interface.
#[derive(Debug, Clone)]
pub struct InterfaceField {
    pub name: String,
    pub ty: String,
    pub readonly: bool,
}

impl InterfaceField {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            readonly: false,
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

/// Builder for exported TypeScript interfaces.
#[derive(Debug, Clone)]
pub struct Interface {
    name: String,
    fields: Vec<InterfaceField>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field with full configuration.
    pub fn field_with(mut self, field: InterfaceField) -> Self {
        self.fields.push(field);
        self
    }

    /// Render the interface to a CodeBuilder.
    ///
    /// Multi-line field types keep their relative indentation.
    pub fn render(&self, builder: CodeBuilder) -> CodeBuilder {
        if self.fields.is_empty() {
            return builder.line(&format!("export interface {} {{}}", self.name));
        }

        let mut builder = builder
            .line(&format!("export interface {} {{", self.name))
            .indent();
        for field in &self.fields {
            let readonly = if field.readonly { "readonly " } else { "" };
            builder.push_lines(&format!("{}{}: {};", readonly, field.name, field.ty));
        }
        builder.dedent().line("}")
    }

    /// Build the interface as a string.
    pub fn build(&self) -> String {
        self.render(CodeBuilder::typescript()).build()
    }
}

/// Derive a readonly interface from a sample JSON payload.
pub fn interface_from_json(name: &str, sample: &Value) -> Result<String> {
    let Value::Object(map) = sample else {
        return Err(Box::new(Error::InterfaceShape {
            name: name.to_string(),
            reason: "the sample is not a JSON object".to_string(),
        }));
    };

    let interface = map.iter().fold(Interface::new(name), |interface, (key, value)| {
        interface.field_with(
            InterfaceField::new(property_key(key), TsType::infer(value).multiline()).readonly(),
        )
    });
    Ok(interface.build())
}

/// Parse `json` and derive a readonly interface from it.
pub fn interface_from_json_str(name: &str, json: &str) -> Result<String> {
    let sample: Value = serde_json::from_str(json).map_err(|e| {
        Box::new(Error::InterfaceShape {
            name: name.to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    })?;
    interface_from_json(name, &sample)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_interface() {
        let i = Interface::new("Empty").build();
        assert_eq!(i, "export interface Empty {}\n");
    }

    #[test]
    fn test_interface_with_fields() {
        let i = Interface::new("Person")
            .field_with(InterfaceField::new("name", "string"))
            .field_with(InterfaceField::new("age", "number").readonly())
            .build();
        assert_eq!(
            i,
            "export interface Person {\n  name: string;\n  readonly age: number;\n}\n"
        );
    }

    #[test]
    fn test_interface_from_json() {
        let sample = json!({
            "gameId": "abc",
            "scores": [1, 2],
            "player": { "name": "x", "level": 3 },
            "extra": null
        });
        insta::assert_snapshot!(interface_from_json("IGetGameResponse", &sample).unwrap(), @r"
        export interface IGetGameResponse {
          readonly gameId: string;
          readonly scores: number[];
          readonly player: {
            readonly name: string;
            readonly level: number;
          };
          readonly extra: any;
        }
        ");
    }

    #[test]
    fn test_interface_from_empty_object() {
        assert_eq!(
            interface_from_json_str("IEmpty", "{}").unwrap(),
            "export interface IEmpty {}\n"
        );
    }

    #[test]
    fn test_interface_requires_object() {
        let err = interface_from_json("IList", &json!([1])).unwrap_err();
        assert!(matches!(*err, Error::InterfaceShape { .. }));

        let err = interface_from_json_str("IBad", "{ nope").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
