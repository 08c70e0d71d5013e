//! Structural edits of enum, object and class declarations.
//!
//! An edit parses the file into a [`SourceTree`], inserts one member into a
//! uniquely named top-level declaration, re-prints the tree and finally puts
//! back the blank lines the re-print dropped. Everything outside the edited
//! declaration comes back unchanged as long as it was already formatted
//! canonically.

use graft_codegen::{LineEnding, restore_whitespace};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{DeclarationKind, Error, Result},
    literal::{TsType, property_key, render_literal},
    tree::{Node, NodeKind, SourceTree},
};

/// The declaration an edit targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locate {
    pub kind: DeclarationKind,
    pub name: String,
}

impl Locate {
    pub fn new(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    /// Rendered as a TypeScript literal. Class members get an inferred type.
    Json(Value),
    /// Inserted verbatim.
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub key: String,
    pub value: MemberValue,
    /// Decorator names without `@`, for class members.
    pub decorators: Vec<String>,
}

impl NewMember {
    pub fn new(key: impl Into<String>, value: MemberValue) -> Self {
        Self {
            key: key.into(),
            value,
            decorators: Vec::new(),
        }
    }

    pub fn decorated(mut self, decorators: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.decorators = decorators.into_iter().map(Into::into).collect();
        self
    }

    /// Member source text as it appears inside a declaration of `kind`.
    fn render(&self, kind: DeclarationKind) -> String {
        let key = property_key(&self.key);
        let value = match &self.value {
            MemberValue::Json(value) => render_literal(value),
            MemberValue::Expr(expr) => expr.clone(),
        };
        match kind {
            DeclarationKind::Enum => format!("{key} = {value}"),
            DeclarationKind::Object => format!("{key}: {value}"),
            DeclarationKind::Class => {
                let mut text: String = self
                    .decorators
                    .iter()
                    .map(|decorator| format!("@{decorator}\n"))
                    .collect();
                match &self.value {
                    MemberValue::Json(json) => {
                        let ty = TsType::infer(json).multiline();
                        text.push_str(&format!("{key}: {ty} = {value};"));
                    }
                    MemberValue::Expr(_) => text.push_str(&format!("{key} = {value};")),
                }
                text
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    #[default]
    Append,
    Prepend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    pub placement: Placement,
    /// Re-sort every member by key after inserting.
    pub sort: bool,
}

impl InsertOptions {
    pub fn sorted() -> Self {
        Self {
            sort: true,
            ..Self::default()
        }
    }
}

/// Insert `member` into the declaration found by `locate`.
///
/// Fails without producing any text when the declaration is missing or
/// ambiguous, or when it already has a member with the same key.
/// A file with `\r\n` line endings keeps them.
pub fn insert_member(
    src: &str,
    locate: &Locate,
    member: &NewMember,
    options: InsertOptions,
) -> Result<String> {
    let line_ending = LineEnding::detect(src);
    let src = LineEnding::normalize(src);
    let mut tree = SourceTree::parse(&src)?;

    let matches = tree.find_declarations(NodeKind::from(locate.kind), &locate.name);
    let parent = match matches.as_slice() {
        [] => {
            return Err(Box::new(Error::DeclarationNotFound {
                kind: locate.kind,
                name: locate.name.clone(),
            }));
        }
        [id] => *id,
        _ => {
            return Err(Box::new(Error::AmbiguousDeclaration {
                kind: locate.kind,
                name: locate.name.clone(),
                count: matches.len(),
            }));
        }
    };

    if tree.has_member(parent, &member.key) {
        return Err(Box::new(Error::DuplicateKey {
            declaration: locate.name.clone(),
            key: member.key.clone(),
        }));
    }

    let node = Node::member(Some(member.key.clone()), member.render(locate.kind));
    match options.placement {
        Placement::Append => tree.append_child(parent, node),
        Placement::Prepend => tree.prepend_child(parent, node),
    };
    if options.sort {
        tree.sort_children(parent);
    }

    debug!(declaration = %locate.name, key = %member.key, "inserted member");
    let out =
        restore_whitespace(&src, &tree.print()).map_err(|e| Box::new(Error::Whitespace(e)))?;
    Ok(line_ending.restore(out))
}

/// Add `key = 'value'` to an enum.
pub fn insert_enum_member(
    src: &str,
    enum_name: &str,
    key: &str,
    value: &str,
    sort: bool,
) -> Result<String> {
    let member = NewMember::new(key, MemberValue::Json(Value::String(value.to_string())));
    let options = InsertOptions {
        sort,
        ..InsertOptions::default()
    };
    insert_member(
        src,
        &Locate::new(DeclarationKind::Enum, enum_name),
        &member,
        options,
    )
}

/// Add `key: value` to an object literal constant.
pub fn insert_object_member(
    src: &str,
    object_name: &str,
    key: &str,
    value: MemberValue,
) -> Result<String> {
    insert_member(
        src,
        &Locate::new(DeclarationKind::Object, object_name),
        &NewMember::new(key, value),
        InsertOptions::default(),
    )
}

/// Add a typed, initialized and decorated property to a class.
pub fn insert_class_member(
    src: &str,
    class_name: &str,
    key: &str,
    value: &Value,
    decorators: &[String],
) -> Result<String> {
    let member = NewMember::new(key, MemberValue::Json(value.clone())).decorated(decorators);
    insert_member(
        src,
        &Locate::new(DeclarationKind::Class, class_name),
        &member,
        InsertOptions::default(),
    )
}
