//! An arena tree over the top-level structure of a TypeScript module.
//!
//! Only enums, object literal constants and classes are broken down into
//! members. Every other statement is an opaque [`NodeKind::Statement`]
//! carrying its source text. Printing walks the tree and emits canonical
//! indentation with one statement or member per line.

mod parse;
mod print;

use crate::error::{DeclarationKind, Result};

/// Index of a node in its [`SourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Statement,
    Enum,
    Object,
    Class,
    Member,
}

impl NodeKind {
    pub fn is_declaration(&self) -> bool {
        matches!(self, Self::Enum | Self::Object | Self::Class)
    }

    /// Enum and object members are separated by commas.
    pub fn comma_separated(&self) -> bool {
        matches!(self, Self::Enum | Self::Object)
    }
}

impl From<DeclarationKind> for NodeKind {
    fn from(kind: DeclarationKind) -> Self {
        match kind {
            DeclarationKind::Enum => Self::Enum,
            DeclarationKind::Object => Self::Object,
            DeclarationKind::Class => Self::Class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Declaration name or member key.
    pub name: Option<String>,
    /// Source text. For declarations, the header up to and including `{`.
    pub text: String,
    /// Text after the closing brace of a declaration, such as ` as const;`.
    pub close: String,
    pub leading: Vec<String>,
    pub trailing: Option<String>,
    pub children: Vec<NodeId>,
    /// Comments after the last member of a declaration.
    pub dangling: Vec<String>,
    /// Lines of `text` that continue a template literal. They are printed
    /// exactly as written.
    pub verbatim: Vec<usize>,
}

impl Node {
    pub fn member(name: Option<String>, text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Member,
            name,
            text: text.into(),
            close: String::new(),
            leading: Vec::new(),
            trailing: None,
            children: Vec::new(),
            dangling: Vec::new(),
            verbatim: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    dangling: Vec<String>,
    trailing_newline: bool,
}

impl SourceTree {
    pub fn parse(src: &str) -> Result<Self> {
        parse::parse(src)
    }

    pub fn print(&self) -> String {
        print::print(self)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Top-level declarations of `kind` named `name`.
    pub fn find_declarations(&self, kind: NodeKind, name: &str) -> Vec<NodeId> {
        self.roots
            .iter()
            .copied()
            .filter(|id| {
                let node = self.node(*id);
                node.kind == kind && node.name.as_deref() == Some(name)
            })
            .collect()
    }

    pub fn has_member(&self, parent: NodeId, key: &str) -> bool {
        self.node(parent)
            .children
            .iter()
            .any(|id| self.node(*id).name.as_deref() == Some(key))
    }

    pub fn append_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add_node(node);
        self.node_mut(parent).children.push(id);
        id
    }

    pub fn prepend_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.add_node(node);
        self.node_mut(parent).children.insert(0, id);
        id
    }

    /// Stable sort of the members of `parent` by key. Keyless members first.
    pub fn sort_children(&mut self, parent: NodeId) {
        let mut children = std::mem::take(&mut self.node_mut(parent).children);
        children.sort_by(|a, b| self.node(*a).name.cmp(&self.node(*b).name));
        self.node_mut(parent).children = children;
    }
}
