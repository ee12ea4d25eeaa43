//! Syntax nodes and the arena that owns them.

use crate::expression::{ExpressionError, ExpressionResult};
use crate::syntax::Category;
use std::fmt;

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Lexical form of a node; affects categorization only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeVariant {
    Generic,
    Operator,
    FunctionCall,
    Separator,
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    name: String,
    variant: NodeVariant,
    category: Category,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl SyntaxNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> NodeVariant {
        self.variant
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// A forest of syntax nodes hanging from a synthetic, nameless root.
///
/// Parents own their children through `children`; `parent` is a plain index
/// back-reference. Nodes detached during cleanup stay in the arena but are
/// unreachable from the root.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![SyntaxNode {
                name: String::new(),
                variant: NodeVariant::Generic,
                category: Category::Unknown,
                children: Vec::new(),
                parent: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The top-level siblings
    pub fn forest(&self) -> &[NodeId] {
        self.children(self.root())
    }

    /// Append a new last child to `parent`
    pub fn push_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        variant: NodeVariant,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode {
            name: name.into(),
            variant,
            category: Category::Unknown,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn append_name(&mut self, id: NodeId, suffix: &str) {
        self.nodes[id.0].name.push_str(suffix);
    }

    /// Detach the child at `index` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, index: usize) {
        self.nodes[parent.0].children.remove(index);
    }

    /// Set the category of a node. A category can only be set once.
    pub fn set_category(&mut self, id: NodeId, category: Category) -> ExpressionResult<()> {
        let node = &mut self.nodes[id.0];
        if node.category != Category::Unknown {
            return Err(ExpressionError::CategoryReassignment {
                node: node.name.clone(),
                existing: node.category,
            });
        }
        node.category = category;
        Ok(())
    }

    /// Recursively drop nodes with an empty name and no children
    pub fn remove_empty_children(&mut self, id: NodeId) {
        let children = self.nodes[id.0].children.clone();
        for &child in &children {
            self.remove_empty_children(child);
        }
        let nodes = &self.nodes;
        let kept: Vec<NodeId> = children
            .into_iter()
            .filter(|child| {
                let node = &nodes[child.0];
                !(node.name.is_empty() && node.children.is_empty())
            })
            .collect();
        self.nodes[id.0].children = kept;
    }

    /// Render a sibling list: each node's name followed by its children in
    /// parentheses
    pub fn render(&self, ids: &[NodeId]) -> String {
        let mut out = String::new();
        for &id in ids {
            self.write_node(id, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        out.push_str(&node.name);
        if !node.children.is_empty() {
            out.push('(');
            for &child in &node.children {
                self.write_node(child, out);
            }
            out.push(')');
        }
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(self.forest()))
    }
}
