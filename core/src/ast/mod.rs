//! Closed representation of the KRL syntax tree nodes that tooling inspects.
//!
//! Only the node types needed for outlines and completion get their own
//! variant. Everything else is kept as [`Node::Other`] with its child nodes,
//! so a full walk still reaches every identifier.

use std::fmt;

mod json;


/// Character span `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Ruleset {
        rid: Option<Box<Node>>,
        meta: Option<Box<Node>>,
        global: Vec<Node>,
        rules: Vec<Node>,
        span: Option<Span>,
    },
    RulesetId {
        value: String,
        span: Span,
    },
    RulesetMeta {
        properties: Vec<Node>,
        span: Span,
    },
    RulesetMetaProperty {
        key: String,
        key_span: Span,
        value: Option<Box<Node>>,
        span: Option<Span>,
    },
    Declaration {
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    DefAction {
        id: Box<Node>,
        children: Vec<Node>,
        span: Span,
    },
    Function {
        children: Vec<Node>,
        span: Option<Span>,
    },
    Rule {
        name: Box<Node>,
        children: Vec<Node>,
        span: Span,
    },
    Identifier {
        value: String,
        span: Option<Span>,
    },
    /// Any node type without a dedicated variant, e.g. `Map`, `String`, `Application`.
    Other {
        kind: String,
        children: Vec<Node>,
        span: Option<Span>,
    },
}

impl Node {
    /// The node's type tag as the parser names it.
    pub fn type_name(&self) -> &str {
        match self {
            Node::Ruleset { .. } => "Ruleset",
            Node::RulesetId { .. } => "RulesetID",
            Node::RulesetMeta { .. } => "RulesetMeta",
            Node::RulesetMetaProperty { .. } => "RulesetMetaProperty",
            Node::Declaration { .. } => "Declaration",
            Node::DefAction { .. } => "DefAction",
            Node::Function { .. } => "Function",
            Node::Rule { .. } => "Rule",
            Node::Identifier { .. } => "Identifier",
            Node::Other { kind, .. } => kind.as_str(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Node::RulesetId { span, .. }
            | Node::RulesetMeta { span, .. }
            | Node::Declaration { span, .. }
            | Node::DefAction { span, .. }
            | Node::Rule { span, .. } => Some(*span),
            Node::Ruleset { span, .. }
            | Node::RulesetMetaProperty { span, .. }
            | Node::Function { span, .. }
            | Node::Identifier { span, .. }
            | Node::Other { span, .. } => *span,
        }
    }

    /// Name carried by identifier-like nodes.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Identifier { value, .. } | Node::RulesetId { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    /// Direct child nodes, in field order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Ruleset {
                rid,
                meta,
                global,
                rules,
                ..
            } => rid
                .as_deref()
                .into_iter()
                .chain(meta.as_deref())
                .chain(global.iter())
                .chain(rules.iter())
                .collect(),
            Node::RulesetMeta { properties, .. } => properties.iter().collect(),
            Node::RulesetMetaProperty { value, .. } => value.as_deref().into_iter().collect(),
            Node::Declaration { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Node::DefAction { id, children, .. } | Node::Rule { name: id, children, .. } => {
                std::iter::once(id.as_ref()).chain(children.iter()).collect()
            }
            Node::Function { children, .. } | Node::Other { children, .. } => children.iter().collect(),
            Node::RulesetId { .. } | Node::Identifier { .. } => Vec::new(),
        }
    }

    /// Visit this node and every descendant exactly once, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        let mut stack: Vec<&'a Node> = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            let children = node.children();
            stack.extend(children.into_iter().rev());
        }
    }
}

/// A JSON tree that does not have the shape of a KRL syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AstError {
    pub node_type: String,
    pub message: String,
}

impl AstError {
    pub fn new(node_type: &str, message: impl Into<String>) -> Self {
        Self {
            node_type: node_type.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for AstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed {} node: {}", self.node_type, self.message)
    }
}

impl std::error::Error for AstError {}
