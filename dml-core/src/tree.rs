//! Document tree consumed by the LaTeX transducer and the emphasis renderer.
//!
//! A closed set of node kinds. Everything the markdown parser produces that has no dedicated
//! variant lands in [`DocNode::Container`], which keeps its children so no content is lost.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DocNode {
    Document { children: Vec<DocNode> },
    Paragraph { children: Vec<DocNode> },
    Heading { level: u8, children: Vec<DocNode> },
    Text { literal: String },
    Emphasis { children: Vec<DocNode> },
    Strong { children: Vec<DocNode> },
    /// Inline math, body without delimiters
    Math { literal: String },
    /// Display math, body without delimiters
    MathBlock { literal: String },
    Code { literal: String },
    CodeBlock { info: String, literal: String },
    SoftBreak,
    HardBreak,
    Container { kind: ContainerKind, children: Vec<DocNode> },
}

/// What a generic container was in the source markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    List,
    ListItem,
    BlockQuote,
    Link,
    Image,
    Table,
    TableRow,
    TableCell,
    Strikethrough,
    Html,
    ThematicBreak,
    Other,
}

impl DocNode {
    pub fn text(literal: impl Into<String>) -> Self {
        DocNode::Text {
            literal: literal.into(),
        }
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[DocNode] {
        match self {
            DocNode::Document { children }
            | DocNode::Paragraph { children }
            | DocNode::Heading { children, .. }
            | DocNode::Emphasis { children }
            | DocNode::Strong { children }
            | DocNode::Container { children, .. } => children,
            DocNode::Text { .. }
            | DocNode::Math { .. }
            | DocNode::MathBlock { .. }
            | DocNode::Code { .. }
            | DocNode::CodeBlock { .. }
            | DocNode::SoftBreak
            | DocNode::HardBreak => &[],
        }
    }

    /// Short kind name, used by the tree dump.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DocNode::Document { .. } => "document",
            DocNode::Paragraph { .. } => "paragraph",
            DocNode::Heading { .. } => "heading",
            DocNode::Text { .. } => "text",
            DocNode::Emphasis { .. } => "emphasis",
            DocNode::Strong { .. } => "strong",
            DocNode::Math { .. } => "math",
            DocNode::MathBlock { .. } => "math-block",
            DocNode::Code { .. } => "code",
            DocNode::CodeBlock { .. } => "code-block",
            DocNode::SoftBreak => "soft-break",
            DocNode::HardBreak => "hard-break",
            DocNode::Container { .. } => "container",
        }
    }
}

/// Indented one-node-per-line dump of a tree.
pub fn dump(node: &DocNode) -> String {
    let mut out = String::new();
    dump_into(node, 0, &mut out);
    out
}

fn dump_into(node: &DocNode, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(node.kind_name());
    match node {
        DocNode::Heading { level, .. } => out.push_str(&format!(" (level {level})")),
        DocNode::Container { kind, .. } => out.push_str(&format!(" ({kind:?})")),
        DocNode::Text { literal }
        | DocNode::Math { literal }
        | DocNode::MathBlock { literal }
        | DocNode::Code { literal }
        | DocNode::CodeBlock { literal, .. } => out.push_str(&format!(" {literal:?}")),
        _ => {}
    }
    out.push('\n');
    for child in node.children() {
        dump_into(child, depth + 1, out);
    }
}
