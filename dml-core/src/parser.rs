//! Markdown parsing into the [`DocNode`] tree
//!
//! Pipeline: Markdown string → Comrak AST → DocNode tree

use crate::tree::{ContainerKind, DocNode};
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};

/// Produces a document tree from source text.
pub trait DocumentParser {
    fn parse(&self, source: &str) -> DocNode;
}

/// Comrak-backed parser.
///
/// With math enabled, `$...$` and `$$...$$` become [`DocNode::Math`] and
/// [`DocNode::MathBlock`]. The line-mode emphasis pass uses the plain variant, where dollar
/// signs are just text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownParser {
    math: bool,
}

impl MarkdownParser {
    pub fn with_math() -> Self {
        MarkdownParser { math: true }
    }

    pub fn plain() -> Self {
        MarkdownParser { math: false }
    }

    fn options(&self) -> ComrakOptions<'static> {
        let mut options = ComrakOptions::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        options.extension.math_dollars = self.math;
        options
    }
}

impl DocumentParser for MarkdownParser {
    fn parse(&self, source: &str) -> DocNode {
        let arena = Arena::new();
        let options = self.options();
        let root = parse_document(&arena, source, &options);
        convert_node(root)
    }
}

fn convert_children<'a>(node: &'a AstNode<'a>) -> Vec<DocNode> {
    node.children().map(convert_node).collect()
}

fn container<'a>(kind: ContainerKind, node: &'a AstNode<'a>) -> DocNode {
    DocNode::Container {
        kind,
        children: convert_children(node),
    }
}

fn convert_node<'a>(node: &'a AstNode<'a>) -> DocNode {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Document => DocNode::Document {
            children: convert_children(node),
        },
        NodeValue::Paragraph => DocNode::Paragraph {
            children: convert_children(node),
        },
        NodeValue::Heading(heading) => DocNode::Heading {
            level: heading.level,
            children: convert_children(node),
        },
        NodeValue::Text(text) => DocNode::text(text.clone()),
        NodeValue::Emph => DocNode::Emphasis {
            children: convert_children(node),
        },
        NodeValue::Strong => DocNode::Strong {
            children: convert_children(node),
        },
        NodeValue::Math(math) => {
            if math.display_math {
                DocNode::MathBlock {
                    literal: math.literal.clone(),
                }
            } else {
                DocNode::Math {
                    literal: math.literal.clone(),
                }
            }
        }
        NodeValue::Code(code) => DocNode::Code {
            literal: code.literal.clone(),
        },
        NodeValue::CodeBlock(block) => DocNode::CodeBlock {
            info: block.info.clone(),
            literal: block.literal.clone(),
        },
        NodeValue::SoftBreak => DocNode::SoftBreak,
        NodeValue::LineBreak => DocNode::HardBreak,
        NodeValue::HtmlInline(html) => DocNode::text(html.clone()),
        NodeValue::HtmlBlock(html) => DocNode::Container {
            kind: ContainerKind::Html,
            children: vec![DocNode::text(html.literal.clone())],
        },
        NodeValue::List(_) => container(ContainerKind::List, node),
        NodeValue::Item(_) => container(ContainerKind::ListItem, node),
        NodeValue::BlockQuote => container(ContainerKind::BlockQuote, node),
        NodeValue::Link(_) => container(ContainerKind::Link, node),
        NodeValue::Image(_) => container(ContainerKind::Image, node),
        NodeValue::Table(_) => container(ContainerKind::Table, node),
        NodeValue::TableRow(_) => container(ContainerKind::TableRow, node),
        NodeValue::TableCell => container(ContainerKind::TableCell, node),
        NodeValue::Strikethrough => container(ContainerKind::Strikethrough, node),
        NodeValue::ThematicBreak => container(ContainerKind::ThematicBreak, node),
        _ => container(ContainerKind::Other, node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph_children(tree: &DocNode) -> &[DocNode] {
        match tree.children().first() {
            Some(DocNode::Paragraph { children }) => children,
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn recognizes_emphasis_and_strong() {
        let tree = MarkdownParser::plain().parse("a **b** *c*");
        let children = paragraph_children(&tree);
        assert!(matches!(children[1], DocNode::Strong { .. }));
        assert!(matches!(children[3], DocNode::Emphasis { .. }));
    }

    #[test]
    fn math_is_only_recognized_when_enabled() {
        let plain = MarkdownParser::plain().parse("cost $x$ here");
        assert!(paragraph_children(&plain)
            .iter()
            .all(|n| matches!(n, DocNode::Text { .. })));

        let math = MarkdownParser::with_math().parse("inline $x$ and $$y$$");
        let children = paragraph_children(&math);
        assert!(children
            .iter()
            .any(|n| *n == DocNode::Math { literal: "x".to_string() }));
        assert!(children
            .iter()
            .any(|n| *n == DocNode::MathBlock { literal: "y".to_string() }));
    }

    #[test]
    fn headings_keep_their_level() {
        let tree = MarkdownParser::plain().parse("### Three\n");
        match &tree.children()[0] {
            DocNode::Heading { level, .. } => assert_eq!(*level, 3),
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn lists_become_containers_with_content() {
        let tree = MarkdownParser::plain().parse("- one\n- two\n");
        match &tree.children()[0] {
            DocNode::Container { kind, children } => {
                assert_eq!(*kind, ContainerKind::List);
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected list container, got {other:?}"),
        }
    }

    #[test]
    fn fenced_code_keeps_literal() {
        let tree = MarkdownParser::plain().parse("```rust\nlet x = 1;\n```\n");
        assert_eq!(
            tree.children()[0],
            DocNode::CodeBlock {
                info: "rust".to_string(),
                literal: "let x = 1;\n".to_string()
            }
        );
    }
}
