//! LaTeX generation for whole-document mode
//!
//!     The transducer rewrites a [`DocNode`] tree into a LaTeX body, one case per node kind:
//!
//!     | Node                | Output                                      |
//!     |---------------------|---------------------------------------------|
//!     | Text                | escaped literal                             |
//!     | Emphasis / Strong   | `\textit{..}` / `\textbf{..}`               |
//!     | Math / MathBlock    | `$..$` / `$$..$$`, body untouched           |
//!     | Paragraph           | children, then `\par`                       |
//!     | Soft / hard break   | `\\`                                        |
//!     | Code / CodeBlock    | `\texttt{escaped}` / `verbatim` environment |
//!     | Heading             | starred sectioning command by level         |
//!     | everything else     | children only                               |
//!
//!     Containers without a dedicated case always recurse so no text is lost.
//!
//!     Before parsing, [`normalize_math_delimiters`] rewrites `\[..\]` and `\(..\)` into the
//!     dollar forms, which is the only convention the markdown parser's math extension knows.
//!     The [`templates`] module wraps bodies and single expressions into compilable documents.

mod preprocess;
pub mod templates;

pub use preprocess::normalize_math_delimiters;
pub use templates::{full_document, math_document};

use crate::tree::DocNode;

/// Escape LaTeX special characters in plain text.
///
/// Single pass, so the backslashes and braces introduced by one substitution are never
/// escaped again.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '[' => out.push_str("{[}"),
            ']' => out.push_str("{]}"),
            '|' => out.push_str(r"\textbar{}"),
            '/' => out.push_str("{/}"),
            other => out.push(other),
        }
    }
    out
}

/// Rewrite a document tree into a LaTeX body.
pub fn to_latex(node: &DocNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_children(node: &DocNode, out: &mut String) {
    for child in node.children() {
        write_node(child, out);
    }
}

fn write_node(node: &DocNode, out: &mut String) {
    match node {
        DocNode::Text { literal } => out.push_str(&escape_latex(literal)),
        DocNode::Emphasis { .. } => {
            out.push_str(r"\textit{");
            write_children(node, out);
            out.push('}');
        }
        DocNode::Strong { .. } => {
            out.push_str(r"\textbf{");
            write_children(node, out);
            out.push('}');
        }
        DocNode::Math { literal } => {
            out.push('$');
            out.push_str(literal);
            out.push('$');
        }
        DocNode::MathBlock { literal } => {
            out.push_str("$$");
            out.push_str(literal);
            out.push_str("$$");
        }
        DocNode::Paragraph { .. } => {
            write_children(node, out);
            out.push_str("\n\\par\n\n");
        }
        DocNode::SoftBreak | DocNode::HardBreak => out.push_str("\\\\\n"),
        DocNode::Code { literal } => {
            out.push_str(r"\texttt{");
            out.push_str(&escape_latex(literal));
            out.push('}');
        }
        DocNode::CodeBlock { literal, .. } => {
            out.push_str("\n\\begin{verbatim}\n");
            out.push_str(literal);
            out.push_str("\\end{verbatim}\n");
        }
        DocNode::Heading { level, .. } => {
            out.push_str(section_command(*level));
            out.push('{');
            write_children(node, out);
            out.push_str("}\n");
        }
        DocNode::Document { .. } | DocNode::Container { .. } => write_children(node, out),
    }
}

fn section_command(level: u8) -> &'static str {
    match level {
        0 | 1 => r"\section*",
        2 => r"\subsection*",
        3 => r"\subsubsection*",
        _ => r"\paragraph*",
    }
}
