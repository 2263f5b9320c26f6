//! Terminal styling for the plain text of line mode
//!
//! Plain text is parsed as markdown without the math extension (dollar signs that survive
//! segmentation are literal) and bold/italic become ANSI SGR codes. Everything else is
//! flattened to its text.
//!
//! A line is styled as a whole after its math has been rendered, so `**mass $m$**` comes out
//! bold on both sides of the image. Rendered output is kept out of the markdown parser behind
//! private-use placeholders.

use crate::parser::{DocumentParser, MarkdownParser};
use crate::tree::DocNode;
use std::borrow::Cow;

pub const BOLD_ON: &str = "\x1b[1m";
pub const BOLD_OFF: &str = "\x1b[22m";
pub const ITALIC_ON: &str = "\x1b[3m";
pub const ITALIC_OFF: &str = "\x1b[23m";

const SHIELD_OPEN: char = '\u{E000}';
const SHIELD_CLOSE: char = '\u{E001}';

/// One piece of a line handed to [`format_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePart<'a> {
    /// Markdown text to style
    Markdown(&'a str),
    /// Output written as is, such as an encoded image or the source of a failed formula
    Verbatim(String),
}

/// Render a tree as terminal text.
pub fn style_for_terminal(node: &DocNode) -> String {
    let mut out = String::new();
    write_styled(node, &mut out);
    out
}

fn write_children(node: &DocNode, out: &mut String) {
    for child in node.children() {
        write_styled(child, out);
    }
}

fn write_styled(node: &DocNode, out: &mut String) {
    match node {
        DocNode::Text { literal }
        | DocNode::Code { literal }
        | DocNode::CodeBlock { literal, .. }
        | DocNode::Math { literal }
        | DocNode::MathBlock { literal } => out.push_str(literal),
        DocNode::Strong { .. } => {
            out.push_str(BOLD_ON);
            write_children(node, out);
            out.push_str(BOLD_OFF);
        }
        DocNode::Emphasis { .. } => {
            out.push_str(ITALIC_ON);
            write_children(node, out);
            out.push_str(ITALIC_OFF);
        }
        DocNode::SoftBreak | DocNode::HardBreak => out.push('\n'),
        DocNode::Document { children } => {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push_str("\n\n");
                }
                write_styled(child, out);
            }
        }
        DocNode::Paragraph { .. } | DocNode::Heading { .. } | DocNode::Container { .. } => {
            write_children(node, out)
        }
    }
}

/// Style one fragment of plain text.
///
/// Leading and trailing whitespace is kept as is, since markdown parsing would drop it and
/// fragments sit between rendered math.
pub fn apply_formatting(text: &str) -> String {
    let text = text.replace('\0', "");
    let core = text.trim();
    if core.is_empty() {
        return text;
    }
    let start = text.len() - text.trim_start().len();
    let end = start + core.len();

    let tree = MarkdownParser::plain().parse(&escape_block_marker(core));
    let styled = style_for_terminal(&tree)
        .replace("\\n", "\n")
        .replace("\\%", "%");

    let mut out = String::with_capacity(text.len() + styled.len());
    out.push_str(&text[..start]);
    out.push_str(&styled);
    out.push_str(&text[end..]);
    out
}

/// Style a line whose math has already been rendered.
///
/// Emphasis may open before a verbatim part and close after it. When the markdown itself holds
/// a placeholder character, or a placeholder does not survive parsing, every markdown part is
/// styled on its own instead.
pub fn format_line(parts: &[LinePart<'_>]) -> String {
    let mut template = String::new();
    let mut verbatim = Vec::new();
    for part in parts {
        match part {
            LinePart::Markdown(text) => {
                if text.contains(|c: char| c == SHIELD_OPEN || c == SHIELD_CLOSE) {
                    return format_parts_separately(parts);
                }
                template.push_str(text);
            }
            LinePart::Verbatim(text) => {
                template.push_str(&shield(verbatim.len()));
                verbatim.push(text.as_str());
            }
        }
    }

    let mut out = apply_formatting(&template);
    for (index, text) in verbatim.into_iter().enumerate() {
        let marker = shield(index);
        match out.find(&marker) {
            Some(at) => out.replace_range(at..at + marker.len(), text),
            None => {
                log::debug!("Placeholder {index} lost while styling, styling parts separately");
                return format_parts_separately(parts);
            }
        }
    }
    out
}

fn shield(index: usize) -> String {
    format!("{SHIELD_OPEN}{index}{SHIELD_CLOSE}")
}

fn format_parts_separately(parts: &[LinePart<'_>]) -> String {
    parts
        .iter()
        .map(|part| match part {
            LinePart::Markdown(text) => apply_formatting(text),
            LinePart::Verbatim(text) => text.clone(),
        })
        .collect()
}

/// Backslash-escape a leading marker that would turn the fragment into a block (heading,
/// list item, quote, fence, rule), so only inline markup is interpreted.
fn escape_block_marker(core: &str) -> Cow<'_, str> {
    let bytes = core.as_bytes();
    let spaced_after = |i: usize| bytes.get(i).map_or(true, |b| b.is_ascii_whitespace());
    let escape_at = match bytes.first() {
        Some(b'#' | b'>' | b'-' | b'+' | b'=') => Some(0),
        Some(b'*' | b'_') if spaced_after(1) || core.bytes().all(|b| b == bytes[0] || b == b' ') => {
            Some(0)
        }
        Some(b'`') if core.starts_with("```") => Some(0),
        Some(b'~') if core.starts_with("~~~") => Some(0),
        Some(b'0'..=b'9') => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            match bytes.get(digits) {
                Some(b'.' | b')') if spaced_after(digits + 1) => Some(digits),
                _ => None,
            }
        }
        _ => None,
    };
    match escape_at {
        Some(i) => Cow::Owned(format!("{}\\{}", &core[..i], &core[i..])),
        None => Cow::Borrowed(core),
    }
}
