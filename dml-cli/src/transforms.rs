//! Inspect transforms
//!
//! Each transform runs part of the dml core on a source text and prints an intermediate
//! representation. None of them needs a TeX installation.
//!
//! - `segments-json`: the segment stream and diagnostics as JSON (default)
//! - `segments-text`: one line per segment
//! - `tree`: the markdown document tree used in whole-document mode
//! - `latex`: the LaTeX body produced from that tree
//! - `latex-document`: the body wrapped in the full document template
//!
//! Example: `dml inspect notes.md latex`

use dml_core::color::ColorScheme;
use dml_core::latex::{full_document, normalize_math_delimiters, to_latex};
use dml_core::parser::{DocumentParser, MarkdownParser};
use dml_core::segment::{Segment, SegmentKind};
use dml_core::segmenter::segment_text;
use dml_core::tree::{dump, DocNode};
use serde_json::json;

/// All available inspect transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &[
    "segments-json",
    "segments-text",
    "tree",
    "latex",
    "latex-document",
];

pub const DEFAULT_TRANSFORM: &str = "segments-json";

/// Execute a named transform on a source text.
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    scheme: &ColorScheme,
) -> Result<String, String> {
    match transform_name {
        "segments-json" => {
            let finished = segment_text(source);
            let diagnostics: Vec<String> =
                finished.diagnostics.iter().map(|d| d.to_string()).collect();
            let value = json!({
                "segments": finished.segments,
                "diagnostics": diagnostics,
            });
            let mut out = serde_json::to_string_pretty(&value)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            out.push('\n');
            Ok(out)
        }
        "segments-text" => {
            let finished = segment_text(source);
            let mut out: String = finished.segments.iter().map(segment_line).collect();
            for diagnostic in &finished.diagnostics {
                out.push_str(&format!("warning: {diagnostic}\n"));
            }
            Ok(out)
        }
        "tree" => Ok(dump(&parse_document(source))),
        "latex" => Ok(to_latex(&parse_document(source))),
        "latex-document" => {
            let body = to_latex(&parse_document(source));
            let mut out = full_document(&body, scheme);
            out.push('\n');
            Ok(out)
        }
        other => Err(format!(
            "Unknown transform '{other}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn parse_document(source: &str) -> DocNode {
    MarkdownParser::with_math().parse(&normalize_math_delimiters(source))
}

fn segment_line(segment: &Segment) -> String {
    let kind = match segment.kind {
        SegmentKind::PlainText => "plain",
        SegmentKind::InlineMath => "inline",
        SegmentKind::DisplayMath => "display",
    };
    match segment.delimiter {
        Some(delimiter) => format!(
            "{kind:<8}{:<6}{:?}\n",
            delimiter.open(),
            segment.content
        ),
        None => format!("{kind:<8}{:<6}{:?}\n", "", segment.content),
    }
}
