//! Segments: the typed units produced by the segmenter

use crate::grammar::Delimiter;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    PlainText,
    InlineMath,
    DisplayMath,
}

/// An ordered, typed piece of the input.
///
/// `content` is what gets rendered (the plain text, or the math body without delimiters);
/// `source` is the exact input text the segment covers. Concatenating the `source` of every
/// segment reproduces the input, and `source` is what the pipeline writes when rendering a
/// math segment fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub content: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<Delimiter>,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Segment {
            kind: SegmentKind::PlainText,
            content: text.clone(),
            source: text,
            delimiter: None,
        }
    }

    /// A math segment; the kind follows from the delimiter.
    pub fn math(delimiter: Delimiter, content: impl Into<String>, source: impl Into<String>) -> Self {
        let kind = if delimiter.is_display() {
            SegmentKind::DisplayMath
        } else {
            SegmentKind::InlineMath
        };
        Segment {
            kind,
            content: content.into(),
            source: source.into(),
            delimiter: Some(delimiter),
        }
    }

    pub fn is_math(&self) -> bool {
        !matches!(self.kind, SegmentKind::PlainText)
    }

    pub fn is_display(&self) -> bool {
        matches!(self.kind, SegmentKind::DisplayMath)
    }
}

/// Concatenate the literal source of `segments`.
pub fn reconstruct(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.source.as_str()).collect()
}

/// Merge adjacent plain-text segments.
///
/// Segmenting runs over line fragments, so one run of text can arrive split in two; the
/// emphasis pass wants it whole.
pub fn coalesce(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match merged.last_mut() {
            Some(last) if !last.is_math() && !segment.is_math() => {
                last.content.push_str(&segment.content);
                last.source.push_str(&segment.source);
            }
            _ => merged.push(segment),
        }
    }
    merged
}
