//! Streaming segmentation of mixed text and math
//!
//!     The segmenter is a two-state machine driven one line at a time:
//!
//!         Normal ──(display open, no close on the line)──▶ InDisplayMath
//!         InDisplayMath ──(matching close)──▶ Normal, rest of the line rescanned
//!         InDisplayMath ──(no close)──▶ InDisplayMath, line buffered
//!
//!     [`step`] is the pure transition function: it takes the state and one line and returns
//!     the next state plus the segments completed on that line. It never fails and never looks
//!     past the line it is given. [`Segmenter`] wraps it with line numbering, logging and the
//!     end-of-input flush.
//!
//!     Lines are expected to carry their terminator (as `BufRead::read_line` returns them). A
//!     buffered line without one still contributes a line break to the math body, so feeding
//!     `str::lines()` output yields the same bodies.
//!
//!     Data is never dropped. An unterminated display block at end of input comes back as plain
//!     text, opening delimiter included, together with a [`Diagnostic`].

use crate::grammar::{find_close, find_display_open, find_inline_open, is_renderable, Delimiter};
use crate::segment::Segment;
use std::fmt;

/// Segmenter state between lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SegmenterState {
    #[default]
    Normal,
    InDisplayMath(OpenBlock),
}

impl SegmenterState {
    pub fn is_in_display_math(&self) -> bool {
        matches!(self, SegmenterState::InDisplayMath(_))
    }
}

/// A display block whose close has not been seen yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBlock {
    delimiter: Delimiter,
    body: String,
    source: String,
    opened_on_line: usize,
}

impl OpenBlock {
    /// Start a block; `rest` is whatever followed the open delimiter on its line.
    fn open(delimiter: Delimiter, rest: &str) -> Self {
        let mut block = OpenBlock {
            delimiter,
            body: String::new(),
            source: format!("{}{}", delimiter.open(), rest),
            opened_on_line: 0,
        };
        if is_renderable(rest) {
            block.push_body_line(rest);
        }
        block
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Math body buffered so far.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Literal input buffered so far, starting with the open delimiter.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn push_line(&mut self, line: &str) {
        self.source.push_str(line);
        self.push_body_line(line);
    }

    fn push_body_line(&mut self, text: &str) {
        self.body.push_str(text);
        if !text.ends_with('\n') {
            self.body.push('\n');
        }
    }

    /// Close the block with `before_close` (text on the closing line ahead of the delimiter).
    fn close(mut self, before_close: &str) -> Segment {
        if is_renderable(before_close) {
            self.body.push_str(before_close);
        }
        self.source.push_str(before_close);
        self.source.push_str(self.delimiter.close());
        if is_renderable(&self.body) {
            Segment::math(self.delimiter, self.body, self.source)
        } else {
            Segment::plain(self.source)
        }
    }
}

/// Advance the state machine by one line.
pub fn step(state: SegmenterState, line: &str) -> (SegmenterState, Vec<Segment>) {
    let mut segments = Vec::new();
    let next = match state {
        SegmenterState::Normal => scan_fragment(line, &mut segments),
        SegmenterState::InDisplayMath(mut block) => {
            match find_close(line, 0, block.delimiter) {
                Some(close) => {
                    let after = close + block.delimiter.close().len();
                    segments.push(block.close(&line[..close]));
                    scan_fragment(&line[after..], &mut segments)
                }
                None => {
                    block.push_line(line);
                    SegmenterState::InDisplayMath(block)
                }
            }
        }
    };
    (next, segments)
}

/// End-of-input flush: an open block becomes literal plain text.
pub fn flush(state: SegmenterState) -> Option<Segment> {
    match state {
        SegmenterState::Normal => None,
        SegmenterState::InDisplayMath(block) => Some(Segment::plain(block.source)),
    }
}

/// Segment a fragment that starts in the Normal state.
///
/// Display delimiters are located first. Text ahead of a display open goes through inline
/// extraction; a display block that closes on this fragment becomes a math segment (or literal
/// text when its body is blank) and scanning resumes after it. An unclosed display open turns
/// the rest of the fragment into an open block.
fn scan_fragment(fragment: &str, segments: &mut Vec<Segment>) -> SegmenterState {
    let mut pos = 0;

    while let Some((open, delimiter)) = find_display_open(fragment, pos) {
        extract_inline(&fragment[pos..open], segments);
        let body_start = open + delimiter.open().len();
        match find_close(fragment, body_start, delimiter) {
            Some(close) => {
                let end = close + delimiter.close().len();
                let body = &fragment[body_start..close];
                if is_renderable(body) {
                    segments.push(Segment::math(delimiter, body.trim(), &fragment[open..end]));
                } else {
                    push_plain(segments, &fragment[open..end]);
                }
                pos = end;
            }
            None => {
                return SegmenterState::InDisplayMath(OpenBlock::open(
                    delimiter,
                    &fragment[body_start..],
                ));
            }
        }
    }

    extract_inline(&fragment[pos..], segments);
    SegmenterState::Normal
}

/// Split `text`, which holds no display delimiters, into plain text and inline math.
///
/// An inline open without a close, or with a blank body, stays literal.
fn extract_inline(text: &str, segments: &mut Vec<Segment>) {
    let mut pending = 0;
    let mut search = 0;

    while let Some((open, delimiter)) = find_inline_open(text, search) {
        let body_start = open + delimiter.open().len();
        match find_close(text, body_start, delimiter) {
            Some(close) => {
                let end = close + delimiter.close().len();
                let body = &text[body_start..close];
                if is_renderable(body) {
                    push_plain(segments, &text[pending..open]);
                    segments.push(Segment::math(delimiter, body.trim(), &text[open..end]));
                    pending = end;
                }
                search = end;
            }
            None => search = body_start,
        }
    }

    push_plain(segments, &text[pending..]);
}

/// Append plain text, extending the previous segment when it is plain too.
fn push_plain(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if !last.is_math() => {
            last.content.push_str(text);
            last.source.push_str(text);
        }
        _ => segments.push(Segment::plain(text)),
    }
}

/// Recoverable problems noticed while segmenting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnterminatedDisplayMath { delimiter: Delimiter, line: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnterminatedDisplayMath { delimiter, line } => write!(
                f,
                "Reached end of input inside display math opened with '{}' on line {line}; emitting it as plain text",
                delimiter.open()
            ),
        }
    }
}

/// Result of flushing a [`Segmenter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Finished {
    pub segments: Vec<Segment>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Line-fed wrapper around [`step`].
#[derive(Debug, Default)]
pub struct Segmenter {
    state: SegmenterState,
    line_number: usize,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SegmenterState {
        &self.state
    }

    /// Number of lines pushed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Feed one line, returning the segments it completed.
    pub fn push_line(&mut self, line: &str) -> Vec<Segment> {
        self.line_number += 1;
        let (mut next, segments) = step(std::mem::take(&mut self.state), line);
        if let SegmenterState::InDisplayMath(block) = &mut next {
            if block.opened_on_line == 0 {
                block.opened_on_line = self.line_number;
            }
        }
        log::debug!(
            "line {}: {} segment(s), in display math: {}",
            self.line_number,
            segments.len(),
            next.is_in_display_math()
        );
        self.state = next;
        segments
    }

    /// Signal end of input.
    pub fn finish(self) -> Finished {
        let mut finished = Finished::default();
        if let SegmenterState::InDisplayMath(block) = &self.state {
            let diagnostic = Diagnostic::UnterminatedDisplayMath {
                delimiter: block.delimiter,
                line: block.opened_on_line,
            };
            log::warn!("{diagnostic}");
            finished.diagnostics.push(diagnostic);
        }
        finished.segments.extend(flush(self.state));
        finished
    }
}

/// Segment a whole text in one call, line by line.
pub fn segment_text(text: &str) -> Finished {
    let mut segmenter = Segmenter::new();
    let mut segments = Vec::new();
    for line in text.split_inclusive('\n') {
        segments.extend(segmenter.push_line(line));
    }
    let mut finished = segmenter.finish();
    segments.append(&mut finished.segments);
    finished.segments = segments;
    finished
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{reconstruct, SegmentKind};
    use proptest::prelude::*;

    fn kinds(segments: &[Segment]) -> Vec<SegmentKind> {
        segments.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn lone_inline_math_is_one_segment() {
        let (state, segments) = step(SegmenterState::Normal, "$E=mc^2$");
        assert_eq!(state, SegmenterState::Normal);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::InlineMath);
        assert_eq!(segments[0].content, "E=mc^2");
    }

    #[test]
    fn inline_matching_is_non_greedy() {
        let (_, segments) = step(SegmenterState::Normal, "$a$ $b$");
        assert_eq!(
            kinds(&segments),
            vec![
                SegmentKind::InlineMath,
                SegmentKind::PlainText,
                SegmentKind::InlineMath
            ]
        );
        assert_eq!(segments[0].content, "a");
        assert_eq!(segments[2].content, "b");
    }

    #[test]
    fn both_inline_styles_interleave_in_source_order() {
        let (_, segments) = step(SegmenterState::Normal, r"x \(a\) y $b$ z");
        let contents: Vec<_> = segments.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["x ", "a", " y ", "b", " z"]);
    }

    #[test]
    fn math_bodies_are_trimmed() {
        let (_, segments) = step(SegmenterState::Normal, r"\[  x^2  \]");
        assert_eq!(segments[0].kind, SegmentKind::DisplayMath);
        assert_eq!(segments[0].content, "x^2");
        assert_eq!(segments[0].source, r"\[  x^2  \]");
    }

    #[test]
    fn single_line_display_math_keeps_surrounding_text() {
        let (state, segments) = step(SegmenterState::Normal, "before $$x$$ after $y$\n");
        assert_eq!(state, SegmenterState::Normal);
        assert_eq!(
            kinds(&segments),
            vec![
                SegmentKind::PlainText,
                SegmentKind::DisplayMath,
                SegmentKind::PlainText,
                SegmentKind::InlineMath,
                SegmentKind::PlainText
            ]
        );
    }

    #[test]
    fn empty_bodies_pass_through_literally() {
        for line in ["$$$$", "$ $", r"\(\)", "a $$ $$ b"] {
            let (state, segments) = step(SegmenterState::Normal, line);
            assert_eq!(state, SegmenterState::Normal);
            assert_eq!(segments, vec![Segment::plain(line)], "line {line:?}");
        }
    }

    #[test]
    fn unmatched_inline_open_is_literal() {
        let (state, segments) = step(SegmenterState::Normal, "costs $5 today\n");
        assert_eq!(state, SegmenterState::Normal);
        assert_eq!(segments, vec![Segment::plain("costs $5 today\n")]);
    }

    #[test]
    fn display_block_wins_over_an_unmatched_dollar() {
        let (state, segments) = step(SegmenterState::Normal, "cost $5 and $$x^2$$ here\n");
        assert_eq!(state, SegmenterState::Normal);
        assert_eq!(
            segments,
            vec![
                Segment::plain("cost $5 and "),
                Segment::math(Delimiter::DoubleDollar, "x^2", "$$x^2$$"),
                Segment::plain(" here\n"),
            ]
        );
    }

    #[test]
    fn unmatched_dollar_before_multi_line_block() {
        let finished = segment_text("price $5 then $$\n\\sum_i i\n$$\nafter\n");
        assert!(finished.diagnostics.is_empty());
        assert_eq!(
            kinds(&finished.segments),
            vec![
                SegmentKind::PlainText,
                SegmentKind::DisplayMath,
                SegmentKind::PlainText,
                SegmentKind::PlainText
            ]
        );
        assert_eq!(finished.segments[0].content, "price $5 then ");
        assert_eq!(finished.segments[1].content, "\\sum_i i\n");
        assert_eq!(
            reconstruct(&finished.segments),
            "price $5 then $$\n\\sum_i i\n$$\nafter\n"
        );
    }

    #[test]
    fn inline_math_and_display_block_share_a_line() {
        let (_, segments) = step(SegmenterState::Normal, "$a$ then $$b$$ and \\(c\\)\n");
        let contents: Vec<_> = segments.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["a", " then ", "b", " and ", "c", "\n"]);
        assert_eq!(segments[2].kind, SegmentKind::DisplayMath);
    }

    #[test]
    fn multi_line_display_math() {
        let (state, segments) = step(SegmenterState::Normal, "$$\n");
        assert!(state.is_in_display_math());
        assert!(segments.is_empty());

        let (state, segments) = step(state, "\\sum_{i=1}^n i\n");
        assert!(state.is_in_display_math());
        assert!(segments.is_empty());

        let (state, segments) = step(state, "$$");
        assert_eq!(state, SegmenterState::Normal);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::DisplayMath);
        assert_eq!(segments[0].content, "\\sum_{i=1}^n i\n");
        assert_eq!(segments[0].source, "$$\n\\sum_{i=1}^n i\n$$");
    }

    #[test]
    fn lines_without_terminators_give_the_same_body() {
        let mut segmenter = Segmenter::new();
        let mut segments = Vec::new();
        for line in "$$\n\\sum_{i=1}^n i\n$$".lines() {
            segments.extend(segmenter.push_line(line));
        }
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content, "\\sum_{i=1}^n i\n");
    }

    #[test]
    fn text_before_open_is_emitted_and_rest_is_buffered() {
        let (state, segments) = step(SegmenterState::Normal, "see $x$ then \\[ a +\n");
        assert_eq!(
            kinds(&segments),
            vec![
                SegmentKind::PlainText,
                SegmentKind::InlineMath,
                SegmentKind::PlainText
            ]
        );
        match &state {
            SegmenterState::InDisplayMath(block) => {
                assert_eq!(block.delimiter(), Delimiter::Bracket);
                assert_eq!(block.body(), " a +\n");
                assert_eq!(block.source(), "\\[ a +\n");
            }
            other => panic!("expected open block, got {other:?}"),
        }

        let (state, segments) = step(state, "b \\] and *more* $y$\n");
        assert_eq!(state, SegmenterState::Normal);
        assert_eq!(segments[0].content, " a +\nb ");
        assert_eq!(
            kinds(&segments[1..]),
            vec![
                SegmentKind::PlainText,
                SegmentKind::InlineMath,
                SegmentKind::PlainText
            ]
        );
    }

    #[test]
    fn close_must_match_the_opening_style() {
        let (state, _) = step(SegmenterState::Normal, "\\[\n");
        let (state, segments) = step(state, "a $$ b\n");
        assert!(state.is_in_display_math());
        assert!(segments.is_empty());
        let (state, segments) = step(state, "\\]\n");
        assert_eq!(state, SegmenterState::Normal);
        assert_eq!(segments[0].content, "a $$ b\n");
    }

    #[test]
    fn remainder_after_close_can_open_another_block() {
        let (state, _) = step(SegmenterState::Normal, "$$\n");
        let (state, segments) = step(state, "a $$ text $$\n");
        assert_eq!(segments.len(), 2);
        assert!(state.is_in_display_math());
    }

    #[test]
    fn blank_block_is_literal_text() {
        let finished = segment_text("$$\n\n$$\n");
        assert_eq!(reconstruct(&finished.segments), "$$\n\n$$\n");
        assert!(finished.segments.iter().all(|s| !s.is_math()));
    }

    #[test]
    fn unterminated_block_is_flushed_verbatim_with_diagnostic() {
        let finished = segment_text("intro\n$$unterminated");
        assert_eq!(reconstruct(&finished.segments), "intro\n$$unterminated");
        assert!(finished.segments.iter().all(|s| !s.is_math()));
        assert!(finished
            .segments
            .iter()
            .any(|s| s.content.contains("$$unterminated")));
        assert_eq!(
            finished.diagnostics,
            vec![Diagnostic::UnterminatedDisplayMath {
                delimiter: Delimiter::DoubleDollar,
                line: 2
            }]
        );
    }

    #[test]
    fn opening_line_is_tracked_across_lines() {
        let mut segmenter = Segmenter::new();
        segmenter.push_line("a\n");
        segmenter.push_line("b \\[\n");
        segmenter.push_line("x\n");
        let finished = segmenter.finish();
        assert_eq!(
            finished.diagnostics,
            vec![Diagnostic::UnterminatedDisplayMath {
                delimiter: Delimiter::Bracket,
                line: 2
            }]
        );
        assert_eq!(finished.segments, vec![Segment::plain("\\[\nx\n")]);
    }

    #[test]
    fn flush_of_normal_state_is_empty() {
        assert_eq!(flush(SegmenterState::Normal), None);
        assert!(segment_text("plain\n").diagnostics.is_empty());
    }

    proptest! {
        #[test]
        fn segments_reconstruct_the_input(text in "[a-z $\\\\()\\[\\]\n*_]{0,64}") {
            let finished = segment_text(&text);
            prop_assert_eq!(reconstruct(&finished.segments), text);
        }

        #[test]
        fn well_formed_display_block_is_always_found(
            prefix in "([a-z ()*]{1,4}\\$?){0,6}",
            body in "[a-z+^_=]{1,10}",
            suffix in "([a-z ()*]{1,4}\\$?){0,6}",
        ) {
            let line = format!("{prefix} $${body}$$ {suffix}\n");
            let finished = segment_text(&line);
            let display: Vec<_> = finished.segments.iter().filter(|s| s.is_display()).collect();
            prop_assert_eq!(display.len(), 1, "line {:?}", line);
            prop_assert_eq!(display[0].content.as_str(), body.as_str());
            prop_assert!(finished.diagnostics.is_empty());
        }

        #[test]
        fn math_segments_never_have_blank_content(text in "[a-z $\\\\()\\[\\]\n]{0,64}") {
            let finished = segment_text(&text);
            for segment in finished.segments.iter().filter(|s| s.is_math()) {
                prop_assert!(!segment.content.trim().is_empty());
            }
        }
    }
}
