//! The pipeline driver
//!
//!     Two modes, chosen once per run from [`Options::render_all_latex`]:
//!
//!     - Line streaming: every input line goes through the [`Segmenter`]. Math is rendered and
//!       encoded, then the line is styled for the terminal as a whole, and output is flushed
//!       after each line. A math segment that fails to render or encode is written back as its
//!       literal source, so one broken formula never takes the rest of the document with it.
//!       A line that is not valid UTF-8 and carries no math is written byte for byte.
//!     - Whole document: the input is read completely, bracket delimiters are normalized, the
//!       markdown is parsed and transduced into one LaTeX body, and that body is rendered as a
//!       single image. Any failure echoes the raw input and fails the run; there is no partial
//!       image.

use crate::color::ColorScheme;
use crate::emphasis::{format_line, LinePart};
use crate::encode::ImageEncoder;
use crate::error::PipelineError;
use crate::grammar::is_renderable;
use crate::latex::{normalize_math_delimiters, to_latex};
use crate::parser::{DocumentParser, MarkdownParser};
use crate::render::MathRenderer;
use crate::segment::{coalesce, Segment};
use crate::segmenter::{Diagnostic, Segmenter};
use std::borrow::Cow;
use std::io::{BufRead, Read, Write};

pub const DEFAULT_DPI: u32 = 300;

/// Per-run settings, already validated by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub scheme: ColorScheme,
    /// Image height in terminal rows; 0 picks the default for the math kind.
    pub target_rows: u32,
    pub dpi: u32,
    /// Render the whole input as one LaTeX document instead of line by line.
    pub render_all_latex: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            scheme: ColorScheme::default(),
            target_rows: 0,
            dpi: DEFAULT_DPI,
            render_all_latex: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    LineStreaming,
    WholeDocument,
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub lines: usize,
    pub math_segments: usize,
    pub rendered: usize,
    /// Math segments written back as source after a render or encode failure.
    pub fallbacks: usize,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Pipeline<R, E> {
    renderer: R,
    encoder: E,
    parser: Box<dyn DocumentParser>,
    options: Options,
}

impl<R: MathRenderer, E: ImageEncoder> Pipeline<R, E> {
    pub fn new(renderer: R, encoder: E, options: Options) -> Self {
        Pipeline {
            renderer,
            encoder,
            parser: Box::new(MarkdownParser::with_math()),
            options,
        }
    }

    /// Replace the markdown parser used in whole-document mode.
    pub fn with_parser(mut self, parser: impl DocumentParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn mode(&self) -> Mode {
        if self.options.render_all_latex {
            Mode::WholeDocument
        } else {
            Mode::LineStreaming
        }
    }

    /// Run in the configured mode.
    pub fn run<I: BufRead, W: Write>(
        &self,
        input: I,
        output: &mut W,
    ) -> Result<Report, PipelineError> {
        match self.mode() {
            Mode::LineStreaming => self.run_streaming(input, output),
            Mode::WholeDocument => self.run_document(input, output),
        }
    }

    pub fn run_streaming<I: BufRead, W: Write>(
        &self,
        mut input: I,
        output: &mut W,
    ) -> Result<Report, PipelineError> {
        let mut report = Report::default();
        let mut segmenter = Segmenter::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            report.lines += 1;

            let opened_in_math = segmenter.state().is_in_display_math();
            let segments = coalesce(segmenter.push_line(&line));
            let passthrough = matches!(line, Cow::Owned(_))
                && !opened_in_math
                && !segmenter.state().is_in_display_math()
                && segments.iter().all(|segment| !segment.is_math());
            if passthrough {
                log::debug!("line {}: not valid UTF-8, written unchanged", report.lines);
                output.write_all(&buf)?;
            } else {
                let text = self.render_line(&segments, &mut report);
                output.write_all(text.as_bytes())?;
            }
            output.flush()?;
        }

        let finished = segmenter.finish();
        for segment in &finished.segments {
            output.write_all(segment.source.as_bytes())?;
        }
        output.flush()?;
        report.diagnostics = finished.diagnostics;

        log::debug!(
            "Processed {} line(s): {} math segment(s), {} rendered, {} fallback(s)",
            report.lines,
            report.math_segments,
            report.rendered,
            report.fallbacks
        );
        Ok(report)
    }

    pub fn run_document<I: BufRead, W: Write>(
        &self,
        mut input: I,
        output: &mut W,
    ) -> Result<Report, PipelineError> {
        let mut raw = Vec::new();
        input.read_to_end(&mut raw)?;
        let source = String::from_utf8_lossy(&raw);
        let mut report = Report {
            lines: source.lines().count(),
            ..Report::default()
        };

        if source.trim().is_empty() {
            output.write_all(&raw)?;
            output.flush()?;
            return Ok(report);
        }

        match self.render_document(&source) {
            Ok(image) => {
                report.rendered = 1;
                output.write_all(image.as_bytes())?;
                output.flush()?;
                Ok(report)
            }
            Err(reason) => {
                output.write_all(&raw)?;
                output.flush()?;
                Err(PipelineError::Document(reason))
            }
        }
    }

    fn render_document(&self, source: &str) -> Result<String, String> {
        let normalized = normalize_math_delimiters(source);
        let tree = self.parser.parse(&normalized);
        let body = to_latex(&tree);
        log::debug!("Generated LaTeX body:\n{body}");

        let image = self
            .renderer
            .render_document(&body, &self.options.scheme, self.options.dpi)
            .map_err(|e| e.to_string())?;
        self.encoder
            .encode(&image, true, self.options.target_rows)
            .map_err(|e| e.to_string())
    }

    /// Terminal text for one line: math rendered in place, then emphasis styled across the
    /// whole line.
    fn render_line(&self, segments: &[Segment], report: &mut Report) -> String {
        let parts: Vec<LinePart<'_>> = segments
            .iter()
            .map(|segment| {
                if segment.is_math() {
                    LinePart::Verbatim(self.render_math(segment, report))
                } else {
                    LinePart::Markdown(&segment.content)
                }
            })
            .collect();
        format_line(&parts)
    }

    /// Rendered output for one math segment, or its source when it cannot be rendered.
    fn render_math(&self, segment: &Segment, report: &mut Report) -> String {
        report.math_segments += 1;
        if !is_renderable(&segment.content) {
            return segment.source.clone();
        }

        let display = segment.is_display();
        log::debug!("Rendering math (display: {display}): {}", segment.content);
        let rendered = self
            .renderer
            .render(
                &segment.content,
                &self.options.scheme,
                display,
                self.options.dpi,
            )
            .map_err(|e| e.to_string())
            .and_then(|image| {
                self.encoder
                    .encode(&image, display, self.options.target_rows)
                    .map_err(|e| e.to_string())
            });

        match rendered {
            Ok(text) => {
                report.rendered += 1;
                text
            }
            Err(reason) => {
                log::warn!("Failed to render '{}': {reason}", segment.source.trim_end());
                report.fallbacks += 1;
                segment.source.clone()
            }
        }
    }
}
