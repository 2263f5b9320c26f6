//! Error types for rendering, encoding and pipeline operations

use std::fmt;
use std::path::PathBuf;

/// Errors raised by a [`MathRenderer`](crate::render::MathRenderer)
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The expression was empty or whitespace-only
    EmptyExpression,
    /// A required external binary could not be located
    ToolNotFound(String),
    /// Filesystem error while preparing or collecting the render
    Io(String),
    /// An external tool exited unsuccessfully
    ToolFailed {
        tool: String,
        status: String,
        stdout: String,
        stderr: String,
        workdir: Option<PathBuf>,
    },
    /// The tool reported success but produced no output file
    MissingOutput(String),
    /// The renderer does not support the requested operation
    NotSupported(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::EmptyExpression => write!(f, "Empty LaTeX content"),
            RenderError::ToolNotFound(tool) => write!(f, "Unable to locate '{tool}'"),
            RenderError::Io(msg) => write!(f, "I/O error: {msg}"),
            RenderError::ToolFailed {
                tool,
                status,
                stdout,
                stderr,
                workdir,
            } => {
                write!(f, "{tool} failed ({status})")?;
                if !stdout.trim().is_empty() {
                    write!(f, "\n{tool} stdout:\n{stdout}")?;
                }
                if !stderr.trim().is_empty() {
                    write!(f, "\n{tool} stderr:\n{stderr}")?;
                }
                if let Some(dir) = workdir {
                    write!(f, "\nWork dir kept at: {}", dir.display())?;
                }
                Ok(())
            }
            RenderError::MissingOutput(path) => {
                write!(f, "Renderer reported success but did not create '{path}'")
            }
            RenderError::NotSupported(msg) => write!(f, "Operation not supported: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Errors raised by an [`ImageEncoder`](crate::encode::ImageEncoder)
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    EmptyImage,
    /// The bytes are not a PNG image
    InvalidImage(String),
    Io(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::EmptyImage => write!(f, "Image data is empty"),
            EncodeError::InvalidImage(msg) => write!(f, "Invalid image: {msg}"),
            EncodeError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Fatal errors surfaced by the [`Pipeline`](crate::pipeline::Pipeline)
///
/// Per-segment render and encode failures never appear here; they are
/// recovered in place and only counted in the run report.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Reading input or writing output failed
    Io(String),
    /// Whole-document rendering failed; the raw input has already been echoed
    Document(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(msg) => write!(f, "I/O error: {msg}"),
            PipelineError::Document(reason) => {
                write!(f, "Error in full LaTeX rendering mode: {reason}")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err.to_string())
    }
}
