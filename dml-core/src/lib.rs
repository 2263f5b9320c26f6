//! Math-aware markdown for the terminal
//!
//!     This crate turns text mixing markdown emphasis and LaTeX math into terminal output:
//!     styled text with math rendered as inline images. It is a pure lib that powers the dml
//!     cli; it does not print and only reads the environment to locate external binaries.
//!
//! Architecture
//!
//!     Line mode is a streaming pipeline over segments:
//!
//!         line ──▶ segmenter ──▶ segments ──┬─ plain text ─────────────────────────┬─▶ emphasis ──▶ output
//!                                           └─ math ──▶ MathRenderer ──▶ ImageEncoder ┘
//!
//!     Emphasis runs once per line, after the math is rendered, so it can span a formula.
//!
//!     Whole-document mode goes through a document tree instead:
//!
//!         input ──▶ normalize delimiters ──▶ parser ──▶ DocNode ──▶ latex ──▶ one image
//!
//!     The file structure :
//!     .
//!     ├── color.rs           # color names, complements, fuzz heuristic
//!     ├── grammar.rs         # math delimiter pairs and matching
//!     ├── segment.rs         # the Segment data model
//!     ├── segmenter.rs       # two-state streaming segmenter
//!     ├── tree.rs            # DocNode sum type
//!     ├── parser.rs          # comrak-backed markdown parsing
//!     ├── latex              # transducer, preprocessing, templates
//!     ├── emphasis.rs        # ANSI bold/italic
//!     ├── render             # MathRenderer and the pdflatex renderer
//!     ├── encode.rs          # ImageEncoder and the kitty encoder
//!     ├── pipeline.rs        # the driver for both modes
//!     └── error.rs
//!
//! Collaborators
//!
//!     Rendering and encoding are traits ([`MathRenderer`], [`ImageEncoder`]) so the pipeline
//!     can be driven without a TeX installation. The concrete [`LatexRenderer`] needs the
//!     `native-render` feature (on by default) plus `pdflatex` and ImageMagick at runtime.
//!
//! Failure containment
//!
//!     A math segment that fails to render or encode is written back as its source text and
//!     the run continues. Only I/O failures and whole-document failures end a run.

pub mod color;
pub mod emphasis;
pub mod encode;
pub mod error;
pub mod grammar;
pub mod latex;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod segment;
pub mod segmenter;
pub mod tree;

pub use color::{ColorScheme, FuzzPolicy, HexColor};
pub use encode::{ImageEncoder, KittyEncoder};
pub use error::{EncodeError, PipelineError, RenderError};
pub use parser::{DocumentParser, MarkdownParser};
pub use pipeline::{Mode, Options, Pipeline, Report};
#[cfg(feature = "native-render")]
pub use render::LatexRenderer;
pub use render::MathRenderer;
pub use segment::{Segment, SegmentKind};
pub use segmenter::{segment_text, Segmenter, SegmenterState};
pub use tree::DocNode;
