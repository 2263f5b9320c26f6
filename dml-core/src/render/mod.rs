//! Math rendering collaborators
//!
//!     The pipeline never compiles LaTeX itself; it hands expressions to a [`MathRenderer`] and
//!     gets PNG bytes back. Callers reject empty expressions before calling `render`, but
//!     implementations still refuse them with [`RenderError::EmptyExpression`].
//!
//!     [`LatexRenderer`] (feature `native-render`) shells out to `pdflatex` and ImageMagick.

use crate::color::ColorScheme;
use crate::error::RenderError;

#[cfg(feature = "native-render")]
mod latex;

#[cfg(feature = "native-render")]
pub use latex::LatexRenderer;

/// Turns LaTeX into image bytes.
pub trait MathRenderer {
    /// Render one math expression (body without delimiters).
    fn render(
        &self,
        expression: &str,
        scheme: &ColorScheme,
        display: bool,
        dpi: u32,
    ) -> Result<Vec<u8>, RenderError>;

    /// Render a whole transduced LaTeX body as one image.
    fn render_document(
        &self,
        _body: &str,
        _scheme: &ColorScheme,
        _dpi: u32,
    ) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::NotSupported(
            "this renderer only handles single expressions".to_string(),
        ))
    }
}

impl<R: MathRenderer + ?Sized> MathRenderer for &R {
    fn render(
        &self,
        expression: &str,
        scheme: &ColorScheme,
        display: bool,
        dpi: u32,
    ) -> Result<Vec<u8>, RenderError> {
        (**self).render(expression, scheme, display, dpi)
    }

    fn render_document(
        &self,
        body: &str,
        scheme: &ColorScheme,
        dpi: u32,
    ) -> Result<Vec<u8>, RenderError> {
        (**self).render_document(body, scheme, dpi)
    }
}
