//! Rendering through `pdflatex` and ImageMagick `convert`.
//!
//! Each render writes a standalone document into a fresh temporary directory, compiles it to
//! PDF, rasterizes the PDF at the requested density and keys the page color out to
//! transparency. The directory is removed on success and kept when a tool fails so its logs
//! can be inspected.

use super::MathRenderer;
use crate::color::{ColorScheme, FuzzPolicy};
use crate::error::RenderError;
use crate::latex::{full_document, math_document};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use which::which;

const PDFLATEX_ENV: &str = "DML_PDFLATEX_BIN";
const CONVERT_ENV: &str = "DML_CONVERT_BIN";

/// Renderer backed by a local TeX installation.
#[derive(Debug, Clone, Default)]
pub struct LatexRenderer {
    pdflatex: Option<PathBuf>,
    convert: Option<PathBuf>,
    fuzz: FuzzPolicy,
}

impl LatexRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this `pdflatex` binary instead of searching for one.
    pub fn with_pdflatex(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdflatex = Some(path.into());
        self
    }

    /// Use this ImageMagick `convert` binary instead of searching for one.
    pub fn with_convert(mut self, path: impl Into<PathBuf>) -> Self {
        self.convert = Some(path.into());
        self
    }

    pub fn with_fuzz(mut self, fuzz: FuzzPolicy) -> Self {
        self.fuzz = fuzz;
        self
    }

    fn compile(
        &self,
        tex: &str,
        stem: &str,
        scheme: &ColorScheme,
        dpi: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let pdflatex = resolve_tool(self.pdflatex.as_deref(), PDFLATEX_ENV, &["pdflatex"])?;
        let convert = resolve_tool(self.convert.as_deref(), CONVERT_ENV, &["convert", "magick"])?;

        let dir = tempfile::Builder::new()
            .prefix("dml")
            .tempdir()
            .map_err(|e| RenderError::Io(format!("Temp dir error: {e}")))?;
        let tex_path = dir.path().join(format!("{stem}.tex"));
        let pdf_path = dir.path().join(format!("{stem}.pdf"));
        let png_path = dir.path().join(format!("{stem}.png"));
        fs::write(&tex_path, tex)?;
        log::debug!("Compiling {} with {}", tex_path.display(), pdflatex.display());

        let output = Command::new(&pdflatex)
            .arg("-interaction=nonstopmode")
            .arg("-output-directory")
            .arg(dir.path())
            .arg(&tex_path)
            .output()
            .map_err(|e| launch_error(&pdflatex, e))?;
        if !output.status.success() {
            return Err(tool_failed("pdflatex", &output, dir));
        }
        if !pdf_path.exists() {
            return Err(RenderError::MissingOutput(pdf_path.display().to_string()));
        }

        let fuzz = format!("{:.1}%", self.fuzz.fuzz_level(&scheme.foreground));
        let transparent = scheme.transparency_key().to_string();
        log::debug!("Rasterizing at {dpi} dpi, fuzz {fuzz}, keying out {transparent}");

        let output = Command::new(&convert)
            .arg("-density")
            .arg(dpi.to_string())
            .args(["-alpha", "on", "-background", "none", "-trim", "+repage"])
            .arg("-fuzz")
            .arg(&fuzz)
            .arg("-transparent")
            .arg(&transparent)
            .arg(&pdf_path)
            .arg(&png_path)
            .output()
            .map_err(|e| launch_error(&convert, e))?;
        if !output.status.success() {
            return Err(tool_failed("convert", &output, dir));
        }
        if !png_path.exists() {
            let path = png_path.display().to_string();
            let kept = dir.keep();
            log::warn!("Work dir kept at: {}", kept.display());
            return Err(RenderError::MissingOutput(path));
        }

        let image = fs::read(&png_path)?;
        log::debug!("Rendered {} bytes of PNG", image.len());
        Ok(image)
    }
}

impl MathRenderer for LatexRenderer {
    fn render(
        &self,
        expression: &str,
        scheme: &ColorScheme,
        display: bool,
        dpi: u32,
    ) -> Result<Vec<u8>, RenderError> {
        if expression.trim().is_empty() {
            return Err(RenderError::EmptyExpression);
        }
        let tex = math_document(expression, scheme, display);
        self.compile(&tex, "eq", scheme, dpi)
    }

    fn render_document(
        &self,
        body: &str,
        scheme: &ColorScheme,
        dpi: u32,
    ) -> Result<Vec<u8>, RenderError> {
        if body.trim().is_empty() {
            return Err(RenderError::EmptyExpression);
        }
        let tex = full_document(body, scheme);
        self.compile(&tex, "fulldoc", scheme, dpi)
    }
}

fn launch_error(tool: &Path, err: std::io::Error) -> RenderError {
    RenderError::Io(format!("Failed to launch {}: {err}", tool.display()))
}

fn tool_failed(tool: &str, output: &Output, dir: TempDir) -> RenderError {
    RenderError::ToolFailed {
        tool: tool.to_string(),
        status: output.status.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        workdir: Some(dir.keep()),
    }
}

/// Locate a binary: explicit path first, then the override variable, then `PATH`.
fn resolve_tool(
    configured: Option<&Path>,
    env_var: &str,
    candidates: &[&str],
) -> Result<PathBuf, RenderError> {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env::var_os(env_var) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    for candidate in candidates {
        if let Ok(path) = which(candidate) {
            return Ok(path);
        }
    }

    Err(RenderError::ToolNotFound(format!(
        "{} (set {env_var} or install it)",
        candidates.join(" or ")
    )))
}
