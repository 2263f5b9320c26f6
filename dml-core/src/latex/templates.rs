//! Compilable LaTeX documents around a single expression or a whole body.
//!
//! Both templates use the `standalone` class so the compiled page is cropped to its content,
//! define `usercolor` (the foreground) and `bgcolor` (its complement), and paint the page in
//! `bgcolor` so the rasterizer can key it out.

use crate::color::{ColorScheme, HexColor};

const MATH_PREAMBLE: &str = r"\documentclass[border=2pt,preview]{standalone}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{amsfonts}
\usepackage{mathtools}
\usepackage[dvipsnames,svgnames,table]{xcolor}
";

const DOCUMENT_PREAMBLE: &str = r"\documentclass[border=3pt,preview]{standalone}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{amsfonts}
\usepackage{mathtools}
\usepackage[dvipsnames,svgnames,table]{xcolor}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{lmodern}
\usepackage{verbatim}
";

fn color_definition(name: &str, color: &HexColor) -> String {
    format!("\\definecolor{{{name}}}{{HTML}}{{{}}}\n", color.digits())
}

fn assemble(preamble: &str, scheme: &ColorScheme, body: &str) -> String {
    let mut tex = String::with_capacity(preamble.len() + body.len() + 160);
    tex.push_str(preamble);
    tex.push_str(&color_definition("usercolor", &scheme.foreground));
    tex.push_str(&color_definition("bgcolor", &scheme.background));
    tex.push_str("\\begin{document}\n");
    tex.push_str("\\pagecolor{bgcolor}\n");
    tex.push_str("\\color{usercolor}\n");
    tex.push_str(body);
    tex.push_str("\n\\end{document}");
    tex
}

/// A document holding one math expression.
///
/// Display math is set as `\[ expr \]`, inline math as `$expr$`. The expression is trimmed
/// and is expected to be non-empty.
pub fn math_document(expression: &str, scheme: &ColorScheme, display: bool) -> String {
    let expression = expression.trim();
    let body = if display {
        format!("\\[ {expression} \\]")
    } else {
        format!("${expression}$")
    };
    assemble(MATH_PREAMBLE, scheme, &body)
}

/// A document holding a transduced LaTeX body.
pub fn full_document(body: &str, scheme: &ColorScheme) -> String {
    assemble(DOCUMENT_PREAMBLE, scheme, body)
}
