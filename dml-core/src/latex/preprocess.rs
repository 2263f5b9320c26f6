use once_cell::sync::Lazy;
use regex::Regex;

static DISPLAY_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\\[(.+?)\\\]").expect("valid display bracket regex"));
static INLINE_PARENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\\((.+?)\\\)").expect("valid inline paren regex"));

/// Rewrite `\[..\]` as `$$..$$` and `\(..\)` as `$..$`, trimming the bodies.
///
/// Matches may span lines and are non-greedy.
pub fn normalize_math_delimiters(source: &str) -> String {
    let display = DISPLAY_BRACKETS.replace_all(source, |caps: &regex::Captures<'_>| {
        format!("$${}$$", caps[1].trim())
    });
    INLINE_PARENS
        .replace_all(&display, |caps: &regex::Captures<'_>| {
            format!("${}$", caps[1].trim())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_both_bracket_styles() {
        assert_eq!(
            normalize_math_delimiters(r"a \( x \) b \[y\]"),
            "a $x$ b $$y$$"
        );
    }

    #[test]
    fn display_blocks_may_span_lines() {
        assert_eq!(
            normalize_math_delimiters("\\[\n\\sum_i i\n\\]\nafter"),
            "$$\\sum_i i$$\nafter"
        );
    }

    #[test]
    fn matching_is_non_greedy() {
        assert_eq!(
            normalize_math_delimiters(r"\(a\) and \(b\)"),
            "$a$ and $b$"
        );
    }

    #[test]
    fn leaves_dollar_math_alone() {
        assert_eq!(normalize_math_delimiters("$x$ $$y$$"), "$x$ $$y$$");
    }
}
