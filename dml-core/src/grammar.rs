//! Math delimiter grammar
//!
//!     Four delimiter pairs are recognized:
//!
//!     | Open | Close | Kind    | Multi-line |
//!     |------|-------|---------|------------|
//!     | `$`  | `$`   | inline  | no         |
//!     | `$$` | `$$`  | display | yes        |
//!     | `\(` | `\)`  | inline  | no         |
//!     | `\[` | `\]`  | display | yes        |
//!
//!     Scanning is byte-oriented (every delimiter is ASCII, so byte offsets are always char
//!     boundaries). A backslash escapes the following byte: `\$` is a literal dollar and `\\(`
//!     is an escaped backslash followed by a literal parenthesis.
//!
//!     Display and inline opens are searched separately. A `$$` is always a display delimiter:
//!     it is never read as two inline `$`, neither as an open nor as a close.

use serde::Serialize;

/// A recognized delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Delimiter {
    /// `$...$`
    Dollar,
    /// `$$...$$`
    DoubleDollar,
    /// `\(...\)`
    Paren,
    /// `\[...\]`
    Bracket,
}

impl Delimiter {
    pub const ALL: [Delimiter; 4] = [
        Delimiter::Dollar,
        Delimiter::DoubleDollar,
        Delimiter::Paren,
        Delimiter::Bracket,
    ];

    pub fn open(&self) -> &'static str {
        match self {
            Delimiter::Dollar => "$",
            Delimiter::DoubleDollar => "$$",
            Delimiter::Paren => "\\(",
            Delimiter::Bracket => "\\[",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            Delimiter::Dollar => "$",
            Delimiter::DoubleDollar => "$$",
            Delimiter::Paren => "\\)",
            Delimiter::Bracket => "\\]",
        }
    }

    pub fn is_display(&self) -> bool {
        matches!(self, Delimiter::DoubleDollar | Delimiter::Bracket)
    }

    /// Whether an unclosed open may continue onto following lines.
    pub fn allows_multiline(&self) -> bool {
        self.is_display()
    }

    /// Wrap `body` back in this delimiter pair.
    pub fn wrap(&self, body: &str) -> String {
        format!("{}{}{}", self.open(), body, self.close())
    }
}

/// Earliest display open (`$$` or `\[`) at or after `from`.
pub fn find_display_open(line: &str, from: usize) -> Option<(usize, Delimiter)> {
    scan_opens(line, from, |delimiter| delimiter.is_display())
}

/// Earliest inline open (`$` or `\(`) at or after `from`.
///
/// A `$$` is stepped over whole, never read as an inline open.
pub fn find_inline_open(line: &str, from: usize) -> Option<(usize, Delimiter)> {
    scan_opens(line, from, |delimiter| !delimiter.is_display())
}

fn scan_opens(
    line: &str,
    from: usize,
    wanted: impl Fn(Delimiter) -> bool,
) -> Option<(usize, Delimiter)> {
    let bytes = line.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        let found = match bytes[i] {
            b'\\' => match bytes.get(i + 1) {
                Some(b'(') => Some(Delimiter::Paren),
                Some(b'[') => Some(Delimiter::Bracket),
                Some(_) => {
                    i += 2;
                    continue;
                }
                None => return None,
            },
            b'$' if bytes.get(i + 1) == Some(&b'$') => Some(Delimiter::DoubleDollar),
            b'$' => Some(Delimiter::Dollar),
            _ => None,
        };
        match found {
            Some(delimiter) if wanted(delimiter) => return Some((i, delimiter)),
            Some(delimiter) => i += delimiter.open().len(),
            None => i += 1,
        }
    }
    None
}

/// Offset of the close matching `delimiter`, searching from `from`.
///
/// The first unescaped close wins, which makes inline matching non-greedy:
/// `$a$ $b$` closes after `a`. A single `$` never closes on half of a `$$`.
pub fn find_close(line: &str, from: usize, delimiter: Delimiter) -> Option<usize> {
    let bytes = line.as_bytes();
    let close = delimiter.close().as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if delimiter == Delimiter::Dollar && bytes[i..].starts_with(b"$$") {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(close) {
            return Some(i);
        }
        if bytes[i] == b'\\' {
            i += 2;
        } else {
            i += 1;
        }
    }
    None
}

/// A body counts as math only if it has something other than whitespace.
pub fn is_renderable(body: &str) -> bool {
    !body.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_inline_opens_are_found_separately() {
        assert_eq!(find_display_open("a $$x$$", 0), Some((2, Delimiter::DoubleDollar)));
        assert_eq!(find_display_open("a $x$", 0), None);
        assert_eq!(find_inline_open("a $x$", 0), Some((2, Delimiter::Dollar)));
        assert_eq!(find_inline_open("a $$x$$ $y$", 0), Some((8, Delimiter::Dollar)));
    }

    #[test]
    fn earliest_open_wins_across_styles() {
        let line = r"see \(a\) and $b$";
        assert_eq!(find_inline_open(line, 0), Some((4, Delimiter::Paren)));
        assert_eq!(find_inline_open(line, 9), Some((14, Delimiter::Dollar)));
        assert_eq!(find_display_open(r"$y$ \[x\] $$z$$", 0), Some((4, Delimiter::Bracket)));
    }

    #[test]
    fn escaped_delimiters_are_skipped() {
        assert_eq!(find_inline_open(r"costs \$5", 0), None);
        assert_eq!(find_inline_open(r"a \\(b", 0), None);
        assert_eq!(find_inline_open(r"\\ \(x\)", 0), Some((3, Delimiter::Paren)));
        assert_eq!(find_display_open(r"\$$x", 0), None);
    }

    #[test]
    fn single_dollar_close_skips_double_dollar() {
        assert_eq!(find_close("5 and $$x$$ here", 0, Delimiter::Dollar), None);
        assert_eq!(find_close("a $$ b $ c", 0, Delimiter::Dollar), Some(7));
    }

    #[test]
    fn close_is_non_greedy() {
        let line = "$a$ $b$";
        assert_eq!(find_close(line, 1, Delimiter::Dollar), Some(2));
    }

    #[test]
    fn close_skips_escaped_characters() {
        let line = r"\(a \\ b\)";
        assert_eq!(find_close(line, 2, Delimiter::Paren), Some(8));
        assert_eq!(find_close(r"$a\$b$", 1, Delimiter::Dollar), Some(5));
    }

    #[test]
    fn close_must_match_the_open_style() {
        assert_eq!(find_close(r"x\] y $$", 0, Delimiter::DoubleDollar), Some(6));
        assert_eq!(find_close("x $$", 0, Delimiter::Bracket), None);
    }

    #[test]
    fn delimiter_metadata() {
        for delimiter in Delimiter::ALL {
            assert_eq!(delimiter.is_display(), delimiter.allows_multiline());
        }
        assert_eq!(Delimiter::Bracket.wrap("x"), r"\[x\]");
        assert!(!is_renderable("  \n"));
        assert!(is_renderable(" x "));
    }
}
