use thiserror::Error;

/// Compact byte-span used across the front-end.
///
/// Offsets are `u32`; inputs above 4GiB are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32, // exclusive
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start: clamp_u32(start),
            end: clamp_u32(end),
        }
    }

    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        let p = clamp_u32(pos);
        Self { start: p, end: p }
    }

    pub const fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub const fn to(self, other: Span) -> Span {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    /// 1-based line and column (in bytes) of the span start within `src`.
    pub fn line_col(&self, src: &str) -> (usize, usize) {
        let upto = (self.start as usize).min(src.len());
        let head = &src.as_bytes()[..upto];
        let line = memchr::memchr_iter(b'\n', head).count() + 1;
        let col = match memchr::memrchr(b'\n', head) {
            Some(nl) => upto - nl,
            None => upto + 1,
        };
        (line, col)
    }
}

#[inline]
const fn clamp_u32(x: usize) -> u32 {
    if x > u32::MAX as usize {
        u32::MAX
    } else {
        x as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    Lex,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: DiagKind,
    pub span: Span,
    pub message: String,
}

impl Diag {
    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: DiagKind::Parse,
            span,
            message: message.into(),
        }
    }
}

/// Diagnostics collected while lexing and parsing one file.
#[derive(Debug, Error)]
#[error("{}", .diags.first().map(|d| d.message.as_str()).unwrap_or("parse failed"))]
pub struct ParseFailure {
    pub diags: Vec<Diag>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid numeric literal")]
    InvalidNumber,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated rune literal")]
    UnterminatedRune,
    #[error("unterminated comment")]
    UnterminatedComment,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
#[error("{kind}: {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Lex,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_from_one() {
        let src = "package p\n\nfunc f() {}\n";
        let at_func = Span::new(11, 15);
        assert_eq!(at_func.line_col(src), (3, 1));
        assert_eq!(Span::new(8, 9).line_col(src), (1, 9));
    }

    #[test]
    fn span_to_covers_both() {
        let a = Span::new(4, 6);
        let b = Span::new(1, 3);
        assert_eq!(a.to(b), Span::new(1, 6));
    }

    #[test]
    fn failure_displays_first_message() {
        let f = ParseFailure {
            diags: vec![
                Diag::parse(Span::empty_at(0), "expected package clause"),
                Diag::parse(Span::empty_at(3), "second"),
            ],
        };
        assert_eq!(f.to_string(), "expected package clause");
    }
}
