use crate::error::{Diag, LexError, LexErrorKind, Span};
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

// =============================================================================
// 1. Manual scanners (callbacks)
// =============================================================================

#[inline]
fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    match memchr::memmem::find(rest.as_bytes(), b"*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            lex.bump(rest.len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

#[inline]
fn lex_raw_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    match memchr::memchr(b'`', rest.as_bytes()) {
        Some(end) => {
            lex.bump(end + 1);
            Ok(())
        }
        None => {
            lex.bump(rest.len());
            Err(LexErrorKind::UnterminatedString)
        }
    }
}

/// Scans a quoted body up to `quote`, honouring backslash escapes.
///
/// Escape contents are not validated; only termination is.
#[inline]
fn scan_quoted(rest: &[u8], quote: u8) -> Result<usize, usize> {
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'\n' | b'\r' => return Err(i),
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(rest.len())
}

#[inline]
fn lex_interpreted_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    match scan_quoted(lex.remainder().as_bytes(), b'"') {
        Ok(n) => {
            lex.bump(n);
            Ok(())
        }
        Err(n) => {
            lex.bump(n.min(lex.remainder().len()));
            Err(LexErrorKind::UnterminatedString)
        }
    }
}

#[inline]
fn lex_rune(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    match scan_quoted(lex.remainder().as_bytes(), b'\'') {
        // `''` is not a rune
        Ok(1) => {
            lex.bump(1);
            Err(LexErrorKind::InvalidToken)
        }
        Ok(n) => {
            lex.bump(n);
            Ok(())
        }
        Err(n) => {
            lex.bump(n.min(lex.remainder().len()));
            Err(LexErrorKind::UnterminatedRune)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumClass {
    Int,
    Float,
    Imag,
}

/// Maximal munch for numeric literals, then a light validity check.
fn lex_number(lex: &mut LogosLexer<'_, RawTok>) -> Result<NumClass, LexErrorKind> {
    let head = lex.slice().as_bytes();
    let is_hex = head.len() == 1
        && head[0] == b'0'
        && matches!(lex.remainder().as_bytes().first(), Some(b'x' | b'X'));

    let rest = lex.remainder().as_bytes();
    let mut prev = *head.last().unwrap_or(&b'0');
    let mut i = 0;
    while i < rest.len() {
        let b = rest[i];
        let exp_sign = matches!(b, b'+' | b'-')
            && if is_hex {
                matches!(prev, b'p' | b'P')
            } else {
                matches!(prev, b'e' | b'E')
            };
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exp_sign {
            prev = b;
            i += 1;
        } else {
            break;
        }
    }
    // `1..` never appears in Go; stop before a second dot of `x[1:]...`-like input
    if let Some(dots) = memchr::memmem::find(&rest[..i], b"..") {
        i = dots;
    }
    lex.bump(i);

    let lit = lex.slice().as_bytes();
    let last = lit[lit.len() - 1];
    if last == b'_' || matches!(last, b'+' | b'-') {
        return Err(LexErrorKind::InvalidNumber);
    }
    if last == b'i' {
        return Ok(NumClass::Imag);
    }
    let body = if is_hex { &lit[2..] } else { lit };
    if body.is_empty() {
        return Err(LexErrorKind::InvalidNumber);
    }
    let float = body.contains(&b'.')
        || if is_hex {
            body.iter().any(|b| matches!(b, b'p' | b'P'))
        } else {
            !lit.starts_with(b"0b")
                && !lit.starts_with(b"0B")
                && !lit.starts_with(b"0o")
                && !lit.starts_with(b"0O")
                && body.iter().any(|b| matches!(b, b'e' | b'E'))
        };
    Ok(if float { NumClass::Float } else { NumClass::Int })
}

// =============================================================================
// 2. Raw token definition (logos DFA)
// =============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\x0C]+")]
#[rustfmt::skip]
enum RawTok {
    #[token("\u{FEFF}")] Bom,

    // Trivia
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*", logos::skip)] _LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Keywords (before Ident)
    #[token("break")] KwBreak,
    #[token("case")] KwCase,
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("continue")] KwContinue,
    #[token("default")] KwDefault,
    #[token("defer")] KwDefer,
    #[token("else")] KwElse,
    #[token("fallthrough")] KwFallthrough,
    #[token("for")] KwFor,
    #[token("func")] KwFunc,
    #[token("go")] KwGo,
    #[token("goto")] KwGoto,
    #[token("if")] KwIf,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("range")] KwRange,
    #[token("return")] KwReturn,
    #[token("select")] KwSelect,
    #[token("struct")] KwStruct,
    #[token("switch")] KwSwitch,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    #[regex(r"[0-9]|\.[0-9]", lex_number)] Number(NumClass),

    #[token("`", lex_raw_string)] RawString,
    #[token("\"", lex_interpreted_string)] String,
    #[token("'", lex_rune)] Rune,

    // Operators
    #[token("...")] Ellipsis,
    #[token("<<=")] ShlAssign,
    #[token(">>=")] ShrAssign,
    #[token("&^=")] AndNotAssign,
    #[token("+=")] AddAssign,
    #[token("-=")] SubAssign,
    #[token("*=")] MulAssign,
    #[token("/=")] DivAssign,
    #[token("%=")] ModAssign,
    #[token("&=")] AndAssign,
    #[token("|=")] OrAssign,
    #[token("^=")] XorAssign,
    #[token("<<")] Shl,
    #[token(">>")] Shr,
    #[token("&^")] AndNot,
    #[token("&&")] LAnd,
    #[token("||")] LOr,
    #[token("==")] EqEq,
    #[token("!=")] NotEq,
    #[token("<=")] Le,
    #[token(">=")] Ge,
    #[token("++")] Inc,
    #[token("--")] Dec,
    #[token(":=")] Define,
    #[token("<-")] Arrow,
    #[token("=")] Assign,
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("*")] Star,
    #[token("/")] Slash,
    #[token("%")] Percent,
    #[token("&")] Amp,
    #[token("|")] Pipe,
    #[token("^")] Caret,
    #[token("~")] Tilde,
    #[token("!")] Bang,
    #[token("<")] Lt,
    #[token(">")] Gt,

    // Delimiters
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,
}

impl RawTok {
    /// A newline after one of these tokens becomes a `;`.
    #[inline(always)]
    const fn can_insert_semicolon(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::Number(_)
                | Self::Rune
                | Self::String
                | Self::RawString
                | Self::KwBreak
                | Self::KwContinue
                | Self::KwFallthrough
                | Self::KwReturn
                | Self::Inc
                | Self::Dec
                | Self::RParen
                | Self::RBrack
                | Self::RBrace
        )
    }

    #[inline]
    fn to_token<'src>(self, slice: &'src str) -> Tok<'src> {
        macro_rules! simple_tok {
            ($($raw:ident),* $(,)?) => {
                match self {
                    Self::Ident => Tok::Ident(slice),
                    Self::Number(NumClass::Int) => Tok::IntLit(slice),
                    Self::Number(NumClass::Float) => Tok::FloatLit(slice),
                    Self::Number(NumClass::Imag) => Tok::ImagLit(slice),
                    Self::Rune => Tok::RuneLit(slice),
                    Self::String => Tok::StringLit(slice),
                    Self::RawString => Tok::RawStringLit(slice),
                    $(Self::$raw => Tok::$raw,)*
                    // trivia and BOM never reach here
                    Self::Bom | Self::Newline | Self::_LineComment | Self::BlockComment => Tok::Error,
                }
            };
        }

        simple_tok! {
            KwBreak, KwCase, KwChan, KwConst, KwContinue, KwDefault, KwDefer, KwElse,
            KwFallthrough, KwFor, KwFunc, KwGo, KwGoto, KwIf, KwImport, KwInterface,
            KwMap, KwPackage, KwRange, KwReturn, KwSelect, KwStruct, KwSwitch, KwType, KwVar,

            Ellipsis, ShlAssign, ShrAssign, AndNotAssign, AddAssign, SubAssign, MulAssign,
            DivAssign, ModAssign, AndAssign, OrAssign, XorAssign, Shl, Shr, AndNot, LAnd, LOr,
            EqEq, NotEq, Le, Ge, Inc, Dec, Define, Arrow, Assign, Plus, Minus, Star, Slash,
            Percent, Amp, Pipe, Caret, Tilde, Bang, Lt, Gt,

            LParen, RParen, LBrack, RBrack, LBrace, RBrace, Comma, Semi, Colon, Dot,
        }
    }
}

// =============================================================================
// 3. Public token definition (zero-copy)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Tok<'input> {
    Ident(&'input str),
    IntLit(&'input str),
    FloatLit(&'input str),
    ImagLit(&'input str),
    RuneLit(&'input str),
    StringLit(&'input str),
    RawStringLit(&'input str),

    // Keywords
    KwBreak,
    KwCase,
    KwChan,
    KwConst,
    KwContinue,
    KwDefault,
    KwDefer,
    KwElse,
    KwFallthrough,
    KwFor,
    KwFunc,
    KwGo,
    KwGoto,
    KwIf,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwRange,
    KwReturn,
    KwSelect,
    KwStruct,
    KwSwitch,
    KwType,
    KwVar,

    // Operators / Delimiters
    Ellipsis,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    EqEq,
    NotEq,
    Le,
    Ge,
    Inc,
    Dec,
    Define,
    Arrow,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    Lt,
    Gt,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,

    Error,
}

impl<'input> std::fmt::Display for Tok<'input> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Ident(s)
            | Tok::IntLit(s)
            | Tok::FloatLit(s)
            | Tok::ImagLit(s)
            | Tok::RuneLit(s)
            | Tok::StringLit(s)
            | Tok::RawStringLit(s) => f.write_str(s),
            Tok::Semi => f.write_str("';'"),
            other => write!(f, "{other:?}"),
        }
    }
}

// =============================================================================
// 4. Lexer wrapper: semicolon insertion + diags
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<(usize, Tok<'src>, usize)>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::new(),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        let span = Span::from_range(span);
        self.diags.push(LexError { kind, span }.diag());
    }

    /// Returns the injected `;` when the trivia ends a line that needs one.
    #[inline]
    fn handle_trivia(&mut self, raw: RawTok, span: &Range<usize>) -> Option<usize> {
        let at = match raw {
            RawTok::Newline => Some(span.start),
            RawTok::BlockComment => {
                let slice = self.logos.slice();
                memchr::memchr2(b'\n', b'\r', slice.as_bytes()).map(|off| span.start + off)
            }
            _ => None,
        }?;
        if self.last_can_insert_semi {
            self.last_can_insert_semi = false;
            Some(at)
        } else {
            None
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }
            if self.eof_done {
                return None;
            }

            let raw = match self.logos.next() {
                None => {
                    self.eof_done = true;
                    if self.last_can_insert_semi {
                        self.last_can_insert_semi = false;
                        return Some((self.src_len, Tok::Semi, self.src_len));
                    }
                    continue;
                }
                Some(Err(kind)) => {
                    let span = self.logos.span();
                    self.push_lex_diag(kind, span.clone());
                    self.last_can_insert_semi = false;
                    return Some((span.start, Tok::Error, span.end));
                }
                Some(Ok(raw)) => raw,
            };

            let span = self.logos.span();
            match raw {
                RawTok::Bom if span.start == 0 => continue,
                RawTok::Bom => {
                    self.push_lex_diag(LexErrorKind::InvalidToken, span.clone());
                    self.last_can_insert_semi = false;
                    return Some((span.start, Tok::Error, span.end));
                }
                RawTok::Newline | RawTok::BlockComment => {
                    if let Some(at) = self.handle_trivia(raw, &span) {
                        return Some((at, Tok::Semi, at));
                    }
                }
                _ => {
                    self.last_can_insert_semi = raw.can_insert_semicolon();
                    let tok = raw.to_token(self.logos.slice());
                    return Some((span.start, tok, span.end));
                }
            }
        }
    }
}

/// Lexes the whole input eagerly, returning tokens and lexer diagnostics.
pub fn tokenize(input: &str) -> (Vec<(usize, Tok<'_>, usize)>, Vec<Diag>) {
    let mut lx = Lexer::new(input);
    let toks: Vec<_> = lx.by_ref().collect();
    let diags = lx.take_diags();
    (toks, diags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Tok<'_>> {
        Lexer::new(input).map(|(_, t, _)| t).collect()
    }

    #[test]
    fn numbers_are_classified() {
        assert_eq!(
            toks("1 0x1F 1.5 1e9 0x1p-2 2i 0b101"),
            vec![
                Tok::IntLit("1"),
                Tok::IntLit("0x1F"),
                Tok::FloatLit("1.5"),
                Tok::FloatLit("1e9"),
                Tok::FloatLit("0x1p-2"),
                Tok::ImagLit("2i"),
                Tok::IntLit("0b101"),
                Tok::Semi,
            ]
        );
    }

    #[test]
    fn strings_keep_quotes() {
        assert_eq!(
            toks(r#"x := "a\"b" + `raw` + 'c'"#),
            vec![
                Tok::Ident("x"),
                Tok::Define,
                Tok::StringLit(r#""a\"b""#),
                Tok::Plus,
                Tok::RawStringLit("`raw`"),
                Tok::Plus,
                Tok::RuneLit("'c'"),
                Tok::Semi,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_diag() {
        let (toks, diags) = tokenize("x = \"abc\n");
        assert!(toks.iter().any(|(_, t, _)| *t == Tok::Error));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "unterminated string");
    }

    #[test]
    fn block_comment_with_newline_inserts_semi() {
        assert_eq!(
            toks("a /* x\n y */ b"),
            vec![Tok::Ident("a"), Tok::Semi, Tok::Ident("b"), Tok::Semi]
        );
        assert_eq!(toks("a /* x */ b"), vec![Tok::Ident("a"), Tok::Ident("b"), Tok::Semi]);
    }

    #[test]
    fn bom_only_at_start() {
        let (_, diags) = tokenize("\u{FEFF}package p");
        assert!(diags.is_empty());
        let (_, diags) = tokenize("package \u{FEFF}p");
        assert_eq!(diags.len(), 1);
    }
}
