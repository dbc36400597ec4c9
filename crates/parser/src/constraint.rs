//! Build constraints: `//go:build` expressions, legacy `// +build` lines and
//! `_GOOS_GOARCH` file-name suffixes.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid build constraint `{line}`: {reason}")]
pub struct ConstraintError {
    pub line: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildExpr {
    Tag(String),
    Not(Box<BuildExpr>),
    And(Box<BuildExpr>, Box<BuildExpr>),
    Or(Box<BuildExpr>, Box<BuildExpr>),
}

impl BuildExpr {
    /// Parses the text after `//go:build`.
    pub fn parse(text: &str) -> Result<Self, ConstraintError> {
        let toks = lex_expr(text).map_err(|reason| ConstraintError {
            line: text.to_string(),
            reason,
        })?;
        let mut p = ExprParser { toks: &toks, pos: 0 };
        let expr = p.or().and_then(|e| {
            if p.pos == toks.len() {
                Ok(e)
            } else {
                Err("unexpected token")
            }
        });
        expr.map_err(|reason| ConstraintError {
            line: text.to_string(),
            reason,
        })
    }

    pub fn eval(&self, has_tag: &impl Fn(&str) -> bool) -> bool {
        match self {
            BuildExpr::Tag(t) => has_tag(t),
            BuildExpr::Not(e) => !e.eval(has_tag),
            BuildExpr::And(a, b) => a.eval(has_tag) && b.eval(has_tag),
            BuildExpr::Or(a, b) => a.eval(has_tag) || b.eval(has_tag),
        }
    }

    fn and(a: BuildExpr, b: BuildExpr) -> BuildExpr {
        BuildExpr::And(Box::new(a), Box::new(b))
    }

    fn or(a: BuildExpr, b: BuildExpr) -> BuildExpr {
        BuildExpr::Or(Box::new(a), Box::new(b))
    }

    /// One `// +build` line: space-separated options are OR-ed, the
    /// comma-separated terms of an option are AND-ed.
    fn parse_plus_build(text: &str) -> Result<Self, ConstraintError> {
        let bad = |reason| ConstraintError {
            line: text.to_string(),
            reason,
        };
        let mut line: Option<BuildExpr> = None;
        for option in text.split_whitespace() {
            let mut clause: Option<BuildExpr> = None;
            for term in option.split(',') {
                let (neg, tag) = match term.strip_prefix('!') {
                    Some(t) => (true, t),
                    None => (false, term),
                };
                if tag.is_empty() || !tag.chars().all(is_tag_char) {
                    return Err(bad("malformed tag"));
                }
                let mut e = BuildExpr::Tag(tag.to_string());
                if neg {
                    e = BuildExpr::Not(Box::new(e));
                }
                clause = Some(match clause {
                    Some(c) => BuildExpr::and(c, e),
                    None => e,
                });
            }
            if let Some(c) = clause {
                line = Some(match line {
                    Some(l) => BuildExpr::or(l, c),
                    None => c,
                });
            }
        }
        line.ok_or_else(|| bad("empty +build line"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExprTok {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Tag(String),
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn lex_expr(text: &str) -> Result<Vec<ExprTok>, &'static str> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '(' => out.push(ExprTok::LParen),
            ')' => out.push(ExprTok::RParen),
            '!' => out.push(ExprTok::Not),
            '&' | '|' => {
                if chars.next_if(|&(_, n)| n == c).is_none() {
                    return Err("expected && or ||");
                }
                out.push(if c == '&' { ExprTok::And } else { ExprTok::Or });
            }
            c if is_tag_char(c) => {
                let mut end = i + c.len_utf8();
                while let Some((j, n)) = chars.next_if(|&(_, n)| is_tag_char(n)) {
                    end = j + n.len_utf8();
                }
                out.push(ExprTok::Tag(text[i..end].to_string()));
            }
            _ => return Err("unexpected character"),
        }
    }
    Ok(out)
}

struct ExprParser<'t> {
    toks: &'t [ExprTok],
    pos: usize,
}

impl ExprParser<'_> {
    fn eat(&mut self, t: &ExprTok) -> bool {
        let hit = self.toks.get(self.pos) == Some(t);
        if hit {
            self.pos += 1;
        }
        hit
    }

    fn or(&mut self) -> Result<BuildExpr, &'static str> {
        let mut e = self.and()?;
        while self.eat(&ExprTok::Or) {
            e = BuildExpr::or(e, self.and()?);
        }
        Ok(e)
    }

    fn and(&mut self) -> Result<BuildExpr, &'static str> {
        let mut e = self.not()?;
        while self.eat(&ExprTok::And) {
            e = BuildExpr::and(e, self.not()?);
        }
        Ok(e)
    }

    fn not(&mut self) -> Result<BuildExpr, &'static str> {
        if self.eat(&ExprTok::Not) {
            return Ok(BuildExpr::Not(Box::new(self.not()?)));
        }
        if self.eat(&ExprTok::LParen) {
            let e = self.or()?;
            if !self.eat(&ExprTok::RParen) {
                return Err("missing )");
            }
            return Ok(e);
        }
        match self.toks.get(self.pos) {
            Some(ExprTok::Tag(t)) => {
                self.pos += 1;
                Ok(BuildExpr::Tag(t.clone()))
            }
            _ => Err("expected tag"),
        }
    }
}

/// The build constraint in the header of a Go file, if any.
///
/// Only comments before the package clause count. A `//go:build` line wins;
/// otherwise all `// +build` lines are AND-ed together.
pub fn file_build_expr(src: &str) -> Result<Option<BuildExpr>, ConstraintError> {
    let mut plus_build: Option<BuildExpr> = None;
    let mut in_block = false;

    for raw in src.lines() {
        let line = raw.trim();
        if in_block {
            in_block = !line.contains("*/");
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("//") {
            if let Some(expr) = rest.strip_prefix("go:build") {
                if expr.is_empty() || expr.starts_with([' ', '\t']) {
                    return BuildExpr::parse(expr.trim()).map(Some);
                }
            } else if let Some(expr) = rest.trim_start().strip_prefix("+build") {
                let e = BuildExpr::parse_plus_build(expr)?;
                plus_build = Some(match plus_build {
                    Some(p) => BuildExpr::and(p, e),
                    None => e,
                });
            }
            continue;
        }
        if line.starts_with("/*") {
            in_block = !line[2..].contains("*/");
            continue;
        }
        break;
    }
    Ok(plus_build)
}

/// Splits the `_GOOS`, `_GOARCH` or `_GOOS_GOARCH` suffix off a file name,
/// given the sets of known operating systems and architectures.
///
/// `name` is the file name without the `.go` extension.
pub fn name_suffix<'n>(
    name: &'n str,
    is_goos: impl Fn(&str) -> bool,
    is_goarch: impl Fn(&str) -> bool,
) -> (Option<&'n str>, Option<&'n str>) {
    let parts: Vec<&str> = name.split('_').collect();
    // the first segment is never a suffix (`linux.go` constrains nothing)
    let tail = &parts[1.min(parts.len())..];
    match tail {
        [.., os, arch] if is_goos(*os) && is_goarch(*arch) => (Some(*os), Some(*arch)),
        [.., last] if is_goos(*last) => (Some(*last), None),
        [.., last] if is_goarch(*last) => (None, Some(*last)),
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags<'a>(set: &'a [&'a str]) -> impl Fn(&str) -> bool + 'a {
        move |t: &str| set.contains(&t)
    }

    #[test]
    fn precedence_and_binds_tighter() {
        let e = BuildExpr::parse("linux && amd64 || darwin").unwrap();
        assert!(e.eval(&tags(&["linux", "amd64"])));
        assert!(e.eval(&tags(&["darwin"])));
        assert!(!e.eval(&tags(&["linux"])));
    }

    #[test]
    fn negation_and_parens() {
        let e = BuildExpr::parse("!(js && wasm)").unwrap();
        assert!(e.eval(&tags(&["linux"])));
        assert!(!e.eval(&tags(&["js", "wasm"])));
    }

    #[test]
    fn malformed_expressions_fail() {
        assert!(BuildExpr::parse("linux &").is_err());
        assert!(BuildExpr::parse("(linux").is_err());
        assert!(BuildExpr::parse("linux darwin").is_err());
    }

    #[test]
    fn header_go_build_is_found() {
        let src = "// Copyright\n\n//go:build ignore\n\npackage main\n";
        assert_eq!(
            file_build_expr(src).unwrap(),
            Some(BuildExpr::Tag("ignore".into()))
        );
    }

    #[test]
    fn constraint_after_package_is_ignored() {
        let src = "package p\n\n//go:build ignore\n";
        assert_eq!(file_build_expr(src).unwrap(), None);
    }

    #[test]
    fn plus_build_lines_combine() {
        let src = "// +build linux darwin\n// +build !cgo\n\npackage p\n";
        let e = file_build_expr(src).unwrap().unwrap();
        assert!(e.eval(&tags(&["darwin"])));
        assert!(!e.eval(&tags(&["darwin", "cgo"])));
        assert!(!e.eval(&tags(&["windows"])));
    }

    #[test]
    fn suffixes() {
        let os = |s: &str| matches!(s, "linux" | "windows");
        let arch = |s: &str| matches!(s, "amd64" | "arm64");
        assert_eq!(name_suffix("file_linux_amd64", os, arch), (Some("linux"), Some("amd64")));
        assert_eq!(name_suffix("file_windows", os, arch), (Some("windows"), None));
        assert_eq!(name_suffix("file_arm64", os, arch), (None, Some("arm64")));
        assert_eq!(name_suffix("linux", os, arch), (None, None));
        assert_eq!(name_suffix("server", os, arch), (None, None));
    }
}
