//! gofmt-style single-line printing of types and signatures.
//!
//! The printer reads the tree and never mutates it. Package qualification
//! is applied while printing, so one signature node can be rendered against
//! any number of target packages.

use std::fmt::{self, Write};

use crate::ast::*;

/// Go visibility rule: an identifier is exported when it starts with an
/// upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Byte length of the literal opening `rest`, closing quote included.
fn quoted_len(rest: &str, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' if quote != '`' => escaped = true,
            _ if c == quote => return i + c.len_utf8(),
            _ => {}
        }
    }
    rest.len()
}

/// Prefixes unqualified exported type names with `package.`.
#[derive(Debug, Clone, Copy)]
pub struct Qualifier<'q> {
    pub package: &'q str,
    /// Names left alone even when exported (type parameters in scope).
    pub keep: &'q [String],
}

impl Qualifier<'_> {
    fn applies_to(&self, name: &str) -> bool {
        is_exported(name) && !self.keep.iter().any(|k| k == name)
    }
}

pub struct Printer<'a> {
    file: &'a SourceFile,
    qualifier: Option<Qualifier<'a>>,
}

impl<'a> Printer<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        Self {
            file,
            qualifier: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier<'a>) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn type_string(&self, id: TypeId) -> Result<String, fmt::Error> {
        let mut out = String::new();
        self.write_type(&mut out, id)?;
        Ok(out)
    }

    /// `Name(params) results`, the way a method spec reads in an interface.
    pub fn method_string(&self, name: &str, sig: SignatureId) -> Result<String, fmt::Error> {
        let mut out = String::new();
        out.write_str(name)?;
        self.write_signature(&mut out, sig)?;
        Ok(out)
    }

    /// Array length source text with bare exported constants qualified.
    ///
    /// Selectors (`pkg.N`), numbers and string literals pass through as
    /// written.
    fn write_len<W: Write>(&self, w: &mut W, text: &str) -> fmt::Result {
        let Some(q) = self.qualifier else {
            return w.write_str(text);
        };
        let mut rest = text;
        let mut prev = None;
        while let Some(c) = rest.chars().next() {
            let taken = if c == '"' || c == '\'' || c == '`' {
                quoted_len(rest, c)
            } else if c.is_alphanumeric() || c == '_' {
                rest.find(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len())
            } else {
                c.len_utf8()
            };
            let word = &rest[..taken];
            let after = rest[taken..].chars().next();
            if (c.is_alphabetic() || c == '_')
                && prev != Some('.')
                && after != Some('.')
                && q.applies_to(word)
            {
                write!(w, "{}.", q.package)?;
            }
            w.write_str(word)?;
            prev = word.chars().last();
            rest = &rest[taken..];
        }
        Ok(())
    }

    pub fn write_type<W: Write>(&self, w: &mut W, id: TypeId) -> fmt::Result {
        let a = &self.file.arena;
        match a.types[id] {
            Type::Named {
                pkg,
                name,
                args,
                ..
            } => {
                let name = self.file.name(name);
                match (pkg, self.qualifier) {
                    (Some(pkg), _) => write!(w, "{}.", self.file.name(pkg))?,
                    (None, Some(q)) if q.applies_to(name) => write!(w, "{}.", q.package)?,
                    _ => {}
                }
                w.write_str(name)?;
                if !args.is_empty() {
                    w.write_char('[')?;
                    self.write_type_list(w, a.types_list(args))?;
                    w.write_char(']')?;
                }
                Ok(())
            }
            Type::Pointer { elem } => {
                w.write_char('*')?;
                self.write_type(w, elem)
            }
            Type::Slice { elem } => {
                w.write_str("[]")?;
                self.write_type(w, elem)
            }
            Type::Array { len, elem } => {
                w.write_char('[')?;
                self.write_len(w, self.file.name(len))?;
                w.write_char(']')?;
                self.write_type(w, elem)
            }
            Type::Map { key, val } => {
                w.write_str("map[")?;
                self.write_type(w, key)?;
                w.write_char(']')?;
                self.write_type(w, val)
            }
            Type::Chan { dir, elem } => {
                w.write_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                })?;
                self.write_type(w, elem)
            }
            Type::Struct { fields } => {
                let fields = a.fields_list(fields);
                if fields.is_empty() {
                    return w.write_str("struct{}");
                }
                w.write_str("struct{ ")?;
                for (i, &f) in fields.iter().enumerate() {
                    if i > 0 {
                        w.write_str("; ")?;
                    }
                    self.write_field(w, f)?;
                    if let Some(tag) = a.fields[f].tag {
                        write!(w, " {}", self.file.name(tag))?;
                    }
                }
                w.write_str(" }")
            }
            Type::Interface { elems } => {
                let elems = a.interface_elems(elems);
                if elems.is_empty() {
                    return w.write_str("interface{}");
                }
                w.write_str("interface{ ")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        w.write_str("; ")?;
                    }
                    match *elem {
                        InterfaceElem::Method { name, sig, .. } => {
                            w.write_str(self.file.name(name))?;
                            self.write_signature(w, sig)?;
                        }
                        InterfaceElem::Embed(t) => self.write_type(w, t)?,
                    }
                }
                w.write_str(" }")
            }
            Type::Func { sig } => {
                w.write_str("func")?;
                self.write_signature(w, sig)
            }
            Type::Paren { typ } => {
                w.write_char('(')?;
                self.write_type(w, typ)?;
                w.write_char(')')
            }
            Type::Union { terms } => {
                for (i, term) in a.type_terms(terms).iter().enumerate() {
                    if i > 0 {
                        w.write_str(" | ")?;
                    }
                    if term.tilde {
                        w.write_char('~')?;
                    }
                    self.write_type(w, term.typ)?;
                }
                Ok(())
            }
        }
    }

    pub fn write_signature<W: Write>(&self, w: &mut W, id: SignatureId) -> fmt::Result {
        let a = &self.file.arena;
        let sig = a.signatures[id];
        w.write_char('(')?;
        self.write_field_list(w, a.fields_list(sig.params))?;
        w.write_char(')')?;
        match sig.results {
            Results::None => Ok(()),
            Results::Single(t) => {
                w.write_char(' ')?;
                self.write_type(w, t)
            }
            Results::List(fields) => {
                let fields = a.fields_list(fields);
                match fields {
                    [] => Ok(()),
                    // single anonymous result: no parentheses
                    [only] if a.fields[*only].names.is_empty() => {
                        w.write_char(' ')?;
                        self.write_type(w, a.fields[*only].typ)
                    }
                    _ => {
                        w.write_str(" (")?;
                        self.write_field_list(w, fields)?;
                        w.write_char(')')
                    }
                }
            }
        }
    }

    fn write_field_list<W: Write>(&self, w: &mut W, fields: &[FieldId]) -> fmt::Result {
        for (i, &f) in fields.iter().enumerate() {
            if i > 0 {
                w.write_str(", ")?;
            }
            self.write_field(w, f)?;
        }
        Ok(())
    }

    fn write_field<W: Write>(&self, w: &mut W, id: FieldId) -> fmt::Result {
        let a = &self.file.arena;
        let field = a.fields[id];
        let names = a.ident_names(field.names);
        for (i, n) in names.iter().enumerate() {
            if i > 0 {
                w.write_str(", ")?;
            }
            w.write_str(self.file.name(n.sym))?;
        }
        if !names.is_empty() {
            w.write_char(' ')?;
        }
        if field.ellipsis_pos.is_some() {
            w.write_str("...")?;
        }
        self.write_type(w, field.typ)
    }

    fn write_type_list<W: Write>(&self, w: &mut W, types: &[TypeId]) -> fmt::Result {
        for (i, &t) in types.iter().enumerate() {
            if i > 0 {
                w.write_str(", ")?;
            }
            self.write_type(w, t)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_follows_first_letter() {
        assert!(is_exported("Writer"));
        assert!(is_exported("Ünicode"));
        assert!(!is_exported("writer"));
        assert!(!is_exported("_Writer"));
        assert!(!is_exported(""));
    }

    #[test]
    fn qualifier_skips_kept_names() {
        let keep = vec!["T".to_string()];
        let q = Qualifier {
            package: "pkg",
            keep: &keep,
        };
        assert!(q.applies_to("Request"));
        assert!(!q.applies_to("T"));
        assert!(!q.applies_to("int"));
    }
}
