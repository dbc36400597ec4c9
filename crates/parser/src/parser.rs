//! Recursive-descent parser for Go top-level declarations.
//!
//! Type expressions and signatures are parsed in full. Function bodies and
//! const/var initialisers are skipped by balanced-token scanning, which is
//! enough because every bracket in them is a token of its own.

use crate::ast::*;
use crate::error::Diag;
use crate::lexer::Tok;
use crate::parser_support::{resolve_param_list, ParamDecl};

type PResult<T> = Result<T, Diag>;

pub struct Parser<'src> {
    src: &'src str,
    toks: Vec<(usize, Tok<'src>, usize)>,
    pos: usize,
    arena: AstArena,
    interner: Interner,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str, toks: Vec<(usize, Tok<'src>, usize)>) -> Self {
        Self {
            src,
            toks,
            pos: 0,
            arena: AstArena::new(),
            interner: Interner::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Token cursor
    // -------------------------------------------------------------------------

    #[inline]
    fn tok(&self, n: usize) -> Option<&Tok<'src>> {
        self.toks.get(self.pos + n).map(|(_, t, _)| t)
    }

    #[inline]
    fn at(&self, t: &Tok<'src>) -> bool {
        self.tok(0) == Some(t)
    }

    #[inline]
    fn at_ident(&self, n: usize) -> bool {
        matches!(self.tok(n), Some(Tok::Ident(_)))
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.pos >= self.toks.len()
    }

    fn here(&self) -> Span {
        match self.toks.get(self.pos) {
            Some(&(s, _, e)) => Span::new(s, e),
            None => Span::empty_at(self.src.len()),
        }
    }

    fn last_end(&self) -> usize {
        match self.pos.checked_sub(1).and_then(|p| self.toks.get(p)) {
            Some(&(_, _, e)) => e,
            None => 0,
        }
    }

    fn bump(&mut self) -> Span {
        let span = self.here();
        self.pos = (self.pos + 1).min(self.toks.len());
        span
    }

    fn eat(&mut self, t: &Tok<'src>) -> Option<Span> {
        self.at(t).then(|| self.bump())
    }

    fn expected(&self, what: &str) -> Diag {
        let found = match self.tok(0) {
            Some(t) => t.to_string(),
            None => "EOF".to_string(),
        };
        Diag::parse(self.here(), format!("expected {what}, found {found}"))
    }

    fn expect(&mut self, t: &Tok<'src>, what: &str) -> PResult<Span> {
        self.eat(t).ok_or_else(|| self.expected(what))
    }

    fn ident(&mut self) -> PResult<IdentName> {
        match self.tok(0) {
            Some(&Tok::Ident(name)) => {
                let sym = self.interner.intern(name);
                let pos = self.bump();
                Ok(IdentName { sym, pos })
            }
            _ => Err(self.expected("identifier")),
        }
    }

    fn skip_semis(&mut self) {
        while self.eat(&Tok::Semi).is_some() {}
    }

    /// Statement terminator inside a group: `;` or the closing token.
    fn expect_terminator(&mut self, close: &Tok<'src>) -> PResult<()> {
        if self.at(close) || self.at_eof() {
            return Ok(());
        }
        self.expect(&Tok::Semi, "';'").map(drop)
    }

    // -------------------------------------------------------------------------
    // File
    // -------------------------------------------------------------------------

    pub fn parse_file(mut self) -> PResult<SourceFile> {
        self.skip_semis();
        self.expect(&Tok::KwPackage, "package clause")?;
        let package = self.ident()?;
        if !self.at_eof() {
            self.expect(&Tok::Semi, "';' after package clause")?;
        }

        let mut decls = Vec::new();
        loop {
            self.skip_semis();
            if self.at_eof() {
                break;
            }
            decls.push(self.parse_top_decl()?);
            if !self.at_eof() {
                self.expect(&Tok::Semi, "';' after declaration")?;
            }
        }

        Ok(SourceFile {
            package,
            decls,
            arena: self.arena,
            interner: self.interner,
        })
    }

    fn parse_top_decl(&mut self) -> PResult<DeclId> {
        match self.tok(0) {
            Some(Tok::KwFunc) => self.parse_func_decl(),
            Some(Tok::KwImport) => self.parse_gen_decl(GenDeclKind::Import),
            Some(Tok::KwConst) => self.parse_gen_decl(GenDeclKind::Const),
            Some(Tok::KwVar) => self.parse_gen_decl(GenDeclKind::Var),
            Some(Tok::KwType) => self.parse_gen_decl(GenDeclKind::Type),
            _ => Err(self.expected("declaration")),
        }
    }

    fn parse_gen_decl(&mut self, kind: GenDeclKind) -> PResult<DeclId> {
        let tok_pos = self.bump();
        let mut specs = Vec::new();
        let lparen = self.eat(&Tok::LParen);
        if lparen.is_some() {
            loop {
                self.skip_semis();
                if self.at(&Tok::RParen) {
                    break;
                }
                specs.push(self.parse_spec(kind)?);
                self.expect_terminator(&Tok::RParen)?;
            }
            self.expect(&Tok::RParen, "')'")?;
        } else {
            specs.push(self.parse_spec(kind)?);
        }

        let span = Span::new(tok_pos.start as usize, self.last_end());
        let specs = self.arena.list_specs(specs);
        Ok(self.arena.decls.alloc(
            Decl::Gen(GenDecl {
                kind,
                tok_pos,
                lparen,
                specs,
            }),
            span,
        ))
    }

    fn parse_spec(&mut self, kind: GenDeclKind) -> PResult<Spec> {
        match kind {
            GenDeclKind::Import => self.parse_import_spec().map(Spec::Import),
            GenDeclKind::Const | GenDeclKind::Var => self.parse_value_spec().map(Spec::Value),
            GenDeclKind::Type => self.parse_type_spec().map(Spec::Type),
        }
    }

    fn parse_import_spec(&mut self) -> PResult<ImportSpec> {
        let name = match self.tok(0) {
            Some(Tok::Dot) => Some(ImportName::Dot(self.bump())),
            Some(Tok::Ident("_")) => Some(ImportName::Blank(self.bump())),
            Some(Tok::Ident(_)) => {
                let n = self.ident()?;
                Some(ImportName::Name(n.sym, n.pos))
            }
            _ => None,
        };
        match self.tok(0) {
            Some(&Tok::StringLit(lit) | &Tok::RawStringLit(lit)) => {
                let path = self.interner.intern(&lit[1..lit.len() - 1]);
                let path_pos = self.bump();
                Ok(ImportSpec {
                    name,
                    path,
                    path_pos,
                })
            }
            _ => Err(self.expected("import path")),
        }
    }

    fn parse_value_spec(&mut self) -> PResult<ValueSpec> {
        let mut names = vec![self.ident()?];
        while self.eat(&Tok::Comma).is_some() {
            names.push(self.ident()?);
        }
        let rest = self.skip_value_rest()?;
        Ok(ValueSpec {
            names: self.arena.list_ident_names(names),
            rest,
        })
    }

    fn parse_type_spec(&mut self) -> PResult<TypeSpec> {
        let name = self.ident()?;
        let mut type_params = ListRef::EMPTY;
        if self.at(&Tok::LBrack) {
            // `type A[T any] ...` vs `type A [N]T`
            let save = self.pos;
            match self.parse_type_params() {
                Ok(tp) if self.at(&Tok::Assign) || self.at_type_start() => type_params = tp,
                _ => self.pos = save,
            }
        }
        let assign_pos = self.eat(&Tok::Assign);
        let typ = self.parse_type()?;
        Ok(TypeSpec {
            name: name.sym,
            name_pos: name.pos,
            type_params,
            assign_pos,
            typ,
        })
    }

    fn parse_func_decl(&mut self) -> PResult<DeclId> {
        let func_pos = self.bump();
        let recv = if self.at(&Tok::LParen) {
            let l_paren = self.here();
            let fields = self.parse_params()?;
            let r_paren = Span::empty_at(self.last_end().saturating_sub(1));
            Some(Receiver {
                l_paren,
                fields,
                r_paren,
            })
        } else {
            None
        };
        let name = self.ident()?;
        let type_params = if recv.is_none() && self.at(&Tok::LBrack) {
            self.parse_type_params()?
        } else {
            ListRef::EMPTY
        };
        let signature = self.parse_signature()?;
        let body = if self.at(&Tok::LBrace) {
            Some(self.skip_balanced(&Tok::LBrace, &Tok::RBrace)?)
        } else {
            None
        };

        let span = Span::new(func_pos.start as usize, self.last_end());
        Ok(self.arena.decls.alloc(
            Decl::Func(FuncDecl {
                func_pos,
                recv,
                name: name.sym,
                name_pos: name.pos,
                type_params,
                signature,
                body,
            }),
            span,
        ))
    }

    // -------------------------------------------------------------------------
    // Skipping
    // -------------------------------------------------------------------------

    fn skip_balanced(&mut self, open: &Tok<'src>, close: &Tok<'src>) -> PResult<Span> {
        let start = self.expect(open, "'{'")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.tok(0) {
                None => return Err(Diag::parse(start, "unclosed block")),
                Some(t) if t == open => depth += 1,
                Some(t) if t == close => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        Ok(Span::new(start.start as usize, self.last_end()))
    }

    /// Skips the type/initialiser of a value spec up to its terminator.
    fn skip_value_rest(&mut self) -> PResult<Span> {
        let start = self.here().start as usize;
        let mut depth = 0usize;
        loop {
            match self.tok(0) {
                None => break,
                Some(Tok::Semi | Tok::RParen) if depth == 0 => break,
                Some(Tok::LParen | Tok::LBrack | Tok::LBrace) => depth += 1,
                Some(Tok::RParen | Tok::RBrack | Tok::RBrace) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| self.expected("';'"))?;
                }
                _ => {}
            }
            self.bump();
        }
        Ok(Span::new(start, self.last_end().max(start)))
    }

    // -------------------------------------------------------------------------
    // Signatures and parameters
    // -------------------------------------------------------------------------

    fn parse_signature(&mut self) -> PResult<SignatureId> {
        let start = self.here().start as usize;
        let params = self.parse_params()?;
        let results = if self.at(&Tok::LParen) {
            Results::List(self.parse_params()?)
        } else if self.at_type_start() {
            Results::Single(self.parse_type()?)
        } else {
            Results::None
        };
        let span = Span::new(start, self.last_end());
        Ok(self
            .arena
            .signatures
            .alloc(Signature { params, results }, span))
    }

    fn parse_params(&mut self) -> PResult<ListRef<FieldId>> {
        self.expect(&Tok::LParen, "'('")?;
        let mut entries = Vec::new();
        while !self.at(&Tok::RParen) {
            entries.push(self.parse_param_entry()?);
            if self.eat(&Tok::Comma).is_none() {
                break;
            }
        }
        self.expect(&Tok::RParen, "')'")?;
        let fields = resolve_param_list(&mut self.arena, entries);
        Ok(self.arena.list_fields(fields))
    }

    fn parse_param_entry(&mut self) -> PResult<ParamDecl> {
        let start = self.here().start as usize;
        let entry = |p: &Self,
                     names: Vec<IdentName>,
                     ellipsis_pos: Option<Span>,
                     typ: Option<TypeId>| ParamDecl {
            names,
            ellipsis_pos,
            typ,
            span: Span::new(start, p.last_end()),
        };

        if !self.at_ident(0) {
            let ellipsis = self.eat(&Tok::Ellipsis);
            let typ = self.parse_type()?;
            return Ok(entry(self, Vec::new(), ellipsis, Some(typ)));
        }

        match self.tok(1) {
            Some(Tok::Dot) => {
                let typ = self.parse_type()?;
                Ok(entry(self, Vec::new(), None, Some(typ)))
            }
            Some(Tok::Comma | Tok::RParen) => {
                let name = self.ident()?;
                Ok(entry(self, vec![name], None, None))
            }
            Some(Tok::LBrack) => {
                // `List[T]` (unnamed generic type) vs `buf []byte` / `a [4]int`
                let save = self.pos;
                if let Ok(typ) = self.parse_type() {
                    if self.at(&Tok::Comma) || self.at(&Tok::RParen) {
                        return Ok(entry(self, Vec::new(), None, Some(typ)));
                    }
                }
                self.pos = save;
                let name = self.ident()?;
                let typ = self.parse_type()?;
                Ok(entry(self, vec![name], None, Some(typ)))
            }
            _ => {
                let name = self.ident()?;
                let ellipsis = self.eat(&Tok::Ellipsis);
                let typ = self.parse_type()?;
                Ok(entry(self, vec![name], ellipsis, Some(typ)))
            }
        }
    }

    fn parse_type_params(&mut self) -> PResult<ListRef<TypeParamDecl>> {
        self.expect(&Tok::LBrack, "'['")?;
        let mut decls = Vec::new();
        while !self.at(&Tok::RBrack) {
            let mut names = vec![self.ident()?];
            while self.eat(&Tok::Comma).is_some() {
                names.push(self.ident()?);
            }
            let constraint = self.parse_union()?;
            decls.push(TypeParamDecl {
                names: self.arena.list_ident_names(names),
                constraint,
            });
            if self.eat(&Tok::Comma).is_none() {
                break;
            }
        }
        self.expect(&Tok::RBrack, "']'")?;
        Ok(self.arena.list_type_param_decls(decls))
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    fn at_type_start(&self) -> bool {
        matches!(
            self.tok(0),
            Some(
                Tok::Ident(_)
                    | Tok::Star
                    | Tok::LBrack
                    | Tok::LParen
                    | Tok::KwFunc
                    | Tok::KwMap
                    | Tok::KwChan
                    | Tok::Arrow
                    | Tok::KwInterface
                    | Tok::KwStruct
            )
        )
    }

    fn alloc_type(&mut self, typ: Type, start: usize) -> TypeId {
        let span = Span::new(start, self.last_end());
        self.arena.types.alloc(typ, span)
    }

    pub(crate) fn parse_type(&mut self) -> PResult<TypeId> {
        let start = self.here().start as usize;
        let typ = match self.tok(0) {
            Some(Tok::Ident(_)) => return self.parse_named(),
            Some(Tok::Star) => {
                self.bump();
                Type::Pointer {
                    elem: self.parse_type()?,
                }
            }
            Some(Tok::LBrack) => {
                self.bump();
                if self.eat(&Tok::RBrack).is_some() {
                    Type::Slice {
                        elem: self.parse_type()?,
                    }
                } else {
                    let len = self.array_len()?;
                    Type::Array {
                        len,
                        elem: self.parse_type()?,
                    }
                }
            }
            Some(Tok::KwMap) => {
                self.bump();
                self.expect(&Tok::LBrack, "'['")?;
                let key = self.parse_type()?;
                self.expect(&Tok::RBrack, "']'")?;
                Type::Map {
                    key,
                    val: self.parse_type()?,
                }
            }
            Some(Tok::KwChan) => {
                self.bump();
                let dir = if self.eat(&Tok::Arrow).is_some() {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Type::Chan {
                    dir,
                    elem: self.parse_type()?,
                }
            }
            Some(Tok::Arrow) => {
                self.bump();
                self.expect(&Tok::KwChan, "'chan'")?;
                Type::Chan {
                    dir: ChanDir::Recv,
                    elem: self.parse_type()?,
                }
            }
            Some(Tok::KwFunc) => {
                self.bump();
                Type::Func {
                    sig: self.parse_signature()?,
                }
            }
            Some(Tok::KwStruct) => self.parse_struct()?,
            Some(Tok::KwInterface) => self.parse_interface()?,
            Some(Tok::LParen) => {
                self.bump();
                let typ = self.parse_type()?;
                self.expect(&Tok::RParen, "')'")?;
                Type::Paren { typ }
            }
            _ => return Err(self.expected("type")),
        };
        Ok(self.alloc_type(typ, start))
    }

    fn parse_named(&mut self) -> PResult<TypeId> {
        let start = self.here().start as usize;
        let first = self.ident()?;
        let (pkg, name) = if self.eat(&Tok::Dot).is_some() {
            (Some(first.sym), self.ident()?)
        } else {
            (None, first)
        };
        let args = if self.at(&Tok::LBrack) {
            self.bump();
            let mut args = Vec::new();
            while !self.at(&Tok::RBrack) {
                args.push(self.parse_type()?);
                if self.eat(&Tok::Comma).is_none() {
                    break;
                }
            }
            self.expect(&Tok::RBrack, "']'")?;
            self.arena.list_types(args)
        } else {
            ListRef::EMPTY
        };
        Ok(self.alloc_type(
            Type::Named {
                pkg,
                name: name.sym,
                name_pos: name.pos,
                args,
            },
            start,
        ))
    }

    /// Source text of an array length, consuming the closing `]`.
    fn array_len(&mut self) -> PResult<Symbol> {
        let start = self.here().start as usize;
        let mut depth = 0usize;
        loop {
            match self.tok(0) {
                None => return Err(self.expected("']'")),
                Some(Tok::RBrack) if depth == 0 => break,
                Some(Tok::LParen | Tok::LBrack | Tok::LBrace) => depth += 1,
                Some(Tok::RParen | Tok::RBrack | Tok::RBrace) => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.bump();
        }
        let end = self.here().start as usize;
        self.bump();
        let text = self.src[start..end].trim();
        Ok(self.interner.intern(text))
    }

    /// `[~]T { | [~]T }`; a lone plain term is returned as the type itself.
    fn parse_union(&mut self) -> PResult<TypeId> {
        let start = self.here().start as usize;
        let mut terms = Vec::new();
        loop {
            let tilde = self.eat(&Tok::Tilde).is_some();
            let typ = self.parse_type()?;
            terms.push(TypeTerm { tilde, typ });
            if self.eat(&Tok::Pipe).is_none() {
                break;
            }
        }
        if let [TypeTerm { tilde: false, typ }] = terms[..] {
            return Ok(typ);
        }
        let terms = self.arena.list_type_terms(terms);
        Ok(self.alloc_type(Type::Union { terms }, start))
    }

    fn parse_struct(&mut self) -> PResult<Type> {
        self.bump();
        self.expect(&Tok::LBrace, "'{'")?;
        let mut fields = Vec::new();
        loop {
            self.skip_semis();
            if self.at(&Tok::RBrace) {
                break;
            }
            fields.push(self.parse_struct_field()?);
            self.expect_terminator(&Tok::RBrace)?;
        }
        self.expect(&Tok::RBrace, "'}'")?;
        Ok(Type::Struct {
            fields: self.arena.list_fields(fields),
        })
    }

    fn at_field_end(&self, n: usize) -> bool {
        matches!(
            self.tok(n),
            None | Some(Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_))
        )
    }

    fn parse_struct_field(&mut self) -> PResult<FieldId> {
        let start = self.here().start as usize;
        let mut names = Vec::new();

        let typ = if self.at_ident(0) {
            match self.tok(1) {
                Some(Tok::Dot) => self.parse_type()?,
                _ if self.at_field_end(1) => self.parse_type()?,
                Some(Tok::LBrack) => {
                    // embedded `Base[T]` vs field `buf [8]byte`
                    let save = self.pos;
                    match self.parse_type() {
                        Ok(t) if self.at_field_end(0) => t,
                        _ => {
                            self.pos = save;
                            names.push(self.ident()?);
                            self.parse_type()?
                        }
                    }
                }
                _ => {
                    names.push(self.ident()?);
                    while self.eat(&Tok::Comma).is_some() {
                        names.push(self.ident()?);
                    }
                    self.parse_type()?
                }
            }
        } else {
            // embedded `*T`
            self.parse_type()?
        };

        let tag = match self.tok(0) {
            Some(&Tok::StringLit(lit) | &Tok::RawStringLit(lit)) => {
                let sym = self.interner.intern(lit);
                self.bump();
                Some(sym)
            }
            _ => None,
        };

        let field = Field {
            names: self.arena.list_ident_names(names),
            ellipsis_pos: None,
            typ,
            tag,
        };
        let span = Span::new(start, self.last_end());
        Ok(self.arena.fields.alloc(field, span))
    }

    fn parse_interface(&mut self) -> PResult<Type> {
        self.bump();
        self.expect(&Tok::LBrace, "'{'")?;
        let mut elems = Vec::new();
        loop {
            self.skip_semis();
            if self.at(&Tok::RBrace) {
                break;
            }
            let elem = if self.at_ident(0) && self.tok(1) == Some(&Tok::LParen) {
                let name = self.ident()?;
                InterfaceElem::Method {
                    name: name.sym,
                    name_pos: name.pos,
                    sig: self.parse_signature()?,
                }
            } else {
                InterfaceElem::Embed(self.parse_union()?)
            };
            elems.push(elem);
            self.expect_terminator(&Tok::RBrace)?;
        }
        self.expect(&Tok::RBrace, "'}'")?;
        Ok(Type::Interface {
            elems: self.arena.list_interface_elems(elems),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(src: &str) -> SourceFile {
        let (toks, diags) = tokenize(src);
        assert!(diags.is_empty(), "{diags:?}");
        Parser::new(src, toks).parse_file().expect("parse")
    }

    fn parse_err(src: &str) -> Diag {
        let (toks, _) = tokenize(src);
        Parser::new(src, toks).parse_file().expect_err("should fail")
    }

    #[test]
    fn package_clause_only() {
        let f = parse("package p");
        assert_eq!(f.package_name(), "p");
        assert!(f.decls.is_empty());
    }

    #[test]
    fn missing_package_clause() {
        let d = parse_err("func f() {}\n");
        assert!(d.message.starts_with("expected package clause"), "{}", d.message);
    }

    #[test]
    fn array_type_decl_is_not_type_params() {
        let f = parse("package p\nconst N = 4\ntype A [N]int\ntype B[T any] []T\n");
        let types: Vec<_> = f
            .decls
            .iter()
            .filter_map(|&d| match f.arena.decls[d] {
                Decl::Gen(g) if g.kind == GenDeclKind::Type => Some(g),
                _ => None,
            })
            .flat_map(|g| f.arena.specs_list(g.specs).to_vec())
            .collect();
        let Spec::Type(a) = types[0] else { panic!() };
        assert!(a.type_params.is_empty());
        assert!(matches!(f.arena.types[a.typ], Type::Array { .. }));
        let Spec::Type(b) = types[1] else { panic!() };
        assert_eq!(b.type_params.len(), 1);
        assert!(matches!(f.arena.types[b.typ], Type::Slice { .. }));
    }

    #[test]
    fn bodies_and_initialisers_are_skipped() {
        let f = parse(
            "package p\n\
             var handlers = map[string]func(){\n\"a\": func() { if true { return } },\n}\n\
             func f() int {\n\tx := struct{ a int }{1}\n\treturn x.a\n}\n\
             func asm(x float64) float64\n",
        );
        assert_eq!(f.decls.len(), 3);
        let Decl::Func(asm) = f.arena.decls[f.decls[2]] else {
            panic!()
        };
        assert!(asm.body.is_none());
    }
}
