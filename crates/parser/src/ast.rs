//! # Go declaration syntax tree
//!
//! Arena-allocated tree for the top level of a Go source file: the package
//! clause, imports, type/const/var declarations and function signatures.
//! Function bodies and value initialisers are not modelled; the parser skips
//! them and records only their extent.
//!
//! ## Layout
//!
//! - **Nodes** live in typed arenas (`SpannedArena<T>`) and are referenced by
//!   `Id<T>`; spans are kept in a side table.
//! - **Lists** live in centralized buffers (`ExtraData`) and are referenced by
//!   `ListRef<T>` (start + length).
//! - **Identifiers** are interned `Symbol`s, resolved through `Interner`.
//!
//! Nodes are never mutated after parsing. Anything that wants a rewritten
//! view of a node (e.g. package qualification) renders it through
//! `crate::printer` instead.

use core::marker::PhantomData;
use core::ops::Index;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::{BuildHasher, RandomState};

pub use crate::error::Span;

// =============================================================================
// Core Foundation Types
// =============================================================================

/// Type-safe identifier for arena-allocated nodes.
#[derive(Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Id<T> {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn to_usize(self) -> usize {
        self.raw as usize
    }
}

/// Typed reference into a centralized list buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct ListRef<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for ListRef<T> {}

impl<T> Clone for ListRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Default for ListRef<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> ListRef<T> {
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    fn range(&self) -> core::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

// =============================================================================
// Symbol Interning
// =============================================================================

/// Interned string symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Symbol(u32);

pub type Ident = Symbol;

/// Identifier occurrence (interned symbol + source position).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentName {
    pub sym: Ident,
    pub pos: Span,
}

/// String interner.
///
/// Strings are stored once; lookups go through hash buckets that are almost
/// always a single symbol long.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    buckets: HashMap<u64, SmallVec<[Symbol; 1]>>,
    state: RandomState,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string and returns its symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        let h = self.state.hash_one(s);
        let bucket = self.buckets.entry(h).or_default();
        if let Some(&sym) = bucket
            .iter()
            .find(|sym| self.strings[sym.0 as usize].as_ref() == s)
        {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.into());
        bucket.push(sym);
        sym
    }

    /// Looks a string up without interning it.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        let h = self.state.hash_one(s);
        self.buckets
            .get(&h)?
            .iter()
            .copied()
            .find(|sym| self.strings[sym.0 as usize].as_ref() == s)
    }

    /// Resolves a symbol back to its string.
    ///
    /// # Panics
    /// Panics if the symbol came from another interner.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

// =============================================================================
// Arena Allocation
// =============================================================================

/// Arena for nodes with associated spans.
#[derive(Debug)]
pub struct SpannedArena<T> {
    data: Vec<T>,
    spans: Vec<Span>,
}

impl<T> Default for SpannedArena<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl<T> SpannedArena<T> {
    #[inline]
    pub fn alloc(&mut self, node: T, span: Span) -> Id<T> {
        let id = Id::from_raw(self.data.len() as u32);
        self.data.push(node);
        self.spans.push(span);
        id
    }

    #[inline]
    pub fn span(&self, id: Id<T>) -> Span {
        self.spans[id.to_usize()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Index<Id<T>> for SpannedArena<T> {
    type Output = T;
    fn index(&self, id: Id<T>) -> &T {
        &self.data[id.to_usize()]
    }
}

pub type DeclId = Id<Decl>;
pub type TypeId = Id<Type>;
pub type FieldId = Id<Field>;
pub type SignatureId = Id<Signature>;

// =============================================================================
// Centralized List Storage
// =============================================================================

macro_rules! list_storage {
    ($($field:ident: $t:ty => $alloc:ident, $get:ident;)*) => {
        /// Buffers that every `ListRef<T>` points into.
        #[derive(Debug, Default)]
        pub struct ExtraData {
            $(pub $field: Vec<$t>,)*
        }

        impl AstArena {
            $(
                pub fn $alloc(&mut self, items: Vec<$t>) -> ListRef<$t> {
                    if items.is_empty() {
                        return ListRef::EMPTY;
                    }
                    let start = self.extras.$field.len() as u32;
                    let len = items.len() as u32;
                    self.extras.$field.extend(items);
                    ListRef { start, len, _marker: PhantomData }
                }

                #[inline]
                pub fn $get(&self, r: ListRef<$t>) -> &[$t] {
                    &self.extras.$field[r.range()]
                }
            )*
        }
    };
}

list_storage! {
    ident_names: IdentName => list_ident_names, ident_names;
    types: TypeId => list_types, types_list;
    fields: FieldId => list_fields, fields_list;
    specs: Spec => list_specs, specs_list;
    interface_elems: InterfaceElem => list_interface_elems, interface_elems;
    type_terms: TypeTerm => list_type_terms, type_terms;
    type_param_decls: TypeParamDecl => list_type_param_decls, type_param_decls;
}

/// Central arena holding every node of one source file.
#[derive(Debug, Default)]
pub struct AstArena {
    pub decls: SpannedArena<Decl>,
    pub types: SpannedArena<Type>,
    pub fields: SpannedArena<Field>,
    pub signatures: SpannedArena<Signature>,
    pub extras: ExtraData,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self, mut id: TypeId) -> TypeId {
        while let Type::Paren { typ } = self.types[id] {
            id = typ;
        }
        id
    }
}

// =============================================================================
// Source file
// =============================================================================

/// One parsed Go source file.
#[derive(Debug)]
pub struct SourceFile {
    pub package: IdentName,
    pub decls: Vec<DeclId>,
    pub arena: AstArena,
    pub interner: Interner,
}

impl SourceFile {
    #[inline]
    pub fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn package_name(&self) -> &str {
        self.name(self.package.sym)
    }

    /// All import specs of the file, in source order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> + '_ {
        self.decls.iter().flat_map(move |&id| {
            let specs: &[Spec] = match &self.arena.decls[id] {
                Decl::Gen(g) if g.kind == GenDeclKind::Import => self.arena.specs_list(g.specs),
                _ => &[],
            };
            specs.iter().filter_map(|s| match s {
                Spec::Import(i) => Some(i),
                _ => None,
            })
        })
    }

    /// Import path bound to `qualifier` in this file.
    ///
    /// Explicit import names win; otherwise an unnamed import binds its
    /// [`default_import_name`].
    pub fn import_path_for(&self, qualifier: &str) -> Option<&str> {
        let explicit = self.imports().find_map(|imp| match imp.name {
            Some(ImportName::Name(sym, _)) if self.name(sym) == qualifier => {
                Some(self.name(imp.path))
            }
            _ => None,
        });
        explicit.or_else(|| {
            self.imports()
                .filter(|imp| imp.name.is_none())
                .map(|imp| self.name(imp.path))
                .find(|path| default_import_name(path) == qualifier)
        })
    }
}

/// The name an unnamed import binds: the last path element without a
/// major-version suffix (`example.com/bar/v2` → `bar`, `gopkg.in/yaml.v3`
/// → `yaml`).
pub fn default_import_name(path: &str) -> &str {
    let mut elems = path.rsplit('/');
    let last = elems.next().unwrap_or(path);
    let base = match elems.next() {
        Some(parent) if is_major_version(last) => parent,
        _ => last,
    };
    match base.rsplit_once('.') {
        Some((name, version)) if !name.is_empty() && is_major_version(version) => name,
        _ => base,
    }
}

fn is_major_version(s: &str) -> bool {
    s.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenDeclKind {
    Import,
    Const,
    Var,
    Type,
}

/// `import`, `const`, `var` or `type`, single or grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenDecl {
    pub kind: GenDeclKind,
    pub tok_pos: Span,
    pub lparen: Option<Span>,
    pub specs: ListRef<Spec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportName {
    /// `import . "pkg"`
    Dot(Span),
    /// `import _ "pkg"`
    Blank(Span),
    /// `import name "pkg"`
    Name(Ident, Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: Option<ImportName>,
    /// Unquoted import path.
    pub path: Symbol,
    pub path_pos: Span,
}

/// Const or var spec; only the declared names are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueSpec {
    pub names: ListRef<IdentName>,
    /// Extent of the type and initialiser that were skipped.
    pub rest: Span,
}

/// `TypeSpec = AliasDecl | TypeDef`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: Ident,
    pub name_pos: Span,
    pub type_params: ListRef<TypeParamDecl>,
    /// Position of `=` for an alias.
    pub assign_pos: Option<Span>,
    pub typ: TypeId,
}

/// Receiver clause `(r *T)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receiver {
    pub l_paren: Span,
    pub fields: ListRef<FieldId>,
    pub r_paren: Span,
}

/// Function or method declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncDecl {
    pub func_pos: Span,
    pub recv: Option<Receiver>,
    pub name: Ident,
    pub name_pos: Span,
    pub type_params: ListRef<TypeParamDecl>,
    pub signature: SignatureId,
    /// Extent of the skipped body (`None` for external functions).
    pub body: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeParamDecl {
    pub names: ListRef<IdentName>,
    pub constraint: TypeId,
}

// =============================================================================
// Signatures and fields
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: ListRef<FieldId>,
    pub results: Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Results {
    None,
    /// `func() T`
    Single(TypeId),
    /// `func() (T, error)` or `func() (n int, err error)`
    List(ListRef<FieldId>),
}

/// Parameter, result or struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub names: ListRef<IdentName>,
    /// `...` of a variadic parameter.
    pub ellipsis_pos: Option<Span>,
    pub typ: TypeId,
    /// Raw struct tag literal, quotes included.
    pub tag: Option<Symbol>,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// `Name`, `pkg.Name`, `Name[A, B]`
    Named {
        pkg: Option<Ident>,
        name: Ident,
        name_pos: Span,
        args: ListRef<TypeId>,
    },
    /// `*T`
    Pointer { elem: TypeId },
    /// `[]T`
    Slice { elem: TypeId },
    /// `[N]T`; the length is kept as source text (`...` for inferred).
    Array { len: Symbol, elem: TypeId },
    /// `map[K]V`
    Map { key: TypeId, val: TypeId },
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan { dir: ChanDir, elem: TypeId },
    /// `struct { ... }`
    Struct { fields: ListRef<FieldId> },
    /// `interface { ... }`
    Interface { elems: ListRef<InterfaceElem> },
    /// `func(...) ...`
    Func { sig: SignatureId },
    /// `(T)`
    Paren { typ: TypeId },
    /// `~int | string` (constraints and interface type elements)
    Union { terms: ListRef<TypeTerm> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTerm {
    pub tilde: bool,
    pub typ: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceElem {
    /// `Method(...) ...`
    Method {
        name: Ident,
        name_pos: Span,
        sig: SignatureId,
    },
    /// Embedded type (`io.Reader`) or union (`int | ~float64`).
    Embed(TypeId),
}
