//! Method sets of interfaces, with embedded interfaces flattened.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use goimpl_parser::ast::{
    Decl, GenDeclKind, InterfaceElem, ListRef, SignatureId, SourceFile, Spec, Type, TypeId,
};
use goimpl_parser::parse_source;
use tracing::{debug, trace};

use crate::error::ImplError;
use crate::index::DeclIndex;
use crate::qualified::{PackageRef, TypeRef};

/// One method an interface requires.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub name: String,
    /// Package that declares the interface the method was written in.
    pub home: PackageRef,
    /// The parsed file owning `sig`.
    pub file: Arc<SourceFile>,
    pub sig: SignatureId,
    /// Type parameters of the declaring interface; never qualified.
    pub type_params: Vec<String>,
}

/// The methods `ty` requires, in declaration order, with the methods of
/// embedded interfaces spliced in where they are embedded.
///
/// A name that shows up more than once (the same interface reached through
/// two embeddings) is kept only at its first position.
pub fn interface_methods(
    index: &DeclIndex<'_>,
    pkg: &PackageRef,
    ty: &TypeRef,
) -> Result<Vec<MethodSpec>, ImplError> {
    let mut resolver = Resolver {
        index,
        stack: Vec::new(),
    };
    let methods = resolver.resolve(pkg, &ty.name)?;
    Ok(dedup_by_name(methods))
}

/// Drops every method whose name was already seen.
pub fn dedup_by_name(methods: Vec<MethodSpec>) -> Vec<MethodSpec> {
    let mut seen = HashSet::new();
    methods
        .into_iter()
        .filter(|m| {
            let first = seen.insert(m.name.clone());
            if !first {
                debug!(method = %m.name, home = %m.home, "dropping duplicate method");
            }
            first
        })
        .collect()
}

const BUILTIN_SRC: &str = "package builtin\n\ntype error interface {\n\tError() string\n}\n";

struct Resolver<'i, 'l> {
    index: &'i DeclIndex<'l>,
    /// `(package path, interface name)` currently being resolved.
    stack: Vec<(String, String)>,
}

impl Resolver<'_, '_> {
    fn resolve(&mut self, pkg: &PackageRef, name: &str) -> Result<Vec<MethodSpec>, ImplError> {
        let key = (pkg.path.clone(), name.to_string());
        if self.stack.contains(&key) {
            let mut chain: Vec<String> = self
                .stack
                .iter()
                .map(|(p, n)| display_name(p, n))
                .collect();
            chain.push(display_name(&key.0, &key.1));
            return Err(ImplError::CyclicEmbedding { chain });
        }
        self.stack.push(key);
        let out = self.resolve_in_package(pkg, name);
        self.stack.pop();
        out
    }

    fn resolve_in_package(
        &mut self,
        pkg: &PackageRef,
        name: &str,
    ) -> Result<Vec<MethodSpec>, ImplError> {
        let mut out = Vec::new();
        let mut found = false;
        let index = self.index;
        index.each_decl(pkg, |file, decl| {
            let Decl::Gen(gen) = file.arena.decls[decl] else {
                return Ok(());
            };
            if gen.kind != GenDeclKind::Type {
                return Ok(());
            }
            for spec in file.arena.specs_list(gen.specs) {
                let Spec::Type(ts) = spec else { continue };
                if file.name(ts.name) != name {
                    continue;
                }
                let Type::Interface { elems } = file.arena.types[file.arena.unparen(ts.typ)]
                else {
                    continue;
                };
                found = true;
                let type_params: Vec<String> = file
                    .arena
                    .type_param_decls(ts.type_params)
                    .iter()
                    .flat_map(|tp| file.arena.ident_names(tp.names))
                    .map(|n| file.name(n.sym).to_string())
                    .collect();
                out.extend(self.elements(pkg, file, elems, &type_params)?);
            }
            Ok(())
        })?;

        if !found {
            return Err(ImplError::InterfaceNotFound {
                name: name.to_string(),
                package: pkg.path.clone(),
            });
        }
        trace!(package = %pkg, iface = name, methods = out.len(), "resolved interface");
        Ok(out)
    }

    /// Methods of an interface body declared in `file`, embeddings spliced
    /// in place.
    fn elements(
        &mut self,
        pkg: &PackageRef,
        file: &Arc<SourceFile>,
        elems: ListRef<InterfaceElem>,
        type_params: &[String],
    ) -> Result<Vec<MethodSpec>, ImplError> {
        let mut out = Vec::new();
        for elem in file.arena.interface_elems(elems) {
            match *elem {
                InterfaceElem::Method { name, sig, .. } => out.push(MethodSpec {
                    name: file.name(name).to_string(),
                    home: pkg.clone(),
                    file: Arc::clone(file),
                    sig,
                    type_params: type_params.to_vec(),
                }),
                InterfaceElem::Embed(t) => {
                    out.extend(self.embedded(pkg, file, t, type_params)?);
                }
            }
        }
        Ok(out)
    }

    /// Methods contributed by one embedded element of an interface declared
    /// in `file`.
    fn embedded(
        &mut self,
        pkg: &PackageRef,
        file: &Arc<SourceFile>,
        typ: TypeId,
        type_params: &[String],
    ) -> Result<Vec<MethodSpec>, ImplError> {
        let (qualifier, name) = match file.arena.types[file.arena.unparen(typ)] {
            Type::Named { pkg: qualifier, name, .. } => (qualifier, name),
            Type::Interface { elems } => return self.elements(pkg, file, elems, type_params),
            // unions and approximation terms constrain type sets only
            _ => return Ok(Vec::new()),
        };
        let name = file.name(name);

        let (target, shown) = match qualifier {
            Some(q) => {
                let q = file.name(q);
                let path = file.import_path_for(q).unwrap_or(q);
                (PackageRef::new(path), format!("{q}.{name}"))
            }
            None => {
                match name {
                    "error" => return builtin_error(),
                    "any" | "comparable" => return Ok(Vec::new()),
                    _ if type_params.iter().any(|t| t == name) => return Ok(Vec::new()),
                    _ => {}
                }
                (pkg.clone(), name.to_string())
            }
        };
        debug!(from = %pkg, embedded = %shown, package = %target, "resolving embedded interface");
        self.resolve(&target, name).map_err(ImplError::embedded(&shown))
    }
}

fn display_name(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

/// The predeclared `error` interface.
fn builtin_error() -> Result<Vec<MethodSpec>, ImplError> {
    let file = parse_source(BUILTIN_SRC).map_err(|failure| ImplError::SourceParse {
        file: PathBuf::from("builtin.go"),
        line: 1,
        column: 1,
        diags: failure.diags,
    })?;
    let file = Arc::new(file);
    let sig = file
        .decls
        .iter()
        .find_map(|&d| match file.arena.decls[d] {
            Decl::Gen(g) => file.arena.specs_list(g.specs).iter().find_map(|s| match s {
                Spec::Type(ts) => match file.arena.types[ts.typ] {
                    Type::Interface { elems } => {
                        file.arena.interface_elems(elems).iter().find_map(|e| match *e {
                            InterfaceElem::Method { sig, .. } => Some(sig),
                            InterfaceElem::Embed(_) => None,
                        })
                    }
                    _ => None,
                },
                _ => None,
            }),
            Decl::Func(_) => None,
        })
        .ok_or_else(|| ImplError::InterfaceNotFound {
            name: "error".into(),
            package: "builtin".into(),
        })?;
    Ok(vec![MethodSpec {
        name: "Error".into(),
        home: PackageRef::new("builtin"),
        file,
        sig,
        type_params: Vec::new(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, home: &str) -> MethodSpec {
        let mut methods = builtin_error().unwrap();
        let mut m = methods.remove(0);
        m.name = name.into();
        m.home = PackageRef::new(home);
        m
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let got = dedup_by_name(vec![
            spec("Read", "io"),
            spec("Close", "io"),
            spec("Read", "other"),
            spec("Write", "io"),
        ]);
        let names: Vec<_> = got.iter().map(|m| (m.name.as_str(), m.home.path.as_str())).collect();
        assert_eq!(names, [("Read", "io"), ("Close", "io"), ("Write", "io")]);
    }

    #[test]
    fn builtin_error_has_error_method() {
        let methods = builtin_error().unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "Error");
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("", "A"), "A");
        assert_eq!(display_name("net/http", "Handler"), "net/http.Handler");
    }
}
