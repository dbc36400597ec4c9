use goimpl_parser::ast::{Decl, SourceFile, Type, TypeId};

use crate::error::ImplError;
use crate::index::DeclIndex;
use crate::qualified::{PackageRef, TypeRef};

/// Names of the methods declared on `ty` in `pkg`, in declaration order.
///
/// Value and pointer receivers both count, and so do generic receivers
/// (`func (l *List[T]) Push(v T)` belongs to `List`). Duplicates are kept.
pub fn receiver_methods(
    index: &DeclIndex<'_>,
    pkg: &PackageRef,
    ty: &TypeRef,
) -> Result<Vec<String>, ImplError> {
    let mut out = Vec::new();
    index.each_decl(pkg, |file, decl| {
        let Decl::Func(func) = file.arena.decls[decl] else {
            return Ok(());
        };
        let Some(recv) = func.recv else {
            return Ok(());
        };
        let fields = file.arena.fields_list(recv.fields);
        let Some(&first) = fields.first() else {
            return Ok(());
        };
        if receiver_base(file, file.arena.fields[first].typ) == Some(ty.name.as_str()) {
            out.push(file.name(func.name).to_string());
        }
        Ok(())
    })?;
    Ok(out)
}

/// `T`, `*T`, `T[A]`, `*T[A]` and parenthesised forms → `T`.
fn receiver_base(file: &SourceFile, typ: TypeId) -> Option<&str> {
    let a = &file.arena;
    let mut id = a.unparen(typ);
    if let Type::Pointer { elem } = a.types[id] {
        id = a.unparen(elem);
    }
    match a.types[id] {
        Type::Named { pkg: None, name, .. } => Some(file.name(name)),
        _ => None,
    }
}
