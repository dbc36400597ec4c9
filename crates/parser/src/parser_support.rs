use crate::ast::{self, IdentName, Span};

/// One comma-separated entry of a parameter list, before grouping.
///
/// `a` alone has no type yet: it is either a name waiting for the type of a
/// later entry (`a, b int`) or a type on its own (`int, string`).
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub names: Vec<IdentName>,
    pub ellipsis_pos: Option<Span>,
    pub typ: Option<ast::TypeId>,
    pub span: Span,
}

/// Groups raw entries into fields following Go's parameter rules.
pub fn resolve_param_list(
    arena: &mut ast::AstArena,
    params: Vec<ParamDecl>,
) -> Vec<ast::FieldId> {
    let mut out = Vec::new();
    let mut pending_names: Vec<IdentName> = Vec::new();
    let mut pending_start: Option<u32> = None;

    for param in params {
        let Some(typ) = param.typ else {
            if pending_names.is_empty() {
                pending_start = Some(param.span.start);
            }
            pending_names.extend(param.names);
            continue;
        };

        // `int, ...string`: leading bare identifiers were types, not names
        if param.names.is_empty() {
            flush_as_types(arena, &mut pending_names, &mut out);
            pending_start = None;
        }

        let mut names = std::mem::take(&mut pending_names);
        names.extend(param.names);

        let start = pending_start.take().unwrap_or(param.span.start);
        let span = Span {
            start,
            end: param.span.end,
        };
        let field = ast::Field {
            names: arena.list_ident_names(names),
            ellipsis_pos: param.ellipsis_pos,
            typ,
            tag: None,
        };
        out.push(arena.fields.alloc(field, span));
    }

    flush_as_types(arena, &mut pending_names, &mut out);
    out
}

fn flush_as_types(
    arena: &mut ast::AstArena,
    pending: &mut Vec<IdentName>,
    out: &mut Vec<ast::FieldId>,
) {
    for name in pending.drain(..) {
        let typ = named_type_from_ident(arena, name);
        let field = ast::Field {
            names: ast::ListRef::EMPTY,
            ellipsis_pos: None,
            typ,
            tag: None,
        };
        out.push(arena.fields.alloc(field, name.pos));
    }
}

fn named_type_from_ident(arena: &mut ast::AstArena, name: IdentName) -> ast::TypeId {
    arena.types.alloc(
        ast::Type::Named {
            pkg: None,
            name: name.sym,
            name_pos: name.pos,
            args: ast::ListRef::EMPTY,
        },
        name.pos,
    )
}
