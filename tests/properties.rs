use std::sync::Arc;

use goimpl::parser::ast::{default_import_name, Decl, InterfaceElem, Spec, Type};
use goimpl::parser::parse_source;
use goimpl::{
    missing_methods, parse_qualified_name, MethodSpec, PackageRef, RenderedMethod, StubTemplate,
    TypeRef,
};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;

/// Methods of the only interface in `src`, homed in `pkg`.
fn iface_methods(src: &str, pkg: &str) -> Vec<MethodSpec> {
    let file = Arc::new(parse_source(src).unwrap());
    let mut out = Vec::new();
    for &d in &file.decls {
        let Decl::Gen(g) = file.arena.decls[d] else { continue };
        for spec in file.arena.specs_list(g.specs) {
            let Spec::Type(ts) = spec else { continue };
            let Type::Interface { elems } = file.arena.types[ts.typ] else { continue };
            for e in file.arena.interface_elems(elems) {
                if let InterfaceElem::Method { name, sig, .. } = *e {
                    out.push(MethodSpec {
                        name: file.name(name).to_string(),
                        home: PackageRef::new(pkg),
                        file: Arc::clone(&file),
                        sig,
                        type_params: Vec::new(),
                    });
                }
            }
        }
    }
    out
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

fn import_path() -> impl Strategy<Value = String> {
    (
        prop::option::of("[a-z]{1,6}\\.(com|org|io)"),
        vec(segment(), 1..4),
    )
        .prop_map(|(host, segs)| match host {
            Some(h) => format!("{h}/{}", segs.join("/")),
            None => segs.join("/"),
        })
}

fn type_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,10}"
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn qualified_names_split_at_last_dot(
        path in import_path(),
        name in type_name(),
        pointer in any::<bool>(),
    ) {
        let star = if pointer { "*" } else { "" };
        let (pkg, ty) = parse_qualified_name(&format!("{path}.{star}{name}"));
        prop_assert_eq!(&pkg.path, &path);
        prop_assert_eq!(pkg.short_name.as_str(), default_import_name(&path));
        prop_assert_eq!(&ty.name, &name);
        prop_assert_eq!(ty.is_pointer, pointer);
        prop_assert_eq!(ty.var_type(), format!("{star}{name}"));
    }

    #[test]
    fn bare_names_are_local(name in type_name(), pointer in any::<bool>()) {
        let star = if pointer { "*" } else { "" };
        let (pkg, ty) = parse_qualified_name(&format!("{star}{name}"));
        prop_assert!(pkg.is_local());
        prop_assert_eq!(ty.var_name().len(), 1);
    }

    #[test]
    fn missing_is_ordered_set_difference(
        names in btree_set("[A-Z][a-z]{0,6}", 0..12),
        keep in vec(any::<bool>(), 12),
        extra in vec("[A-Z][a-z]{0,6}", 0..4),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut src = String::from("package p\n\ntype I interface {\n");
        for n in &names {
            src.push_str(&format!("\t{n}(x int) error\n"));
        }
        src.push_str("}\n");
        let methods = iface_methods(&src, "p");
        prop_assert_eq!(methods.len(), names.len());

        let mut existing: Vec<String> = names
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(n, _)| n.clone())
            .collect();
        existing.extend(extra);

        let missing: Vec<&str> = missing_methods(&methods, &existing)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        let want: Vec<&str> = names
            .iter()
            .filter(|n| !existing.contains(n))
            .map(String::as_str)
            .collect();
        prop_assert_eq!(missing, want);
    }

    #[test]
    fn one_block_per_method(names in vec("[A-Z][a-z]{0,6}", 0..8), pointer in any::<bool>()) {
        let methods: Vec<RenderedMethod> = names
            .iter()
            .map(|n| RenderedMethod { name: n.clone(), signature: format!("{n}()") })
            .collect();
        let recv = TypeRef::new(if pointer { "*T" } else { "T" });
        let text = StubTemplate::render(&recv, &methods);
        prop_assert_eq!(text.matches("panic(\"not implemented\")").count(), names.len());
        prop_assert_eq!(text.matches("\n\n").count(), names.len().saturating_sub(1));
        if !names.is_empty() {
            let expected_start = format!("// {} ...\n", names[0]);
            prop_assert!(text.starts_with(&expected_start));
            let closed = text.ends_with("}\n");
            prop_assert!(closed);
        }
    }
}
