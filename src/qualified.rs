//! `path.Name` identifiers as given on the command line.

use std::fmt;

use goimpl_parser::ast::default_import_name;

/// A Go package by import path.
///
/// `short_name` is the name the package is imported under by default.
///
/// The empty path is the local package (the configured working directory);
/// it is never used to qualify names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    pub short_name: String,
    pub path: String,
}

impl PackageRef {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let short_name = default_import_name(&path).to_string();
        Self { short_name, path }
    }

    pub fn local() -> Self {
        Self::new("")
    }

    pub fn is_local(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() {
            f.write_str(".")
        } else {
            f.write_str(&self.path)
        }
    }
}

/// A named type, possibly behind one pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub is_pointer: bool,
}

impl TypeRef {
    pub fn new(bare: &str) -> Self {
        match bare.strip_prefix('*') {
            Some(name) => Self {
                name: name.to_string(),
                is_pointer: true,
            },
            None => Self {
                name: bare.to_string(),
                is_pointer: false,
            },
        }
    }

    /// Receiver variable for generated methods: the lower-cased first
    /// character of the type name.
    pub fn var_name(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect())
            .unwrap_or_default()
    }

    /// Receiver type as written in a method header (`T` or `*T`).
    pub fn var_type(&self) -> String {
        if self.is_pointer {
            format!("*{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Splits `net/http.Handler` at its last `.`.
///
/// Package paths may contain dots (`github.com/org/proj.MyType`) but a type
/// name never does, so everything before the last dot is the path. Without a
/// dot the whole string names a type in the local package.
pub fn parse_qualified_name(s: &str) -> (PackageRef, TypeRef) {
    match s.rfind('.') {
        Some(i) => (PackageRef::new(&s[..i]), TypeRef::new(&s[i + 1..])),
        None => (PackageRef::local(), TypeRef::new(s)),
    }
}
