//! Package lookup over throwaway directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use goimpl::{Config, Generator, GoLocator, ImplError, PackageLocator};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, src: &str) -> PathBuf {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(&p, src).unwrap();
    p
}

fn names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

struct Tree {
    tmp: TempDir,
}

impl Tree {
    fn new() -> Self {
        Self {
            tmp: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    fn file(&self, rel: &str, src: &str) -> PathBuf {
        write(self.tmp.path(), rel, src)
    }

    fn config(&self) -> Config {
        let mut c = Config::new(self.path("app"));
        c.goos = "linux".into();
        c.goarch = "amd64".into();
        c
    }
}

#[test]
fn module_cache_uses_escaped_paths() {
    let t = Tree::new();
    t.file(
        "app/go.mod",
        "module example.com/app\n\nrequire github.com/BurntSushi/toml v1.3.2\n",
    );
    t.file("app/main.go", "package main\n");
    t.file(
        "cache/github.com/!burnt!sushi/toml@v1.3.2/decode.go",
        "package toml\n\ntype Unmarshaler interface {\n\tUnmarshalTOML(any) error\n}\n",
    );
    t.file(
        "cache/github.com/!burnt!sushi/toml@v1.3.2/internal/tz.go",
        "package internal\n",
    );

    let mut config = t.config();
    config.gomodcache = Some(t.path("cache"));
    let loc = GoLocator::new(config);

    let pkg = loc.locate("github.com/BurntSushi/toml").unwrap();
    assert_eq!(pkg.dir, t.path("cache/github.com/!burnt!sushi/toml@v1.3.2"));
    assert_eq!(names(&pkg.files), ["decode.go"]);

    let sub = loc.locate("github.com/BurntSushi/toml/internal").unwrap();
    assert_eq!(names(&sub.files), ["tz.go"]);

    t.file("app/config.go", "package main\n\ntype Config struct{}\n");
    let mut out = Vec::new();
    Generator::new(&loc)
        .impl_stubs("Config", "github.com/BurntSushi/toml.Unmarshaler", &mut out)
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "// UnmarshalTOML ...\nfunc (c Config) UnmarshalTOML(any) error {\n\tpanic(\"not implemented\")\n}\n"
    );
}

#[test]
fn vendor_directory_comes_before_module_cache() {
    let t = Tree::new();
    t.file(
        "app/go.mod",
        "module example.com/app\nrequire example.org/dep v1.0.0\n",
    );
    t.file("app/vendor/example.org/dep/dep.go", "package dep\n");
    t.file("cache/example.org/dep@v1.0.0/dep.go", "package dep\n");

    let mut config = t.config();
    config.gomodcache = Some(t.path("cache"));
    let pkg = GoLocator::new(config).locate("example.org/dep").unwrap();
    assert_eq!(pkg.dir, t.path("app/vendor/example.org/dep"));
}

#[test]
fn goroot_comes_first() {
    let t = Tree::new();
    t.file("app/go.mod", "module io\n");
    t.file("app/local.go", "package io\n");
    t.file("root/src/io/io.go", "package io\n");

    let mut config = t.config();
    config.goroot = Some(t.path("root"));
    let pkg = GoLocator::new(config).locate("io").unwrap();
    assert_eq!(pkg.dir, t.path("root/src/io"));
}

#[test]
fn gopath_is_the_fallback() {
    let t = Tree::new();
    t.file("app/main.go", "package main\n");
    t.file("gp1/src/example.org/lib/empty.txt", "");
    t.file("gp2/src/example.org/lib/lib.go", "package lib\n");

    let mut config = t.config();
    config.gopath = vec![t.path("gp1"), t.path("gp2")];
    let pkg = GoLocator::new(config).locate("example.org/lib").unwrap();
    // gp1 has the directory but no Go files
    assert_eq!(pkg.dir, t.path("gp2/src/example.org/lib"));
}

#[test]
fn empty_path_is_the_working_directory() {
    let t = Tree::new();
    t.file("app/main.go", "package main\n");
    let pkg = GoLocator::new(t.config()).locate("").unwrap();
    assert_eq!(pkg.dir, t.path("app"));
}

#[test]
fn missing_package_lists_search_roots() {
    let t = Tree::new();
    t.file("app/go.mod", "module example.com/app\n");
    let mut config = t.config();
    config.goroot = Some(t.path("root"));
    config.gopath = vec![t.path("gp")];
    let err = GoLocator::new(config).locate("example.org/gone").unwrap_err();
    let ImplError::PackageNotFound { path, searched } = &err else {
        panic!("unexpected {err:?}");
    };
    assert_eq!(path, "example.org/gone");
    assert_eq!(
        searched,
        &[
            t.path("root/src/example.org/gone"),
            t.path("app/vendor/example.org/gone"),
            t.path("gp/src/example.org/gone"),
        ]
    );
    assert!(err.to_string().starts_with("cannot find package \"example.org/gone\""));
}

#[test]
fn build_constraints_select_files() {
    let t = Tree::new();
    let files = [
        ("app/a.go", "package p\n"),
        ("app/a_linux.go", "package p\n"),
        ("app/a_windows.go", "package p\n"),
        ("app/a_linux_arm64.go", "package p\n"),
        ("app/a_amd64.go", "package p\n"),
        ("app/a_test.go", "package p\n"),
        ("app/_hidden.go", "package p\n"),
        ("app/.dot.go", "package p\n"),
        ("app/notes.txt", "not go"),
        ("app/ignored.go", "//go:build ignore\n\npackage main\n"),
        ("app/unix.go", "//go:build unix && !cgo\n\npackage p\n"),
        ("app/tagged.go", "// Copyright\n\n//go:build integration\n\npackage p\n"),
        ("app/old.go", "// +build linux,386\n\npackage p\n"),
    ];
    for (rel, src) in files {
        t.file(rel, src);
    }

    let pkg = GoLocator::new(t.config()).locate("").unwrap();
    assert_eq!(
        names(&pkg.files),
        ["a.go", "a_amd64.go", "a_linux.go", "unix.go"]
    );

    let mut config = t.config();
    config.tags = vec!["integration".into()];
    config.goarch = "386".into();
    let pkg = GoLocator::new(config).locate("").unwrap();
    assert_eq!(
        names(&pkg.files),
        ["a.go", "a_linux.go", "old.go", "tagged.go", "unix.go"]
    );
}

#[test]
fn malformed_constraint_skips_the_file() {
    let t = Tree::new();
    t.file("app/ok.go", "package p\n");
    t.file("app/bad.go", "//go:build linux &&\n\npackage p\n");
    let pkg = GoLocator::new(t.config()).locate("").unwrap();
    assert_eq!(names(&pkg.files), ["ok.go"]);
}

#[test]
fn versioned_import_binds_package_name() {
    let t = Tree::new();
    t.file(
        "app/go.mod",
        "module example.com/app\n\nrequire github.com/x/bar/v2 v2.1.0\n",
    );
    t.file(
        "app/app.go",
        "package app\n\nimport \"github.com/x/bar/v2\"\n\n\
         type Service interface {\n\tbar.Pinger\n\tStop()\n}\n\n\
         type Impl struct{}\n",
    );
    t.file(
        "cache/github.com/x/bar/v2@v2.1.0/bar.go",
        "package bar\n\ntype Pinger interface {\n\tPing(t Target) error\n}\n\ntype Target struct{}\n",
    );

    let mut config = t.config();
    config.gomodcache = Some(t.path("cache"));
    let got = Generator::new(GoLocator::new(config))
        .stubs("Impl", "Service")
        .unwrap();
    assert_eq!(
        got,
        "// Ping ...\nfunc (i Impl) Ping(t bar.Target) error {\n\tpanic(\"not implemented\")\n}\n\n\
         // Stop ...\nfunc (i Impl) Stop() {\n\tpanic(\"not implemented\")\n}\n"
    );
}
