//! Go environment: where packages live and which files a build would use.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use goimpl_parser::constraint::{file_build_expr, name_suffix, ConstraintError};
use tracing::debug;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

pub fn is_known_os(s: &str) -> bool {
    KNOWN_OS.contains(&s)
}

pub fn is_known_arch(s: &str) -> bool {
    KNOWN_ARCH.contains(&s)
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of the local package; also where the module root is
    /// searched from.
    pub dir: PathBuf,
    pub goroot: Option<PathBuf>,
    pub gopath: Vec<PathBuf>,
    pub gomodcache: Option<PathBuf>,
    pub goos: String,
    pub goarch: String,
    /// Extra build tags (`-tags`).
    pub tags: Vec<String>,
}

impl Config {
    /// A configuration rooted at `dir` with host defaults and no search
    /// roots. Tests build on this.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            goroot: None,
            gopath: Vec::new(),
            gomodcache: None,
            goos: host_os().to_string(),
            goarch: host_arch().to_string(),
            tags: Vec::new(),
        }
    }

    /// Reads `GOROOT`, `GOPATH`, `GOMODCACHE`, `GOOS`, `GOARCH` and the
    /// current directory.
    pub fn from_env() -> Self {
        let dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut cfg = Self::new(dir);

        cfg.goroot = env_path("GOROOT").or_else(go_env_goroot);
        cfg.gopath = match env::var_os("GOPATH").filter(|v| !v.is_empty()) {
            Some(v) => env::split_paths(&v).collect(),
            None => home_dir().map(|h| vec![h.join("go")]).unwrap_or_default(),
        };
        cfg.gomodcache = env_path("GOMODCACHE")
            .or_else(|| cfg.gopath.first().map(|p| p.join("pkg").join("mod")));
        if let Some(os) = env_nonempty("GOOS") {
            cfg.goos = os;
        }
        if let Some(arch) = env_nonempty("GOARCH") {
            cfg.goarch = arch;
        }

        debug!(
            dir = %cfg.dir.display(),
            goroot = ?cfg.goroot,
            gopath = ?cfg.gopath,
            goos = %cfg.goos,
            goarch = %cfg.goarch,
            "go environment"
        );
        cfg
    }

    /// Whether a build for this configuration satisfies `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || tag == "gc" {
            return true;
        }
        if self.tags.iter().any(|t| t == tag) {
            return true;
        }
        match tag {
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            _ => is_release_tag(tag),
        }
    }

    /// Whether `name` (a `.go` file of a package) would be compiled.
    ///
    /// `src` is consulted only when the file name alone does not exclude the
    /// file.
    pub fn matches_file(
        &self,
        name: &str,
        src: impl FnOnce() -> Option<String>,
    ) -> Result<bool, ConstraintError> {
        let Some(stem) = name.strip_suffix(".go") else {
            return Ok(false);
        };
        if stem.ends_with("_test") || name.starts_with(['_', '.']) {
            return Ok(false);
        }
        let (os, arch) = name_suffix(stem, is_known_os, is_known_arch);
        if os.is_some_and(|os| !self.has_tag(os)) || arch.is_some_and(|a| !self.has_tag(a)) {
            return Ok(false);
        }
        let Some(src) = src() else {
            return Ok(false);
        };
        Ok(match file_build_expr(&src)? {
            Some(expr) => expr.eval(&|t| self.has_tag(t)),
            None => true,
        })
    }
}

/// `go1.21` and friends; every release tag is considered satisfied.
fn is_release_tag(tag: &str) -> bool {
    let Some(rest) = tag.strip_prefix("go") else {
        return false;
    };
    match rest.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.bytes().all(|b| b.is_ascii_digit())
                && minor.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn home_dir() -> Option<PathBuf> {
    env_path("HOME").or_else(|| env_path("USERPROFILE"))
}

fn go_env_goroot() -> Option<PathBuf> {
    let out = Command::new("go").args(["env", "GOROOT"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let root = text.trim();
    (!root.is_empty() && Path::new(root).is_dir()).then(|| PathBuf::from(root))
}

fn host_os() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        os => os,
    }
}

fn host_arch() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc64" => "ppc64",
        "wasm32" => "wasm",
        arch => arch,
    }
}
