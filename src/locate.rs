//! Import path → package directory and the files a build would compile.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::ImplError;

/// A package directory and its buildable source files, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedPackage {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Maps an import path to a package on disk.
pub trait PackageLocator {
    fn locate(&self, path: &str) -> Result<LocatedPackage, ImplError>;
}

/// The enclosing module of the working directory, from its `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    pub root: PathBuf,
    pub module: String,
    /// `(module path, version)` pairs from `require` directives.
    pub requires: Vec<(String, String)>,
}

impl GoMod {
    /// Nearest `go.mod` at or above `dir`.
    pub fn find(dir: &Path) -> Option<GoMod> {
        let mut cur = Some(dir);
        while let Some(d) = cur {
            let file = d.join("go.mod");
            if let Ok(text) = fs::read_to_string(&file) {
                return Some(GoMod::parse(d.to_path_buf(), &text));
            }
            cur = d.parent();
        }
        None
    }

    pub fn parse(root: PathBuf, text: &str) -> GoMod {
        let mut module = String::new();
        let mut requires = Vec::new();
        let mut in_require = false;

        for raw in text.lines() {
            let line = match raw.find("//") {
                Some(i) => &raw[..i],
                None => raw,
            }
            .trim();
            if line.is_empty() {
                continue;
            }
            if in_require {
                if line == ")" {
                    in_require = false;
                } else if let Some(req) = parse_require(line) {
                    requires.push(req);
                }
                continue;
            }
            let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            match verb {
                "module" => module = unquote(rest).to_string(),
                "require" if rest == "(" => in_require = true,
                "require" => requires.extend(parse_require(rest)),
                _ => {}
            }
        }

        GoMod {
            root,
            module,
            requires,
        }
    }

    /// Directory of `path` inside this module, if the module owns it.
    fn own_dir(&self, path: &str) -> Option<PathBuf> {
        if self.module.is_empty() {
            return None;
        }
        if path == self.module {
            return Some(self.root.clone());
        }
        let rest = path.strip_prefix(&self.module)?.strip_prefix('/')?;
        Some(self.root.join(rest))
    }

    /// The required module with the longest path that is a prefix of `path`.
    fn requirement_for<'a>(&'a self, path: &'a str) -> Option<(&'a str, &'a str, &'a str)> {
        self.requires
            .iter()
            .filter_map(|(module, version)| {
                let rest = path.strip_prefix(module.as_str())?;
                let rest = if rest.is_empty() {
                    rest
                } else {
                    rest.strip_prefix('/')?
                };
                Some((module.as_str(), version.as_str(), rest))
            })
            .max_by_key(|(module, _, _)| module.len())
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches('"')
}

fn parse_require(line: &str) -> Option<(String, String)> {
    let mut parts = line.split_whitespace();
    let module = unquote(parts.next()?);
    let version = parts.next()?;
    Some((module.to_string(), version.to_string()))
}

/// Module cache escaping: every upper-case letter becomes `!` + lower-case.
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Locates packages the way the `go` command does in module mode, falling
/// back to `GOPATH`.
pub struct GoLocator {
    config: Config,
    module: Option<GoMod>,
}

impl GoLocator {
    pub fn new(config: Config) -> Self {
        let module = GoMod::find(&config.dir);
        if let Some(m) = &module {
            debug!(module = %m.module, root = %m.root.display(), "enclosing module");
        }
        Self { config, module }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Candidate directories for `path`, in search order.
    pub fn candidates(&self, path: &str) -> Vec<PathBuf> {
        if path.is_empty() {
            return vec![self.config.dir.clone()];
        }
        let mut out = Vec::new();
        if let Some(goroot) = &self.config.goroot {
            out.push(goroot.join("src").join(path));
        }
        if let Some(m) = &self.module {
            out.extend(m.own_dir(path));
            out.push(m.root.join("vendor").join(path));
            if let (Some(cache), Some((module, version, rest))) =
                (&self.config.gomodcache, m.requirement_for(path))
            {
                let dir = cache.join(format!("{}@{version}", escape_module_path(module)));
                out.push(if rest.is_empty() { dir } else { dir.join(rest) });
            }
        }
        for gopath in &self.config.gopath {
            out.push(gopath.join("src").join(path));
        }
        out
    }

    /// Buildable `.go` files of `dir`, sorted by name.
    fn package_files(&self, dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .map(|e| e.path())
            .filter(|p| {
                let Some(name) = p.file_name().and_then(|n| n.to_str()) else {
                    return false;
                };
                match self.config.matches_file(name, || fs::read_to_string(p).ok()) {
                    Ok(keep) => {
                        trace!(file = %p.display(), keep, "build constraint");
                        keep
                    }
                    Err(err) => {
                        warn!(file = %p.display(), %err, "skipping file");
                        false
                    }
                }
            })
            .collect();
        files.sort();
        files
    }
}

impl PackageLocator for GoLocator {
    fn locate(&self, path: &str) -> Result<LocatedPackage, ImplError> {
        let searched = self.candidates(path);
        for dir in &searched {
            if !dir.is_dir() {
                continue;
            }
            let files = self.package_files(dir);
            if !files.is_empty() {
                debug!(path, dir = %dir.display(), files = files.len(), "located package");
                return Ok(LocatedPackage {
                    dir: dir.clone(),
                    files,
                });
            }
            trace!(dir = %dir.display(), "no buildable Go files");
        }
        Err(ImplError::PackageNotFound {
            path: path.to_string(),
            searched,
        })
    }
}

impl<L: PackageLocator + ?Sized> PackageLocator for &L {
    fn locate(&self, path: &str) -> Result<LocatedPackage, ImplError> {
        (**self).locate(path)
    }
}
