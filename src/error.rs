use std::fmt;
use std::io;
use std::path::PathBuf;

use goimpl_parser::error::Diag;
use thiserror::Error;

/// Everything that can abort a stub request.
///
/// Leaf variants describe what went wrong; the wrapper variants record which
/// identifier was being resolved when it did. `Display` of a wrapper prints
/// only its own context, so use [`ErrorChain`] to print the whole story.
#[derive(Debug, Error)]
pub enum ImplError {
    #[error("cannot find package \"{path}\" in any of: {}", display_paths(.searched))]
    PackageNotFound { path: String, searched: Vec<PathBuf> },

    /// `line` and `column` locate the first diagnostic (1-based).
    #[error("{}:{line}:{column}: {}", .file.display(), first_diag(.diags))]
    SourceParse {
        file: PathBuf,
        line: usize,
        column: usize,
        diags: Vec<Diag>,
    },

    #[error("cannot read {}", .file.display())]
    Read {
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("interface {name} not found in package \"{package}\"")]
    InterfaceNotFound { name: String, package: String },

    #[error("cyclic interface embedding: {}", .chain.join(" -> "))]
    CyclicEmbedding { chain: Vec<String> },

    #[error("cannot render method {method}: {reason}")]
    Render { method: String, reason: String },

    #[error("cannot write stubs")]
    Io(#[from] io::Error),

    #[error("error on get funcs by type ({receiver})")]
    Receiver {
        receiver: String,
        #[source]
        source: Box<ImplError>,
    },

    #[error("error on get funcs by iface ({iface})")]
    Interface {
        iface: String,
        #[source]
        source: Box<ImplError>,
    },

    #[error("error on embedded interface ({name})")]
    Embedded {
        name: String,
        #[source]
        source: Box<ImplError>,
    },

    #[error("error on get decl by func ({name})")]
    Method {
        name: String,
        #[source]
        source: Box<ImplError>,
    },
}

impl ImplError {
    /// The innermost error under any number of context wrappers.
    pub fn root(&self) -> &ImplError {
        let mut err = self;
        while let ImplError::Receiver { source, .. }
        | ImplError::Interface { source, .. }
        | ImplError::Embedded { source, .. }
        | ImplError::Method { source, .. } = err
        {
            err = &**source;
        }
        err
    }

    pub fn chain(&self) -> ErrorChain<'_> {
        ErrorChain(self)
    }

    pub(crate) fn receiver(receiver: &str) -> impl FnOnce(ImplError) -> ImplError + '_ {
        move |e| ImplError::Receiver {
            receiver: receiver.to_string(),
            source: Box::new(e),
        }
    }

    pub(crate) fn interface(iface: &str) -> impl FnOnce(ImplError) -> ImplError + '_ {
        move |e| ImplError::Interface {
            iface: iface.to_string(),
            source: Box::new(e),
        }
    }

    pub(crate) fn embedded(name: &str) -> impl FnOnce(ImplError) -> ImplError + '_ {
        move |e| ImplError::Embedded {
            name: name.to_string(),
            source: Box::new(e),
        }
    }

    pub(crate) fn method(name: &str) -> impl FnOnce(ImplError) -> ImplError + '_ {
        move |e| ImplError::Method {
            name: name.to_string(),
            source: Box::new(e),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no search roots)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_diag(diags: &[Diag]) -> &str {
    diags.first().map_or("parse failed", |d| d.message.as_str())
}

/// Formats an error followed by every `source()` below it, joined by `": "`.
pub struct ErrorChain<'a>(pub &'a (dyn std::error::Error + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut next = self.0.source();
        while let Some(err) = next {
            write!(f, ": {err}")?;
            next = err.source();
        }
        Ok(())
    }
}
