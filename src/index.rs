//! Top-level declarations of a package, file by file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use goimpl_parser::ast::{DeclId, SourceFile};
use goimpl_parser::parse_source;
use tracing::{debug, trace};

use crate::error::ImplError;
use crate::locate::PackageLocator;
use crate::qualified::PackageRef;

/// Walks the declarations of packages found by a [`PackageLocator`].
///
/// Nothing is cached: each walk locates the package again and re-parses
/// every file, so edits on disk are always picked up.
pub struct DeclIndex<'l> {
    locator: &'l dyn PackageLocator,
}

impl<'l> DeclIndex<'l> {
    pub fn new(locator: &'l dyn PackageLocator) -> Self {
        Self { locator }
    }

    /// Calls `visit` for every top-level declaration of `pkg`, in file-name
    /// order and then source order.
    ///
    /// Files are parsed as the walk reaches them, so a parse failure in a
    /// later file surfaces after earlier files were visited. The first error
    /// from `visit` stops the walk and is returned unchanged.
    pub fn each_decl<F>(&self, pkg: &PackageRef, mut visit: F) -> Result<(), ImplError>
    where
        F: FnMut(&Arc<SourceFile>, DeclId) -> Result<(), ImplError>,
    {
        let located = self.locator.locate(&pkg.path)?;
        debug!(package = %pkg, files = located.files.len(), "walking declarations");
        for path in &located.files {
            let file = Arc::new(parse_file(path)?);
            trace!(file = %path.display(), decls = file.decls.len(), "parsed");
            for &decl in &file.decls {
                visit(&file, decl)?;
            }
        }
        Ok(())
    }
}

/// Reads and parses one Go file.
pub fn parse_file(path: &Path) -> Result<SourceFile, ImplError> {
    let src = fs::read_to_string(path).map_err(|source| ImplError::Read {
        file: path.to_path_buf(),
        source,
    })?;
    parse_source(&src).map_err(|failure| {
        let (line, column) = failure
            .diags
            .first()
            .map_or((1, 1), |d| d.span.line_col(&src));
        ImplError::SourceParse {
            file: path.to_path_buf(),
            line,
            column,
            diags: failure.diags,
        }
    })
}
