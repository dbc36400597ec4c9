//! Method signatures as text, qualified for the package they are pasted into.

use goimpl_parser::printer::{Printer, Qualifier};

use crate::error::ImplError;
use crate::iface::MethodSpec;
use crate::qualified::PackageRef;

/// `name` plus the declaration text after `func`, e.g.
/// `Write(p []byte) (n int, err error)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMethod {
    pub name: String,
    pub signature: String,
}

impl MethodSpec {
    /// Prints the method as it must be written inside `target`.
    ///
    /// When the interface lives in another package, every exported type
    /// name that is not already qualified gets the home package's short
    /// name as prefix. The signature node itself is left untouched.
    pub fn render(&self, target: &PackageRef) -> Result<RenderedMethod, ImplError> {
        let mut printer = Printer::new(&self.file);
        if self.home.path != target.path {
            printer = printer.with_qualifier(Qualifier {
                package: &self.home.short_name,
                keep: &self.type_params,
            });
        }
        let signature =
            printer
                .method_string(&self.name, self.sig)
                .map_err(|err| ImplError::Render {
                    method: self.name.clone(),
                    reason: err.to_string(),
                })?;
        Ok(RenderedMethod {
            name: self.name.clone(),
            signature,
        })
    }
}
