use std::io::Write;

use tracing::{debug, info_span};

use crate::config::Config;
use crate::diff::missing_methods;
use crate::error::ImplError;
use crate::iface::interface_methods;
use crate::index::DeclIndex;
use crate::locate::{GoLocator, PackageLocator};
use crate::methods::receiver_methods;
use crate::qualified::parse_qualified_name;
use crate::render::RenderedMethod;
use crate::stub::StubTemplate;

/// Stub generation against one package locator.
pub struct Generator<L> {
    locator: L,
}

impl<L: PackageLocator> Generator<L> {
    pub fn new(locator: L) -> Self {
        Self { locator }
    }

    /// Stub text for the methods of `iface` that `receiver` lacks.
    ///
    /// Both arguments are `[path.]Name` identifiers; the receiver may carry a
    /// `*` before its name.
    pub fn stubs(&self, receiver: &str, iface: &str) -> Result<String, ImplError> {
        let _span = info_span!("impl", receiver, iface).entered();
        let index = DeclIndex::new(&self.locator);

        let (recv_pkg, recv_ty) = parse_qualified_name(receiver);
        let existing = receiver_methods(&index, &recv_pkg, &recv_ty)
            .map_err(ImplError::receiver(receiver))?;

        let (iface_pkg, iface_ty) = parse_qualified_name(iface);
        let required = interface_methods(&index, &iface_pkg, &iface_ty)
            .map_err(ImplError::interface(iface))?;

        let missing = missing_methods(&required, &existing);
        debug!(
            existing = existing.len(),
            required = required.len(),
            missing = missing.len(),
            "method sets"
        );

        let rendered = missing
            .into_iter()
            .map(|m| m.render(&recv_pkg).map_err(ImplError::method(&m.name)))
            .collect::<Result<Vec<RenderedMethod>, _>>()?;
        Ok(StubTemplate::render(&recv_ty, &rendered))
    }

    /// Writes the stubs to `sink` in one piece; nothing is written on error.
    pub fn impl_stubs<W: Write + ?Sized>(
        &self,
        receiver: &str,
        iface: &str,
        sink: &mut W,
    ) -> Result<(), ImplError> {
        let text = self.stubs(receiver, iface)?;
        sink.write_all(text.as_bytes())?;
        Ok(())
    }
}

/// [`Generator::impl_stubs`] with the Go environment of this process.
pub fn impl_stubs<W: Write + ?Sized>(
    receiver: &str,
    iface: &str,
    sink: &mut W,
) -> Result<(), ImplError> {
    Generator::new(GoLocator::new(Config::from_env())).impl_stubs(receiver, iface, sink)
}
