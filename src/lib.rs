//! Go interface stub generator.
//!
//! Given a receiver type and an interface, both named as `[path.]Name`,
//! `goimpl` finds the interface methods the type does not declare yet and
//! prints a `panic("not implemented")` stub for each, qualified for the
//! receiver's package.
//!
//! ```no_run
//! let mut out = Vec::new();
//! goimpl::impl_stubs("example.com/app.*Conn", "io.ReadWriteCloser", &mut out)?;
//! # Ok::<(), goimpl::ImplError>(())
//! ```

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod generate;
pub mod iface;
pub mod index;
pub mod locate;
pub mod methods;
pub mod qualified;
pub mod render;
pub mod stub;

pub use goimpl_parser as parser;

pub use config::Config;
pub use diff::missing_methods;
pub use error::ImplError;
pub use generate::{impl_stubs, Generator};
pub use iface::{interface_methods, MethodSpec};
pub use index::DeclIndex;
pub use locate::{GoLocator, LocatedPackage, PackageLocator};
pub use methods::receiver_methods;
pub use qualified::{parse_qualified_name, PackageRef, TypeRef};
pub use render::RenderedMethod;
pub use stub::StubTemplate;
