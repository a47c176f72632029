//! Core data model and algorithms shared by every other `launchpad-*`
//! crate: specifier parsing, the catalog interface, constraint resolution,
//! environment id hashing, and the error taxonomy they have in common.

pub mod catalog;
pub mod env_hash;
pub mod error;
pub mod model;
pub mod resolve;
pub mod spec;
pub mod version;

pub use catalog::{Catalog, FixtureCatalog, PackageInfo};
pub use env_hash::CanonicalPath;
pub use error::{CoreError, ResolverWarning};
pub use model::{Environment, InstalledPackage, ResolvedPackage};
pub use resolve::{resolve_closure, VersionConstraint};
pub use spec::{parse as parse_spec, resolve_alias, PackageSpec};
