//! Compiler version resolution: pragma extraction, the release catalog, and a memoizing
//! resolver in front of it.

pub mod catalog;
pub mod pragma;
pub mod resolver;

pub use catalog::{
    CatalogSource, HttpCatalog, Platform, ResolvedVersion, VersionCatalog, DEFAULT_BINARIES_URL,
};
pub use pragma::{extract_constraint, VersionConstraint};
pub use resolver::VersionResolver;
