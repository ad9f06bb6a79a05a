//! Content catalog: hierarchy types, persistence, and resolution

pub(crate) mod db;
mod locator;
mod types;

pub use db::{create_pool, initialize_schema, CatalogQuery, SqliteCatalog};
pub use locator::{ContentLocator, ResolvedContent};
pub use types::*;
