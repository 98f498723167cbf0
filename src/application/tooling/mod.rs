mod catalog;
mod interface;

pub use catalog::{DEFAULT_CATALOG_TTL, ToolCatalog, to_declarations};
pub use interface::ToolProvider;
