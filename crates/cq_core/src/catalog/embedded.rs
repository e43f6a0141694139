//! Embedded game content.
//!
//! `include_str!` bakes the authored Hebrew catalog into the binary at
//! compile time, so a default run needs no file I/O at all.

use super::{CatalogError, ContentCatalog};

/// The authored catalog JSON (~16KB, Hebrew copy).
pub const CATALOG_JSON: &str = include_str!("../../../../data/content/catalog.he.json");

/// Parse and audit the embedded catalog. The result is owned by the
/// caller; parse it once at startup and share it from there.
pub fn load_embedded() -> Result<ContentCatalog, CatalogError> {
    let catalog = ContentCatalog::from_json_str(CATALOG_JSON)?;
    catalog.ensure_valid()?;
    Ok(catalog)
}
