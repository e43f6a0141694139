//! Packed catalog loader.
//!
//! Source artifact: `data/exports/catalog.he.msgpack.lz4`, produced by the
//! `catalog_builder` CLI. Format: LZ4 (size-prepended) wrapping
//! MessagePack(serde) of [`ContentCatalog`].

use std::env;
use std::path::{Path, PathBuf};

use lz4_flex::decompress_size_prepended;
use sha2::{Digest, Sha256};

use super::{CatalogError, ContentCatalog};

/// Env var overriding the packed catalog path.
pub const CATALOG_PATH_ENV: &str = "CQ_CATALOG_PATH";

/// Default relative path used when `CQ_CATALOG_PATH` is not set.
pub const DEFAULT_CATALOG_REL_PATH: &str = "data/exports/catalog.he.msgpack.lz4";

/// Hex SHA-256 of an artifact, as written into builder metadata.
pub fn checksum_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn resolve_catalog_path() -> PathBuf {
    if let Ok(path) = env::var(CATALOG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(DEFAULT_CATALOG_REL_PATH)
}

/// Decode packed bytes into an audited catalog.
///
/// Some local workflows write the MessagePack payload without the LZ4
/// wrapper; the simplest successful decode wins.
pub fn load_packed_bytes(bytes: &[u8]) -> Result<ContentCatalog, CatalogError> {
    let catalog = match rmp_serde::from_slice::<ContentCatalog>(bytes) {
        Ok(catalog) => catalog,
        Err(_) => {
            let msgpack = decompress_size_prepended(bytes)?;
            rmp_serde::from_slice::<ContentCatalog>(&msgpack)?
        }
    };
    if catalog.schema_version != crate::SCHEMA_VERSION {
        log::warn!(
            "packed catalog schema version {} differs from engine schema version {}",
            catalog.schema_version,
            crate::SCHEMA_VERSION
        );
    }
    catalog.ensure_valid()?;
    Ok(catalog)
}

/// Read and decode a packed catalog file.
pub fn load_packed(path: &Path) -> Result<ContentCatalog, CatalogError> {
    let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!(
        "loaded packed catalog '{}' ({} bytes, sha256 {})",
        path.display(),
        bytes.len(),
        checksum_hex(&bytes)
    );
    load_packed_bytes(&bytes)
}

/// Load the catalog using the standard resolution order:
/// 1) `CQ_CATALOG_PATH` if set
/// 2) `data/exports/catalog.he.msgpack.lz4` (relative)
/// 3) the embedded catalog, when the `embedded_catalog` feature is on
pub fn load_default() -> Result<ContentCatalog, CatalogError> {
    let path = resolve_catalog_path();
    match load_packed(&path) {
        Ok(catalog) => Ok(catalog),
        Err(err) => {
            #[cfg(feature = "embedded_catalog")]
            {
                log::debug!(
                    "packed catalog unavailable ({}), falling back to embedded content",
                    err
                );
                return super::embedded::load_embedded();
            }
            #[cfg(not(feature = "embedded_catalog"))]
            {
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_fixtures;

    fn packed_bytes(catalog: &ContentCatalog) -> Vec<u8> {
        let msgpack = rmp_serde::to_vec_named(catalog).unwrap();
        lz4_flex::compress_prepend_size(&msgpack)
    }

    #[test]
    fn test_packed_round_trip() {
        let catalog = test_fixtures::catalog();
        let bytes = packed_bytes(&catalog);
        let loaded = load_packed_bytes(&bytes).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_bare_msgpack_is_accepted() {
        let catalog = test_fixtures::catalog();
        let msgpack = rmp_serde::to_vec_named(&catalog).unwrap();
        let loaded = load_packed_bytes(&msgpack).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(load_packed_bytes(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }

    #[test]
    fn test_load_packed_from_file() {
        let catalog = test_fixtures::catalog();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.msgpack.lz4");
        std::fs::write(&path, packed_bytes(&catalog)).unwrap();
        let loaded = load_packed(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_packed(Path::new("no/such/catalog.bin")).unwrap_err();
        match err {
            CatalogError::Io { path, .. } => assert!(path.contains("no/such/catalog.bin")),
            other => panic!("expected Io error, got {other}"),
        }
    }

    #[test]
    fn test_checksum_is_stable_hex() {
        let digest = checksum_hex(b"catalog");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, checksum_hex(b"catalog"));
        assert_ne!(digest, checksum_hex(b"catalog2"));
    }

    #[test]
    fn test_invalid_catalog_fails_audit_on_load() {
        let mut catalog = test_fixtures::catalog();
        catalog.tie_missions.clear();
        let bytes = packed_bytes(&catalog);
        let err = load_packed_bytes(&bytes).unwrap_err();
        assert_eq!(err.issues().len(), 15);
    }
}
