//! Catalog Builder Library
//!
//! Content JSON → MessagePack → LZ4 compression → SHA256 checksum
//! CSV (authoring spreadsheets) → content JSON pipeline

pub mod import;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use cq_core::catalog::{CatalogIssue, ContentCatalog};

// Re-export import pipeline
pub use import::{import_content, ImportStats};

/// Packed-artifact metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    /// Schema version stamped into the packed catalog
    pub schema_version: u8,
    /// SHA256 checksum (hex string)
    pub checksum: String,
    /// Creation time (RFC3339)
    pub created_at: String,
    /// Content JSON size (bytes)
    pub original_size: u64,
    /// Packed size (bytes)
    pub compressed_size: u64,
    /// compressed / original
    pub compression_ratio: f64,
}

/// Pack audited content JSON into the MessagePack+LZ4 artifact.
///
/// The content must pass the full integrity audit; a catalog that could
/// strand a tie-break at runtime is refused here, at build time.
pub fn build_catalog(
    input_json: &Path,
    output: &Path,
    schema_version: u8,
) -> Result<CatalogMetadata> {
    // 1. Read and parse the content JSON
    let json_str = fs::read_to_string(input_json)
        .with_context(|| format!("Failed to read content JSON: {}", input_json.display()))?;
    let original_size = json_str.len() as u64;

    let mut catalog =
        ContentCatalog::from_json_str(&json_str).context("Failed to parse content JSON")?;

    // 2. Full integrity audit
    let issues = catalog.validate();
    if !issues.is_empty() {
        let listing = issue_listing(&issues);
        anyhow::bail!(
            "content failed the integrity audit with {} issue(s):\n{}",
            issues.len(),
            listing
        );
    }
    catalog.schema_version = schema_version;

    // 3. MessagePack serialization (named fields, self-describing)
    let msgpack_bytes =
        rmp_serde::to_vec_named(&catalog).context("Failed to serialize to MessagePack")?;

    // 4. LZ4 compression with prepended size
    let compressed = lz4_flex::compress_prepend_size(&msgpack_bytes);
    let compressed_size = compressed.len() as u64;

    // 5. SHA256 checksum
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = format!("{:x}", hasher.finalize());

    // 6. Write the artifact
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(output, &compressed)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;

    Ok(CatalogMetadata {
        schema_version,
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        original_size,
        compressed_size,
        compression_ratio: compressed_size as f64 / original_size as f64,
    })
}

/// Checksum check against a previously recorded value.
pub fn verify_catalog(artifact: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(artifact)
        .with_context(|| format!("Failed to read artifact: {}", artifact.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let actual = format!("{:x}", hasher.finalize());

    Ok(actual == expected_checksum)
}

/// Load a packed artifact back into an audited catalog.
pub fn load_catalog(artifact: &Path) -> Result<ContentCatalog> {
    let catalog = cq_core::catalog::load_packed(artifact)
        .with_context(|| format!("Failed to load packed catalog: {}", artifact.display()))?;
    Ok(catalog)
}

/// Parse content JSON and report every audit issue without failing.
pub fn validate_content(input_json: &Path) -> Result<Vec<CatalogIssue>> {
    let json_str = fs::read_to_string(input_json)
        .with_context(|| format!("Failed to read content JSON: {}", input_json.display()))?;
    let catalog =
        ContentCatalog::from_json_str(&json_str).context("Failed to parse content JSON")?;
    Ok(catalog.validate())
}

pub fn issue_listing(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn content_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(cq_core::catalog::embedded::CATALOG_JSON.as_bytes())
            .unwrap();
        file
    }

    #[test]
    fn test_pack_verify_and_load_round_trip() -> Result<()> {
        let content = content_file();
        let dir = TempDir::new()?;
        let artifact = dir.path().join("exports/catalog.he.msgpack.lz4");

        let metadata = build_catalog(content.path(), &artifact, 1)?;

        assert_eq!(metadata.schema_version, 1);
        assert!(metadata.compressed_size < metadata.original_size);
        assert_eq!(metadata.checksum.len(), 64);
        assert!(verify_catalog(&artifact, &metadata.checksum)?);
        assert!(!verify_catalog(&artifact, "deadbeef")?);

        let catalog = load_catalog(&artifact)?;
        assert_eq!(catalog.schema_version, 1);
        assert_eq!(catalog.tie_missions.len(), 15);
        assert_eq!(catalog.summaries.len(), 6);

        Ok(())
    }

    #[test]
    fn test_pack_refuses_broken_content() -> Result<()> {
        let mut value: serde_json::Value =
            serde_json::from_str(cq_core::catalog::embedded::CATALOG_JSON)?;
        value["tie_missions"]
            .as_object_mut()
            .unwrap()
            .remove("ir");

        let mut content = NamedTempFile::new()?;
        content.write_all(value.to_string().as_bytes())?;

        let dir = TempDir::new()?;
        let artifact = dir.path().join("broken.msgpack.lz4");
        let err = build_catalog(content.path(), &artifact, 1).unwrap_err();
        assert!(err.to_string().contains("integrity audit"));
        assert!(err.to_string().contains("ir"));
        assert!(!artifact.exists());

        Ok(())
    }

    #[test]
    fn test_validate_reports_without_failing() -> Result<()> {
        let mut value: serde_json::Value =
            serde_json::from_str(cq_core::catalog::embedded::CATALOG_JSON)?;
        value["summaries"].as_object_mut().unwrap().remove("c");

        let mut content = NamedTempFile::new()?;
        content.write_all(value.to_string().as_bytes())?;

        let issues = validate_content(content.path())?;
        assert_eq!(issues.len(), 1);
        assert!(issue_listing(&issues).contains("missing summary"));

        let clean = content_file();
        assert!(validate_content(clean.path())?.is_empty());

        Ok(())
    }
}
