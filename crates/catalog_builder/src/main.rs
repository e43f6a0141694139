//! Catalog Builder CLI
//!
//! Content JSON → MessagePack+LZ4 packing tool
//! Authoring CSV → content JSON importer

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "catalog_builder")]
#[command(about = "Validate, pack and import game content catalogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Audit content JSON and list every issue
    Validate {
        /// Content JSON file path
        #[arg(long)]
        content: PathBuf,
    },

    /// Pack content JSON into the MsgPack+LZ4 artifact
    Pack {
        /// Input content JSON file path
        #[arg(long)]
        r#in: PathBuf,

        /// Output MsgPack+LZ4 file path
        #[arg(long)]
        out: PathBuf,

        /// Schema version stamped into the artifact
        #[arg(long, default_value = "1")]
        schema_version: u8,

        /// Verify artifact after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Build content JSON from authoring CSVs
    Import {
        /// Main-mission CSV file path
        #[arg(long)]
        missions_csv: PathBuf,

        /// Tie-mission CSV file path
        #[arg(long)]
        ties_csv: PathBuf,

        /// Base content JSON for avatars, intro and summaries
        #[arg(long)]
        base: Option<PathBuf>,

        /// Output content JSON file path
        #[arg(long)]
        out: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { content } => {
            println!("🔍 Auditing content...");
            println!("   Input: {}", content.display());

            let issues = catalog_builder::validate_content(&content)?;
            if issues.is_empty() {
                println!("\n✅ Content audit passed");
            } else {
                println!("\n❌ {} issue(s) found:", issues.len());
                println!("{}", catalog_builder::issue_listing(&issues));
                anyhow::bail!("content audit failed");
            }
        }

        Commands::Pack {
            r#in,
            out,
            schema_version,
            verify,
            metadata,
        } => {
            println!("🔨 Packing content catalog...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());
            println!("   Schema: {}", schema_version);

            let meta = catalog_builder::build_catalog(&r#in, &out, schema_version)?;

            print_metadata(&meta);

            if verify {
                verify_artifact_integrity(&out, &meta.checksum)?;
            }

            if let Some(metadata_path) = metadata {
                save_metadata(&metadata_path, &meta)?;
            }
        }

        Commands::Import {
            missions_csv,
            ties_csv,
            base,
            out,
        } => {
            println!("🔨 Importing authoring CSVs...");
            println!("   Missions: {}", missions_csv.display());
            println!("   Ties:     {}", ties_csv.display());
            if let Some(base_path) = &base {
                println!("   Base:     {}", base_path.display());
            }

            let (catalog, stats) =
                catalog_builder::import_content(&missions_csv, &ties_csv, base.as_deref())?;

            println!("\n✅ Import finished");
            println!("   Main missions: {}", stats.missions);
            println!("   Tie missions:  {}", stats.ties);
            println!("   Skipped rows:  {}", stats.failed);

            let issues = catalog.validate();
            if !issues.is_empty() {
                println!("\n⚠️  {} audit issue(s) remain:", issues.len());
                println!("{}", catalog_builder::issue_listing(&issues));
            }

            let json = serde_json::to_string_pretty(&catalog)?;
            std::fs::write(&out, json)?;
            println!("\n📄 Content JSON saved to: {}", out.display());
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &catalog_builder::CatalogMetadata) {
    println!("\n✅ Catalog packed successfully!");
    println!(
        "   Original size:   {} bytes ({:.2} KB)",
        meta.original_size,
        meta.original_size as f64 / 1024.0
    );
    println!(
        "   Compressed size: {} bytes ({:.2} KB)",
        meta.compressed_size,
        meta.compressed_size as f64 / 1024.0
    );
    println!("   Compression:     {:.1}%", meta.compression_ratio * 100.0);
    println!("   Checksum:        {}", meta.checksum);
    println!("   Created:         {}", meta.created_at);
}

#[cfg(feature = "cli")]
fn verify_artifact_integrity(artifact: &std::path::Path, checksum: &str) -> Result<()> {
    println!("\n🔍 Verifying artifact integrity...");
    let is_valid = catalog_builder::verify_catalog(artifact, checksum)?;

    if is_valid {
        println!("✅ Artifact verification passed");
        Ok(())
    } else {
        anyhow::bail!("❌ Artifact verification failed - checksum mismatch!")
    }
}

#[cfg(feature = "cli")]
fn save_metadata(path: &PathBuf, meta: &catalog_builder::CatalogMetadata) -> Result<()> {
    let metadata_json = serde_json::to_string_pretty(meta)?;
    std::fs::write(path, metadata_json)?;
    println!("\n📄 Metadata saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("catalog_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
