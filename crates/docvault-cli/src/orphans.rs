//! # Orphans Subcommand
//!
//! Lists blobs present in a filesystem store that no document record
//! references. An upload whose index commit failed leaves exactly such a
//! blob behind. The report is read-only; nothing is deleted.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use docvault_core::ContentAddress;
use docvault_index::{MetadataIndex, PgIndex};
use docvault_store::{BlobInventory, FsBlobStore};
use sqlx::postgres::PgPoolOptions;

#[derive(Args, Debug)]
pub struct OrphansArgs {
    /// Blob store root. Defaults to `DOCVAULT_BLOB_DIR`, then `./data/blobs`.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// PostgreSQL URL holding the document index. Defaults to `DATABASE_URL`.
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,
}

/// Execute the orphans subcommand.
pub async fn run_orphans(args: &OrphansArgs) -> Result<u8> {
    let dir = crate::resolve_blob_dir(args.dir.as_ref());
    let store = FsBlobStore::open(&dir)
        .await
        .with_context(|| format!("opening blob store at {}", dir.display()))?;

    let url = args
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .context("no database: pass --database-url or set DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await
        .context("connecting to PostgreSQL")?;
    let index = PgIndex::new(pool);

    let orphans = find_orphans(&store, &index).await?;
    for address in &orphans {
        println!("{address}");
    }
    tracing::info!(count = orphans.len(), root = %dir.display(), "orphan scan complete");
    Ok(if orphans.is_empty() { 0 } else { 1 })
}

/// Addresses held by `store` that no record in `index` points at, sorted.
pub async fn find_orphans(
    store: &dyn BlobInventory,
    index: &dyn MetadataIndex,
) -> Result<Vec<ContentAddress>> {
    let stored = store.list_addresses().await?;
    let referenced: BTreeSet<ContentAddress> =
        index.all_content_addresses().await?.into_iter().collect();
    Ok(stored
        .into_iter()
        .filter(|address| !referenced.contains(address))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect())
}
