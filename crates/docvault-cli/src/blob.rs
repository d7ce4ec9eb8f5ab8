//! # Blob Subcommand
//!
//! Put, get, and verify blobs in a filesystem content-addressed store.
//! The filesystem backend rehashes on every read, so `get` and `verify`
//! both detect tampered files.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Args, Subcommand};
use docvault_core::ContentAddress;
use docvault_store::{ContentAddressStore, FsBlobStore, StoreError};

#[derive(Args, Debug)]
pub struct BlobArgs {
    /// Blob store root. Defaults to `DOCVAULT_BLOB_DIR`, then `./data/blobs`.
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: BlobCommand,
}

#[derive(Subcommand, Debug)]
pub enum BlobCommand {
    /// Store a file and print its content address.
    Put {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Write the blob at ADDRESS to stdout or a file.
    Get {
        #[arg(value_name = "ADDRESS")]
        address: String,
        /// Output file. Stdout when omitted.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Recompute the digest of the blob at ADDRESS.
    Verify {
        #[arg(value_name = "ADDRESS")]
        address: String,
    },
}

/// Execute the blob subcommand.
pub async fn run_blob(args: &BlobArgs) -> Result<u8> {
    let dir = crate::resolve_blob_dir(args.dir.as_ref());
    let store = FsBlobStore::open(&dir)
        .await
        .with_context(|| format!("opening blob store at {}", dir.display()))?;
    tracing::debug!(root = %dir.display(), "blob store opened");

    match &args.command {
        BlobCommand::Put { file } => cmd_put(&store, file).await,
        BlobCommand::Get { address, output } => cmd_get(&store, address, output.as_deref()).await,
        BlobCommand::Verify { address } => cmd_verify(&store, address).await,
    }
}

async fn cmd_put(store: &FsBlobStore, file: &Path) -> Result<u8> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    if data.is_empty() {
        anyhow::bail!("refusing to store empty file: {}", file.display());
    }
    let address = store.put(Bytes::from(data)).await?;
    println!("{address}");
    Ok(0)
}

async fn cmd_get(store: &FsBlobStore, address: &str, output: Option<&Path>) -> Result<u8> {
    let address = parse_address(address)?;
    let bytes = match store.get(&address).await {
        Ok(bytes) => bytes,
        Err(StoreError::NotFound { .. }) => {
            eprintln!("NOT FOUND: {address}");
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, &bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(0)
}

async fn cmd_verify(store: &FsBlobStore, address: &str) -> Result<u8> {
    let address = parse_address(address)?;
    let (line, code) = verify_outcome(store.get(&address).await, &address);
    println!("{line}");
    Ok(code)
}

fn verify_outcome(result: Result<Bytes, StoreError>, address: &ContentAddress) -> (String, u8) {
    match result {
        Ok(bytes) => (format!("OK: {address} ({} bytes)", bytes.len()), 0),
        Err(StoreError::NotFound { .. }) => (format!("FAIL: {address} not found"), 1),
        Err(e) => (format!("FAIL: {e}"), 1),
    }
}

fn parse_address(raw: &str) -> Result<ContentAddress> {
    ContentAddress::new(raw).map_err(|e| anyhow::anyhow!("invalid address: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, FsBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_get_to_file() {
        let (dir, store) = store().await;
        let input = dir.path().join("in.txt");
        std::fs::write(&input, b"hello").unwrap();
        assert_eq!(cmd_put(&store, &input).await.unwrap(), 0);

        let address = ContentAddress::from_digest(&docvault_core::sha256_digest(b"hello"));
        let output = dir.path().join("out.txt");
        let code = cmd_get(&store, address.as_str(), Some(&output)).await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(std::fs::read(&output).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn put_rejects_empty_file() {
        let (dir, store) = store().await;
        let input = dir.path().join("empty");
        std::fs::write(&input, b"").unwrap();
        assert!(cmd_put(&store, &input).await.is_err());
    }

    #[tokio::test]
    async fn get_missing_blob_exits_one() {
        let (_dir, store) = store().await;
        let address = ContentAddress::from_digest(&docvault_core::sha256_digest(b"absent"));
        assert_eq!(cmd_get(&store, address.as_str(), None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn verify_detects_tampering() {
        let (_dir, store) = store().await;
        let address = store.put(Bytes::from_static(b"original")).await.unwrap();
        assert_eq!(cmd_verify(&store, address.as_str()).await.unwrap(), 0);

        let digest = address.as_digest().unwrap();
        std::fs::write(store.blob_path(&digest), b"tampered").unwrap();
        let (line, code) = verify_outcome(store.get(&address).await, &address);
        assert_eq!(code, 1);
        assert!(line.starts_with("FAIL"));
    }

    #[test]
    fn malformed_address_is_an_error() {
        assert!(parse_address("").is_err());
    }
}
