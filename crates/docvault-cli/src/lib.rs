//! # docvault-cli: Operator Tooling
//!
//! The `docvault` binary works directly against a filesystem blob store,
//! without going through the HTTP service:
//!
//! ```bash
//! docvault blob put report.pdf --dir ./data/blobs
//! docvault blob get <ADDRESS> -o report.pdf
//! docvault blob verify <ADDRESS>
//! docvault orphans --database-url postgres://...
//! ```
//!
//! Subcommands return a process exit code: 0 on success, 1 when a blob is
//! missing, fails verification, or orphans were found.

pub mod blob;
pub mod orphans;

use std::path::PathBuf;

/// Blob directory used when neither `--dir` nor `DOCVAULT_BLOB_DIR` is set.
pub const DEFAULT_BLOB_DIR: &str = "./data/blobs";

/// `--dir`, then `DOCVAULT_BLOB_DIR`, then [`DEFAULT_BLOB_DIR`].
pub fn resolve_blob_dir(flag: Option<&PathBuf>) -> PathBuf {
    flag.cloned()
        .or_else(|| std::env::var_os("DOCVAULT_BLOB_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOB_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let dir = PathBuf::from("/tmp/explicit");
        assert_eq!(resolve_blob_dir(Some(&dir)), dir);
    }
}
