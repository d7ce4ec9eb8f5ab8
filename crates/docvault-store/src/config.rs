//! Blob store configuration.
//!
//! Selects a backend and its connection parameters from the environment.

use std::path::PathBuf;

use url::Url;

use crate::ipfs::IpfsConfig;

/// Which [`ContentAddressStore`](crate::ContentAddressStore) implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackend {
    /// Process-local map. Lost on restart.
    Memory,
    /// Local directory tree.
    Fs,
    /// IPFS node via the Kubo RPC API.
    Ipfs,
    /// S3 or MinIO bucket.
    S3,
}

impl std::str::FromStr for BlobBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "fs" | "filesystem" => Ok(Self::Fs),
            "ipfs" => Ok(Self::Ipfs),
            "s3" | "minio" => Ok(Self::S3),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Connection settings for the S3 backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    /// Bucket holding blobs under the `blobs/` prefix.
    pub bucket: String,
    /// Custom endpoint (MinIO). `None` uses the AWS default resolver.
    pub endpoint: Option<String>,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            bucket: "docvault-blobs".to_string(),
            endpoint: None,
        }
    }
}

/// Full blob store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: BlobBackend,
    pub blob_dir: PathBuf,
    pub ipfs: IpfsConfig,
    pub s3: S3Settings,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::Fs,
            blob_dir: PathBuf::from("./data/blobs"),
            ipfs: IpfsConfig::default(),
            s3: S3Settings::default(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DOCVAULT_BLOB_BACKEND` (`memory` | `fs` | `ipfs` | `s3`, default: `fs`)
    /// - `DOCVAULT_BLOB_DIR` (default: `./data/blobs`)
    /// - `DOCVAULT_IPFS_URL` (default: `http://127.0.0.1:5001`)
    /// - `DOCVAULT_IPFS_TIMEOUT_SECS` (default: 30)
    /// - `DOCVAULT_S3_BUCKET` (default: `docvault-blobs`)
    /// - `DOCVAULT_S3_ENDPOINT` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let backend = match std::env::var("DOCVAULT_BLOB_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.backend,
        };
        let blob_dir = std::env::var("DOCVAULT_BLOB_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.blob_dir);

        let ipfs = IpfsConfig {
            api_url: env_url("DOCVAULT_IPFS_URL", &defaults.ipfs.api_url)?.to_string(),
            timeout_secs: std::env::var("DOCVAULT_IPFS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ipfs.timeout_secs),
            local_only: defaults.ipfs.local_only,
        };

        let s3 = S3Settings {
            bucket: std::env::var("DOCVAULT_S3_BUCKET").unwrap_or(defaults.s3.bucket),
            endpoint: std::env::var("DOCVAULT_S3_ENDPOINT")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        Ok(Self {
            backend,
            blob_dir,
            ipfs,
            s3,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown blob backend {0:?} (expected memory, fs, ipfs, or s3)")]
    UnknownBackend(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_aliases() {
        assert_eq!("FS".parse::<BlobBackend>().unwrap(), BlobBackend::Fs);
        assert_eq!("minio".parse::<BlobBackend>().unwrap(), BlobBackend::S3);
        assert_eq!(" ipfs ".parse::<BlobBackend>().unwrap(), BlobBackend::Ipfs);
    }

    #[test]
    fn backend_rejects_unknown() {
        let err = "tape".parse::<BlobBackend>().unwrap_err();
        assert!(err.to_string().contains("tape"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("DOCVAULT_NONEXISTENT_URL_VAR", "http://127.0.0.1:5001").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5001/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("DOCVAULT_TEST_BAD_IPFS_URL", "not a url");
        let result = env_url("DOCVAULT_TEST_BAD_IPFS_URL", "http://127.0.0.1:5001");
        std::env::remove_var("DOCVAULT_TEST_BAD_IPFS_URL");
        assert!(result.is_err());
    }

    #[test]
    fn defaults_point_at_local_fs() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, BlobBackend::Fs);
        assert_eq!(config.s3.bucket, "docvault-blobs");
    }
}
