//! Custody service tuning.

use std::time::Duration;

/// Per-call bounds and optional checks applied by the custody service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustodyConfig {
    /// Upper bound on any single blob store call.
    pub store_timeout: Duration,
    /// Upper bound on any single index call.
    pub index_timeout: Duration,
    /// Read each blob back after `put` and compare before committing.
    pub verify_writes: bool,
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(30),
            index_timeout: Duration::from_secs(10),
            verify_writes: false,
        }
    }
}

impl CustodyConfig {
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_index_timeout(mut self, timeout: Duration) -> Self {
        self.index_timeout = timeout;
        self
    }

    pub fn with_verify_writes(mut self, verify: bool) -> Self {
        self.verify_writes = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = CustodyConfig::default();
        assert_eq!(cfg.store_timeout, Duration::from_secs(30));
        assert_eq!(cfg.index_timeout, Duration::from_secs(10));
        assert!(!cfg.verify_writes);
    }

    #[test]
    fn builders_override() {
        let cfg = CustodyConfig::default()
            .with_store_timeout(Duration::from_millis(5))
            .with_verify_writes(true);
        assert_eq!(cfg.store_timeout, Duration::from_millis(5));
        assert!(cfg.verify_writes);
    }
}
