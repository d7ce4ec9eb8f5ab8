//! # Application State
//!
//! Shared state passed to handlers via the `State` extractor. Every field
//! is a cheap clone over long-lived backend handles created once at
//! startup.

use std::sync::Arc;

use docvault_custody::DocumentCustodyService;
use docvault_identity::IdentityGate;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub custody: DocumentCustodyService,
    pub identity: IdentityGate,
    /// Render handle of the installed Prometheus recorder, if any.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("custody", &self.custody)
            .field("identity", &self.identity)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    pub fn new(config: AppConfig, custody: DocumentCustodyService, identity: IdentityGate) -> Self {
        Self {
            config: Arc::new(config),
            custody,
            identity,
            metrics: None,
        }
    }

    /// Attach a Prometheus render handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
