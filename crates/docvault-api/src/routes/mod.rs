//! # Route Modules
//!
//! - [`users`]: registration and login, unauthenticated.
//! - [`documents`]: upload, lookup, and download, bearer-authenticated.
//! - [`health`]: liveness, readiness, and Prometheus scrape, unauthenticated.

pub mod documents;
pub mod health;
pub mod users;
