//! # Middleware
//!
//! Request-level instrumentation layered over the API router.

pub mod metrics;
