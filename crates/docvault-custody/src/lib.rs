//! # docvault-custody: Document Custody Pipeline
//!
//! Binds an owner's document id to content held in a blob store, keeps the
//! binding queryable, and hands the bytes back on request.
//!
//! The service owns no state beyond two shared backend handles, so it can
//! be cloned into every request handler:
//!
//! ```text
//! DocumentCustodyService
//!   ├── Arc<dyn ContentAddressStore>   (docvault-store)
//!   └── Arc<dyn MetadataIndex>         (docvault-index)
//! ```
//!
//! Owner ids reaching this crate are trusted; they come from the identity
//! gate. Client-supplied owner values are checked in [`UploadRequest::new`]
//! and never substituted for the trusted one.

pub mod config;
pub mod error;
pub mod request;
pub mod service;

pub use config::CustodyConfig;
pub use error::CustodyError;
pub use request::{UploadRequest, DEFAULT_CONTENT_TYPE};
pub use service::{CustodyHealth, DocumentCustodyService};
