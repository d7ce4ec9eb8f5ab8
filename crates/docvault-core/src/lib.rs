#![deny(missing_docs)]

//! # docvault-core: Foundational Types for Document Custody
//!
//! Every other crate in the workspace depends on this one. It has no
//! internal crate dependencies, only `serde`, `thiserror`, `chrono`,
//! `uuid`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** You cannot pass a [`DocId`]
//!    where an [`OwnerId`] is expected. Both validate at construction.
//!
//! 2. **Content addresses are opaque.** A [`ContentAddress`] is whatever the
//!    blob store returned. Only stores that derive it from a [`ContentDigest`]
//!    know how to check it.
//!
//! 3. **Records are immutable.** A [`DocumentRecord`] has no setters. It is
//!    built once by the custody service after the blob write succeeds.

pub mod address;
pub mod digest;
pub mod error;
pub mod health;
pub mod identity;
pub mod record;
pub mod temporal;

pub use address::ContentAddress;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::ValidationError;
pub use health::BackendHealth;
pub use identity::{DocId, OwnerId};
pub use record::{DocumentQuery, DocumentRecord};
pub use temporal::Timestamp;
