//! # docvault-identity: Identity Boundary
//!
//! Turns credentials into signed access tokens and bearer tokens back into
//! a trusted [`OwnerId`](docvault_core::OwnerId). The custody service never
//! sees passwords or tokens; it only receives the owner id that
//! [`IdentityGate::authorize`] resolved.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`CredentialHasher`] | bcrypt password hashes |
//! | [`TokenIssuer`] | HS256 JWT signing and verification |
//! | [`UserDirectory`] | account storage (memory or PostgreSQL) |
//! | [`IdentityGate`] | register, authenticate, authorize |

pub mod directory;
pub mod error;
pub mod gate;
pub mod hasher;
pub mod postgres;
pub mod token;

pub use directory::{MemoryUserDirectory, UserAccount, UserDirectory};
pub use error::IdentityError;
pub use gate::{IdentityGate, MIN_PASSWORD_LEN};
pub use hasher::CredentialHasher;
pub use postgres::PgUserDirectory;
pub use token::{Claims, IssuedToken, TokenIssuer, DEFAULT_TOKEN_TTL, ISSUER, MIN_SECRET_LEN};
